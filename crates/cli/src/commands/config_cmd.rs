//! `storyweaver config`: configuration management commands.

use storyweaver_config::AppConfig;

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if !config.has_api_key() {
                warnings.push("No API key set (set STORYWEAVER_API_KEY or OPENAI_API_KEY)");
            }
            if config.images.enabled && config.api_key.is_none() {
                warnings.push("Image generation enabled without an API key");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Endpoint:   {}", config.base_url);
            println!("   Model:      {}", config.model);
            println!("   Moods:      {}", config.storyboard.moods.join(", "));
            println!("   Retries:    {}", config.storyboard.max_retries);
            println!("   Embeddings: {}", config.embedding.provider);
            println!("   Images:     {}", if config.images.enabled { "on" } else { "off" });
            println!("   Output:     {}", config.storyboard.output_dir.display());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", redacted_toml(&config)?);
    Ok(())
}

pub fn path() {
    println!("{}", AppConfig::config_path().display());
}

fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("***".into());
    }
    toml::to_string_pretty(&shown)
}
