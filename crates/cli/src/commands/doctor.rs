//! `storyweaver doctor`: diagnose setup.

use storyweaver_config::AppConfig;

pub fn run() {
    println!("🩺 StoryWeaver Doctor: System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    println!("  ✅ Binary running");

    let config_path = AppConfig::config_path();
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  ⚠️  No config file at {}, using defaults", config_path.display());
        AppConfig::load().ok()
    };

    if let Some(config) = config {
        if config.has_api_key() {
            println!("  ✅ API key configured");
        } else {
            println!("  ⚠️  No API key configured; set STORYWEAVER_API_KEY or add api_key to config.toml");
            issues += 1;
        }

        let output_dir = &config.storyboard.output_dir;
        match std::fs::create_dir_all(output_dir) {
            Ok(()) => println!("  ✅ Output directory writable: {}", output_dir.display()),
            Err(e) => {
                println!("  ❌ Output directory {} unusable: {e}", output_dir.display());
                issues += 1;
            }
        }

        if config.embedding.is_enabled() {
            println!("  ✅ Plot retrieval enabled ({})", config.embedding.model);
        } else {
            println!("  ℹ️  Plot retrieval disabled ([embedding] provider = \"none\")");
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }
}
