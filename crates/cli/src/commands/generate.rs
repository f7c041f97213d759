//! `storyweaver generate`: plot in, storyboard folder out.

use clap::ValueEnum;
use serde_json::{Value, json};
use std::fmt;
use std::path::{Path, PathBuf};
use storyweaver_agent::{AgentConfig, StoryboardAgent};
use storyweaver_config::AppConfig;
use storyweaver_core::{OperationCall, Storyboard};
use storyweaver_providers::build_from_config;

use super::moods::print_mood_chart;

const MAX_SLUG_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VisualStyle {
    Cinematic,
    Documentary,
    Anime,
    Noir,
    Experimental,
}

impl fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cinematic => "Cinematic",
            Self::Documentary => "Documentary",
            Self::Anime => "Anime",
            Self::Noir => "Noir",
            Self::Experimental => "Experimental",
        };
        f.write_str(name)
    }
}

pub struct GenerateArgs {
    pub plot: String,
    pub scenes: u32,
    pub style: Option<VisualStyle>,
    pub output: Option<PathBuf>,
}

pub async fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate()?;

    let plot = args.plot.trim();
    if plot.is_empty() {
        return Err("Plot cannot be empty.".into());
    }
    let max = config.storyboard.max_scenes;
    if !(1..=max).contains(&args.scenes) {
        return Err(format!("Number of scenes must be between 1 and {max}.").into());
    }

    if !config.has_api_key() {
        eprintln!("  ⚠️  No API key configured; generation will likely fall back to a placeholder storyboard.");
        eprintln!("     Set STORYWEAVER_API_KEY or add api_key to {}", AppConfig::config_path().display());
    }
    if args.style.is_some() && !config.images.enabled {
        eprintln!("  ℹ️  Image generation is disabled in config; --style only shapes the prompt when [images] is enabled.");
    }

    let slug = slugify(plot);
    let root = args.output.unwrap_or_else(|| config.storyboard.output_dir.clone());
    let story_dir = root.join(&slug);
    println!("📁 Output directory: {}", story_dir.display());
    std::fs::create_dir_all(&story_dir)?;

    let backends = build_from_config(&config);
    let agent = StoryboardAgent::new(
        AgentConfig::from_app(&config),
        backends.provider,
        backends.embedder,
        backends.images,
        backends.background,
        story_dir.join(&config.storyboard.knowledge_base),
    )?;

    println!("\n🔍 Analyzing your plot...");
    let mut arguments = json!({
        "plot": plot,
        "num_scenes": args.scenes,
        "output_dir": story_dir,
    });
    if let Some(style) = args.style {
        arguments["visual_style"] = json!(style.to_string());
    }

    let storyboard = agent
        .execute(OperationCall::new("generate_storyboard", arguments))
        .await?
        .ok_or("Storyboard generation failed.")?;

    println!("📊 Analyzing story structure...");
    let moods = agent
        .execute(OperationCall::new("analyze_mood", json!({ "storyboard": storyboard })))
        .await?
        .unwrap_or(Value::Null);

    let typed: Storyboard = serde_json::from_value(storyboard.clone())?;
    print_storyboard(&typed, &story_dir);
    print_mood_chart(&moods);

    let file = story_dir.join(format!("storyboard_{slug}.json"));
    let saved = agent
        .execute(OperationCall::new(
            "save_storyboard",
            json!({ "storyboard": storyboard, "path": file }),
        ))
        .await?;
    if saved == Some(Value::Bool(true)) {
        println!("💾 Storyboard saved to {}", file.display());
    } else {
        println!("❌ Failed to save storyboard to {}", file.display());
    }

    Ok(())
}

/// Folder-safe name for a plot.
pub fn slugify(plot: &str) -> String {
    let slug: String = plot
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        "storyboard".into()
    } else {
        slug
    }
}

fn print_storyboard(storyboard: &Storyboard, dir: &Path) {
    println!("\n🎬 {}", storyboard.title);
    for scene in &storyboard.scenes {
        println!("\n🎥 Scene {} ({})", scene.scene_number, capitalize(&scene.mood));
        println!("   Visual Description:");
        println!("   {}", scene.description);
        println!("   Dialogue:");
        println!("   \"{}\"", scene.dialogue);
        if let Some(image) = &scene.image_filename {
            println!("   Image: {}", dir.join(image).display());
        }
    }
    println!();
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
