//! `storyweaver moods`: mood distribution of a saved storyboard.

use serde_json::Value;
use std::path::Path;
use storyweaver_agent::analyze_mood_value;

pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let storyboard: Value = serde_json::from_str(&content)?;

    if let Some(title) = storyboard.get("title").and_then(Value::as_str) {
        println!("🎬 {title}");
    }
    print_mood_chart(&serde_json::to_value(analyze_mood_value(&storyboard))?);
    Ok(())
}

/// Text bar chart of `{mood: count}`.
pub fn print_mood_chart(counts: &Value) {
    let rows = chart_rows(counts);
    if rows.is_empty() {
        println!("⚠️  No mood data available");
        return;
    }

    println!("Scene Mood Distribution");
    for row in rows {
        println!("  {row}");
    }
}

fn chart_rows(counts: &Value) -> Vec<String> {
    let Some(map) = counts.as_object() else {
        return Vec::new();
    };
    let width = map.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    map.iter()
        .map(|(mood, count)| {
            let n = count.as_u64().unwrap_or(0);
            format!("{mood:<width$} {} {n}", "█".repeat(n as usize))
        })
        .collect()
}
