//! Genre detection and genre-level prompt context.

use std::sync::Arc;
use storyweaver_core::{BackgroundSource, Genre};
use tracing::{debug, warn};

/// Ordered keyword rules. The first rule with any substring hit wins.
const GENRE_RULES: &[(&str, &[&str])] = &[
    ("heist", &["heist", "robbery", "steal"]),
    ("sci-fi", &["sci-fi", "futuristic", "space", "alien"]),
    ("romance", &["romance", "love", "relationship"]),
    ("thriller", &["thriller", "suspense", "mystery"]),
];

const EXAMPLE_DIALOGUE: &[(&str, &str)] = &[
    (
        "heist",
        "INT. BANK VAULT - NIGHT\nThe crew works silently until alarms blare.\n\"We're made!\" shouts the leader.",
    ),
    (
        "sci-fi",
        "EXT. SPACE STATION\nThe captain watches Earth from the viewport.\n\"Initiate hyperdrive,\" she orders.",
    ),
    (
        "romance",
        "EXT. PARIS CAFE - DAY\nThey share coffee as rain falls gently.\n\"I've waited my whole life for this,\" he whispers.",
    ),
    (
        "thriller",
        "INT. ABANDONED HOUSE - NIGHT\nA floorboard creaks. She holds her breath.\n\"I know you're here,\" calls the killer.",
    ),
];

const GENERIC_DIALOGUE: &str = "Sample script dialogue.";

/// Supplies genre, background text and example dialogue for a plot.
pub struct ContextProvider {
    background: Option<Arc<dyn BackgroundSource>>,
    default_genre: String,
}

impl ContextProvider {
    pub fn new(background: Option<Arc<dyn BackgroundSource>>, default_genre: impl Into<String>) -> Self {
        Self {
            background,
            default_genre: default_genre.into(),
        }
    }

    pub fn detect_genre(&self, plot: &str) -> Genre {
        let plot = plot.to_lowercase();
        GENRE_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| plot.contains(k)))
            .map(|(genre, _)| Genre::new(*genre))
            .unwrap_or_else(|| Genre::new(self.default_genre.clone()))
    }

    /// Background prose for a genre. Never fails.
    pub async fn fetch_background(&self, genre: &Genre) -> String {
        let Some(source) = &self.background else {
            return generic_background(genre);
        };

        match source.fetch(genre.as_str()).await {
            Ok(text) => {
                debug!(source = source.name(), %genre, chars = text.chars().count(), "Background fetched");
                text
            }
            Err(e) => {
                warn!(source = source.name(), %genre, error = %e, "Background unavailable, using generic context");
                generic_background(genre)
            }
        }
    }

    pub fn fetch_example_dialogue(&self, genre: &Genre) -> &'static str {
        example_dialogue(genre.as_str())
    }
}

fn generic_background(genre: &Genre) -> String {
    format!("Standard {genre} film context.")
}

/// Case-insensitive lookup in the example dialogue table.
pub fn example_dialogue(genre: &str) -> &'static str {
    let genre = genre.to_lowercase();
    EXAMPLE_DIALOGUE
        .iter()
        .find(|(key, _)| *key == genre)
        .map(|(_, text)| *text)
        .unwrap_or(GENERIC_DIALOGUE)
}
