//! Storyboard domain types.
//!
//! A storyboard is a title plus an ordered list of scenes. These are the
//! value objects that flow from the generation client, through image
//! generation, into the knowledge base and out to disk.

use serde::{Deserialize, Serialize};

/// The primary output artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    /// Number scenes `1..=len` in list order, whatever the model wrote.
    pub fn renumber(&mut self) {
        for (i, scene) in self.scenes.iter_mut().enumerate() {
            scene.scene_number = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }
    }
}

/// One storyboard unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based position in the storyboard
    #[serde(deserialize_with = "lenient::number")]
    pub scene_number: u32,

    /// Visual description of the shot
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,

    /// Spoken line(s)
    #[serde(deserialize_with = "lenient::text")]
    pub dialogue: String,

    /// Mood tag from the configured vocabulary
    pub mood: String,

    /// Basename of the scene image, colocated with the storyboard output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
}

impl Scene {
    pub fn new(
        scene_number: u32,
        description: impl Into<String>,
        dialogue: impl Into<String>,
        mood: impl Into<String>,
    ) -> Self {
        Self {
            scene_number,
            description: description.into(),
            dialogue: dialogue.into(),
            mood: mood.into(),
            image_filename: None,
        }
    }
}

/// Model output is loosely typed: dialogue may arrive as a list of lines or
/// null, and scene numbers as strings or floats.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(to_text(Value::deserialize(deserializer)?))
    }

    /// Unreadable numbers become 0; callers renumber by position.
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole)),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(whole),
            _ => None,
        };
        Ok(n.and_then(|n| u32::try_from(n).ok()).unwrap_or(0))
    }

    fn whole(f: f64) -> Option<u64> {
        (f.is_finite() && f >= 0.0).then(|| f as u64)
    }

    fn to_text(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Array(items) => items
                .into_iter()
                .map(to_text)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

/// A film genre tag used to pick prompt context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genre(pub String);

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Genre {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_filename_omitted_when_absent() {
        let scene = Scene::new(1, "A vault door", "Quiet.", "tense");
        let json = serde_json::to_string(&scene).unwrap();
        assert!(!json.contains("image_filename"));
    }

    #[test]
    fn parses_model_shaped_json() {
        let raw = r#"{
            "title": "Midnight Vault",
            "scenes": [
                {"scene_number": 1, "description": "Crew gathers", "dialogue": "Ready?", "mood": "tense"}
            ]
        }"#;
        let sb: Storyboard = serde_json::from_str(raw).unwrap();
        assert_eq!(sb.title, "Midnight Vault");
        assert_eq!(sb.scenes[0].mood, "tense");
        assert!(sb.scenes[0].image_filename.is_none());
    }

    #[test]
    fn loose_scene_fields_are_coerced() {
        let raw = r#"{
            "title": "Night Shift",
            "scenes": [
                {"scene_number": "2", "description": "Alley", "dialogue": ["A: hi", "B: yo"], "mood": "tense"},
                {"scene_number": 3.0, "description": null, "dialogue": null, "mood": "dark"},
                {"scene_number": "first", "description": "Roof", "dialogue": 42, "mood": "joyful"}
            ]
        }"#;
        let sb: Storyboard = serde_json::from_str(raw).unwrap();
        assert_eq!(sb.scenes[0].scene_number, 2);
        assert_eq!(sb.scenes[0].dialogue, "A: hi\nB: yo");
        assert_eq!(sb.scenes[1].scene_number, 3);
        assert_eq!(sb.scenes[1].description, "");
        assert_eq!(sb.scenes[1].dialogue, "");
        assert_eq!(sb.scenes[2].scene_number, 0);
        assert_eq!(sb.scenes[2].dialogue, "42");
    }

    #[test]
    fn renumber_follows_list_order() {
        let mut sb = Storyboard {
            title: "T".into(),
            scenes: vec![Scene::new(1, "a", "", "tense"), Scene::new(1, "b", "", "dark")],
        };
        sb.renumber();
        let numbers: Vec<u32> = sb.scenes.iter().map(|s| s.scene_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn genre_is_transparent_string() {
        let json = serde_json::to_string(&Genre::from("sci-fi")).unwrap();
        assert_eq!(json, "\"sci-fi\"");
    }
}
