//! Structural storyboard validation over raw model output.

use serde_json::Value;

const REQUIRED_SCENE_FIELDS: [&str; 4] = ["scene_number", "description", "dialogue", "mood"];

/// True when `value` has a title, a non-empty scene list, every scene carries
/// the required fields, and every mood is in `moods`.
pub fn validate(value: &Value, moods: &[String]) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if !obj.contains_key("title") {
        return false;
    }
    let Some(scenes) = obj.get("scenes").and_then(Value::as_array) else {
        return false;
    };
    if scenes.is_empty() {
        return false;
    }

    scenes.iter().all(|scene| {
        let Some(scene) = scene.as_object() else {
            return false;
        };
        REQUIRED_SCENE_FIELDS.iter().all(|f| scene.contains_key(*f))
            && scene
                .get("mood")
                .and_then(Value::as_str)
                .is_some_and(|mood| moods.iter().any(|m| m == mood))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn moods() -> Vec<String> {
        ["tense", "joyful", "neutral"].into_iter().map(String::from).collect()
    }

    fn scene(mood: &str) -> Value {
        json!({"scene_number": 1, "description": "d", "dialogue": "...", "mood": mood})
    }

    #[test]
    fn accepts_well_formed() {
        let sb = json!({"title": "T", "scenes": [scene("tense"), scene("joyful")]});
        assert!(validate(&sb, &moods()));
    }

    #[test]
    fn rejects_missing_scenes() {
        assert!(!validate(&json!({"title": "T"}), &moods()));
    }

    #[test]
    fn rejects_missing_title() {
        assert!(!validate(&json!({"scenes": [scene("tense")]}), &moods()));
    }

    #[test]
    fn rejects_empty_scenes() {
        assert!(!validate(&json!({"title": "T", "scenes": []}), &moods()));
    }

    #[test]
    fn rejects_non_list_scenes() {
        assert!(!validate(&json!({"title": "T", "scenes": "many"}), &moods()));
    }

    #[test]
    fn rejects_unknown_mood() {
        let sb = json!({"title": "T", "scenes": [scene("tense"), scene("furious")]});
        assert!(!validate(&sb, &moods()));
    }

    #[test]
    fn rejects_missing_scene_field() {
        let sb = json!({"title": "T", "scenes": [{"scene_number": 1, "description": "d", "mood": "tense"}]});
        assert!(!validate(&sb, &moods()));
    }

    #[test]
    fn rejects_non_object() {
        assert!(!validate(&json!([1, 2]), &moods()));
        assert!(!validate(&json!({"title": "T", "scenes": [42]}), &moods()));
    }

    #[test]
    fn rejects_non_string_mood() {
        let sb = json!({"title": "T", "scenes": [scene("tense"), {"scene_number": 2, "description": "d", "dialogue": "", "mood": 3}]});
        assert!(!validate(&sb, &moods()));
    }
}
