//! Generation prompt assembly.

use storyweaver_core::KnowledgeRecord;

/// Retrieved plots listed in the prompt, at most.
const MAX_SIMILAR_PLOTS: usize = 2;

pub struct PromptBuilder {
    moods: Vec<String>,
    context_length: usize,
}

impl PromptBuilder {
    pub fn new(moods: Vec<String>, context_length: usize) -> Self {
        Self {
            moods,
            context_length,
        }
    }

    /// Assemble the user prompt. Pure string composition.
    pub fn build(
        &self,
        plot: &str,
        num_scenes: u32,
        retrieved: &[KnowledgeRecord],
        genre_context: &str,
        example_dialogue: &str,
        visual_style: Option<&str>,
    ) -> String {
        let style_line = visual_style
            .map(|style| format!("- Visual style: {style}\n"))
            .unwrap_or_default();

        format!(
            "Generate a film storyboard in JSON format based on: \"{plot}\"\n\
             Format Requirements:\n\
             - Strictly valid JSON output\n\
             - Title reflecting plot essence\n\
             - {num_scenes} scenes with:\n  \
             • scene_number (1-{num_scenes})\n  \
             • vivid description\n  \
             • natural dialogue\n  \
             • mood from: {moods}\n\
             {style_line}\
             Genre Context:\n\
             {context}\n\
             {similar}\n\
             Example Dialogue:\n\
             {example_dialogue}\n\
             Output:",
            moods = self.mood_list(),
            context = truncate_chars(genre_context, self.context_length),
            similar = similar_plots_block(retrieved),
        )
    }

    /// `['tense', 'joyful', ...]`
    fn mood_list(&self) -> String {
        let quoted: Vec<String> = self.moods.iter().map(|m| format!("'{m}'")).collect();
        format!("[{}]", quoted.join(", "))
    }
}

fn similar_plots_block(retrieved: &[KnowledgeRecord]) -> String {
    if retrieved.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = retrieved
        .iter()
        .take(MAX_SIMILAR_PLOTS)
        .map(|r| format!("- {}", r.plot))
        .collect();
    format!("\nSimilar plots:\n{}", lines.join("\n"))
}

/// First `max` Unicode scalar values of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyweaver_core::Storyboard;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(vec!["tense".into(), "neutral".into()], 10)
    }

    fn record(plot: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            plot: plot.into(),
            storyboard: Storyboard {
                title: "t".into(),
                scenes: vec![],
            },
            embedding: vec![],
            timestamp: "2026-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn full_template_without_extras() {
        let prompt = builder().build("A bank heist", 3, &[], "Heist films.", "\"Go!\"", None);
        let expected = "Generate a film storyboard in JSON format based on: \"A bank heist\"\n\
Format Requirements:\n\
- Strictly valid JSON output\n\
- Title reflecting plot essence\n\
- 3 scenes with:\n  \
• scene_number (1-3)\n  \
• vivid description\n  \
• natural dialogue\n  \
• mood from: ['tense', 'neutral']\n\
Genre Context:\n\
Heist film\n\
\n\
Example Dialogue:\n\
\"Go!\"\n\
Output:";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn includes_at_most_two_similar_plots() {
        let retrieved = vec![record("first"), record("second"), record("third")];
        let prompt = builder().build("p", 2, &retrieved, "ctx", "d", None);
        assert!(prompt.contains("ctx\n\nSimilar plots:\n- first\n- second\nExample Dialogue:"));
        assert!(!prompt.contains("third"));
    }

    #[test]
    fn visual_style_line_only_when_supplied() {
        let with = builder().build("p", 2, &[], "ctx", "d", Some("Noir"));
        assert!(with.contains("• mood from: ['tense', 'neutral']\n- Visual style: Noir\nGenre Context:"));
        let without = builder().build("p", 2, &[], "ctx", "d", None);
        assert!(!without.contains("Visual style"));
    }

    #[test]
    fn truncation_is_exact() {
        assert_eq!(truncate_chars("abcdefghijkl", 10), "abcdefghij");
        assert_eq!(truncate_chars("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
        assert_eq!(truncate_chars("🎬🎬🎬", 2), "🎬🎬");
    }

    #[test]
    fn plot_is_embedded_verbatim() {
        let prompt = builder().build("Ünïcode \"plot\"", 1, &[], "", "", None);
        assert!(prompt.starts_with("Generate a film storyboard in JSON format based on: \"Ünïcode \"plot\"\"\n"));
    }
}
