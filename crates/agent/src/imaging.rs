//! Per-scene image generation with content-policy retry and placeholders.
//!
//! Each scene gets at most [`MAX_IMAGE_ATTEMPTS`] backend calls. Only a
//! content-policy rejection earns the second call, made with a generic
//! prompt that drops the plot and scene text. Anything else ends in a
//! placeholder frame. Exactly one file is written per scene.

use image::ImageFormat;
use regex_lite::Regex;
use std::path::Path;
use std::sync::Arc;
use storyweaver_core::error::ImageError;
use storyweaver_core::{ImageBackend, ImageRequest, Scene};
use tracing::{debug, info, warn};

use crate::placeholder::write_placeholder;

/// Backend calls per scene, including the policy retry.
pub const MAX_IMAGE_ATTEMPTS: u32 = 2;

/// Softer paraphrases for terms image backends commonly reject.
/// Phrases come before the single words they contain.
const SENSITIVE_TERMS: &[(&str, &str)] = &[
    ("dead body", "still figure"),
    ("crime scene", "investigation site"),
    ("shoots", "confronts"),
    ("shot", "confronted"),
    ("shoot", "confront"),
    ("gunfire", "commotion"),
    ("gun", "device"),
    ("weapon", "tool"),
    ("kills", "confronts"),
    ("killed", "defeated"),
    ("killer", "stranger"),
    ("kill", "confront"),
    ("murder", "mystery"),
    ("blood", "red paint"),
    ("bloody", "dramatic"),
    ("corpse", "still figure"),
    ("dead", "motionless"),
    ("death", "farewell"),
    ("knife", "tool"),
    ("stab", "surprise"),
    ("violence", "tension"),
    ("violent", "intense"),
    ("explosion", "burst of light"),
    ("bomb", "device"),
    ("torture", "interrogation"),
];

/// Lower-case `prompt` and swap sensitive terms on word boundaries.
pub fn sanitize(prompt: &str) -> String {
    let mut text = prompt.to_lowercase();
    for (term, replacement) in SENSITIVE_TERMS {
        let pattern = format!(r"\b{}\b", regex_lite::escape(term));
        if let Ok(re) = Regex::new(&pattern) {
            text = re.replace_all(&text, *replacement).into_owned();
        }
    }
    text
}

pub fn descriptive_prompt(style: &str, plot: &str, scene: &Scene) -> String {
    format!(
        "{style} style storyboard frame for a film about: {plot}. \
         Scene {n}: {description}. Mood: {mood}. \
         Keep a consistent visual style and color palette across all scenes.",
        n = scene.scene_number,
        description = scene.description,
        mood = scene.mood,
    )
}

pub fn generic_prompt(style: &str, mood: &str) -> String {
    format!(
        "{style} style cinematic storyboard frame with a {mood} atmosphere. \
         Keep a consistent visual style and color palette across all scenes."
    )
}

pub fn image_filename(scene_number: u32) -> String {
    format!("scene_{scene_number}.png")
}

pub struct ImageGenerator {
    backend: Arc<dyn ImageBackend>,
    size: String,
}

impl ImageGenerator {
    pub fn new(backend: Arc<dyn ImageBackend>, size: impl Into<String>) -> Self {
        Self {
            backend,
            size: size.into(),
        }
    }

    /// Produce the scene's image file in `output_dir` and return its basename.
    ///
    /// Falls back to a placeholder on every backend or download failure;
    /// errors only if the placeholder itself cannot be written.
    pub async fn generate_for_scene(
        &self,
        scene: &Scene,
        plot: &str,
        visual_style: &str,
        output_dir: &Path,
    ) -> Result<String, ImageError> {
        let n = scene.scene_number;
        let mut prompt = sanitize(&descriptive_prompt(visual_style, plot, scene));

        for attempt in 1..=MAX_IMAGE_ATTEMPTS {
            debug!(scene = n, attempt, backend = self.backend.name(), "Requesting scene image");

            match self.backend.generate(ImageRequest::single(&prompt, &self.size)).await {
                Ok(image) => {
                    match self.backend.download(&image).await {
                        Ok(bytes) => match write_image(output_dir, n, &bytes) {
                            Ok(filename) => {
                                info!(scene = n, file = %filename, "Scene image saved");
                                return Ok(filename);
                            }
                            Err(e) => warn!(scene = n, error = %e, "Could not store scene image"),
                        },
                        Err(e) => warn!(scene = n, error = %e, "Scene image download failed"),
                    }
                    break;
                }
                Err(e) if e.is_content_policy() && attempt < MAX_IMAGE_ATTEMPTS => {
                    warn!(scene = n, attempt, error = %e, "Image prompt rejected, retrying with generic prompt");
                    prompt = sanitize(&generic_prompt(visual_style, &scene.mood));
                }
                Err(e) => {
                    warn!(scene = n, attempt, error = %e, "Scene image generation failed");
                    break;
                }
            }
        }

        let filename = write_placeholder(output_dir, n)?;
        info!(scene = n, file = %filename, "Placeholder image written");
        Ok(filename)
    }
}

/// Store downloaded bytes as `scene_<N>.png`, re-encoding non-PNG data.
fn write_image(dir: &Path, scene_number: u32, bytes: &[u8]) -> Result<String, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Encode(e.to_string()))?;

    std::fs::create_dir_all(dir).map_err(|e| ImageError::Io(format!("{}: {e}", dir.display())))?;
    let filename = image_filename(scene_number);
    let path = dir.join(&filename);
    // Staged under a temporary name; only a complete file is renamed into place.
    let partial = dir.join(format!(".{filename}.part"));

    let written = if image::guess_format(bytes).is_ok_and(|f| f == ImageFormat::Png) {
        std::fs::write(&partial, bytes).map_err(|e| ImageError::Io(format!("{}: {e}", partial.display())))
    } else {
        decoded
            .save_with_format(&partial, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(e.to_string()))
    }
    .and_then(|()| {
        std::fs::rename(&partial, &path).map_err(|e| ImageError::Io(format!("{}: {e}", path.display())))
    });

    if written.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    written.map(|()| filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ImageScript, ScriptedImageBackend, tiny_png};

    fn scene(n: u32) -> Scene {
        Scene::new(n, "The killer hides the dead body", "...", "dark")
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn sanitize_lowercases_and_replaces_whole_words() {
        assert_eq!(
            sanitize("The KILLER hides the Dead Body"),
            "the stranger hides the still figure"
        );
        assert_eq!(sanitize("Blood on the skill tree"), "red paint on the skill tree");
    }

    #[test]
    fn sanitize_leaves_embedded_words() {
        assert_eq!(sanitize("bloodhound skilled deadline"), "bloodhound skilled deadline");
    }

    #[test]
    fn generic_prompt_drops_plot_and_description() {
        let p = generic_prompt("Noir", "tense");
        assert!(p.contains("Noir") && p.contains("tense"));
        assert!(!p.contains("Scene"));
    }

    #[test]
    fn descriptive_prompt_mentions_everything() {
        let p = descriptive_prompt("Anime", "A heist", &scene(2));
        assert!(p.contains("Anime") && p.contains("A heist") && p.contains("Scene 2"));
        assert!(p.contains("dark") && p.contains("consistent visual style"));
    }

    #[tokio::test]
    async fn success_writes_real_image() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::Ok]));
        let generator = ImageGenerator::new(backend.clone(), "1024x1024");

        let name = generator.generate_for_scene(&scene(1), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_1.png");
        assert_eq!(files_in(dir.path()), vec!["scene_1.png"]);
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), tiny_png());
        assert_eq!(backend.prompts()[0], sanitize(&descriptive_prompt("Noir", "plot", &scene(1))));
    }

    #[tokio::test]
    async fn policy_rejection_retries_with_generic_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::Policy, ImageScript::Ok]));
        let generator = ImageGenerator::new(backend.clone(), "1024x1024");

        let name = generator.generate_for_scene(&scene(4), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_4.png");
        assert_eq!(backend.prompts(), vec![
            sanitize(&descriptive_prompt("Noir", "plot", &scene(4))),
            sanitize(&generic_prompt("Noir", "dark")),
        ]);
    }

    #[tokio::test]
    async fn second_rejection_gives_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::Policy, ImageScript::Policy]));
        let generator = ImageGenerator::new(backend.clone(), "1024x1024");

        let name = generator.generate_for_scene(&scene(1), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_1_placeholder.png");
        assert_eq!(backend.prompts().len(), MAX_IMAGE_ATTEMPTS as usize);
        assert_eq!(files_in(dir.path()), vec!["scene_1_placeholder.png"]);
    }

    #[tokio::test]
    async fn other_failure_does_not_retry() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::Error, ImageScript::Ok]));
        let generator = ImageGenerator::new(backend.clone(), "1024x1024");

        let name = generator.generate_for_scene(&scene(2), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_2_placeholder.png");
        assert_eq!(backend.prompts().len(), 1);
    }

    #[tokio::test]
    async fn failed_download_gives_placeholder_only() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::BadDownload]));
        let generator = ImageGenerator::new(backend, "1024x1024");

        let name = generator.generate_for_scene(&scene(1), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_1_placeholder.png");
        assert_eq!(files_in(dir.path()), vec!["scene_1_placeholder.png"]);
    }

    #[tokio::test]
    async fn undecodable_bytes_leave_no_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::Garbage]));
        let generator = ImageGenerator::new(backend, "1024x1024");

        let name = generator.generate_for_scene(&scene(1), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_1_placeholder.png");
        assert_eq!(files_in(dir.path()), vec!["scene_1_placeholder.png"]);
    }

    #[tokio::test]
    async fn failed_store_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        std::fs::create_dir(dir.path().join("scene_1.png")).unwrap();
        let backend = Arc::new(ScriptedImageBackend::new(vec![ImageScript::Ok]));
        let generator = ImageGenerator::new(backend, "1024x1024");

        let name = generator.generate_for_scene(&scene(1), "plot", "Noir", dir.path()).await.unwrap();
        assert_eq!(name, "scene_1_placeholder.png");
        assert_eq!(files_in(dir.path()), vec!["scene_1.png", "scene_1_placeholder.png"]);
    }
}
