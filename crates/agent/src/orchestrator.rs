//! StoryboardAgent: the end-to-end pipeline and its dispatch surface.
//!
//! # Flow
//!
//! 1. Retrieve similar past plots from the knowledge base
//! 2. Detect the genre and gather background and example dialogue
//! 3. Build the prompt and run the call-and-validate loop
//! 4. Optionally render one image per scene
//! 5. Append the result to the knowledge base

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storyweaver_core::error::{Error, Result};
use storyweaver_core::{
    BackgroundSource, Embedder, ImageBackend, OperationCall, OperationKind, Provider, Storyboard,
};
use storyweaver_knowledge::{KnowledgeStore, Retriever, new_record};
use tracing::{debug, error, info, warn};

use crate::context::ContextProvider;
use crate::generation::GenerationClient;
use crate::imaging::ImageGenerator;
use crate::prompt::PromptBuilder;
use crate::settings::AgentConfig;

/// Past plots requested from the retriever per generation.
const RETRIEVAL_TOP_K: usize = 3;

const DEFAULT_NUM_SCENES: u32 = 3;

const UNKNOWN_MOOD: &str = "unknown";

/// Per-call knobs for [`StoryboardAgent::generate_storyboard`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Requested look; images are produced only when this is set.
    pub visual_style: Option<String>,
    /// Where scene images go. Defaults to the knowledge base's directory.
    pub output_dir: Option<PathBuf>,
}

pub struct StoryboardAgent {
    retriever: Retriever,
    context: ContextProvider,
    prompts: PromptBuilder,
    generator: GenerationClient,
    images: Option<ImageGenerator>,
}

impl StoryboardAgent {
    /// Wire the pipeline and make sure the knowledge base file exists.
    pub fn new(
        config: AgentConfig,
        provider: Arc<dyn Provider>,
        embedder: Option<Arc<dyn Embedder>>,
        images: Option<Arc<dyn ImageBackend>>,
        background: Option<Arc<dyn BackgroundSource>>,
        knowledge_base: impl Into<PathBuf>,
    ) -> Result<Self> {
        let store = KnowledgeStore::new(knowledge_base);
        store.initialize()?;

        info!(
            provider = provider.name(),
            model = %config.model,
            knowledge_base = %store.path().display(),
            embeddings = embedder.is_some(),
            images = images.is_some(),
            "Storyboard agent ready"
        );

        Ok(Self {
            retriever: Retriever::new(store, embedder, config.rag_threshold),
            context: ContextProvider::new(background, config.default_genre.clone()),
            prompts: PromptBuilder::new(config.moods.clone(), config.context_length),
            generator: GenerationClient::new(provider, &config),
            images: images.map(|backend| ImageGenerator::new(backend, config.image_size.clone())),
        })
    }

    pub fn knowledge_base_path(&self) -> &Path {
        self.retriever.store().path()
    }

    /// Run the full pipeline. Always returns a storyboard, possibly the fallback.
    pub async fn generate_storyboard(
        &self,
        plot: &str,
        num_scenes: u32,
        options: &GenerateOptions,
    ) -> Storyboard {
        let retrieved = match self.retriever.retrieve_similar(plot, RETRIEVAL_TOP_K).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Retrieval skipped");
                Vec::new()
            }
        };
        debug!(similar = retrieved.len(), "Retrieval complete");

        let genre = self.context.detect_genre(plot);
        let background = self.context.fetch_background(&genre).await;
        let dialogue = self.context.fetch_example_dialogue(&genre);

        let style = self.images.as_ref().and(options.visual_style.as_deref());
        let prompt = self
            .prompts
            .build(plot, num_scenes, &retrieved, &background, dialogue, style);

        let mut storyboard = self.generator.generate(&prompt).await;

        if let (Some(images), Some(style)) = (&self.images, style) {
            let dir = options
                .output_dir
                .clone()
                .unwrap_or_else(|| self.default_output_dir());
            for scene in storyboard.scenes.iter_mut() {
                match images.generate_for_scene(scene, plot, style, &dir).await {
                    Ok(filename) => scene.image_filename = Some(filename),
                    Err(e) => error!(scene = scene.scene_number, error = %e, "No image for scene"),
                }
            }
        }

        self.update_knowledge_base(plot, &storyboard).await;
        storyboard
    }

    fn default_output_dir(&self) -> PathBuf {
        self.knowledge_base_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Append the plot and storyboard to the knowledge base. Failures are logged only.
    pub async fn update_knowledge_base(&self, plot: &str, storyboard: &Storyboard) {
        let embedding = self.retriever.embed(plot).await.unwrap_or_default();
        match self.retriever.store().append(new_record(plot, storyboard, embedding)) {
            Ok(count) => debug!(records = count, "Knowledge base updated"),
            Err(e) => warn!(error = %e, "Could not update knowledge base"),
        }
    }

    /// Count scenes per mood.
    pub fn analyze_mood(&self, storyboard: &Storyboard) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for scene in &storyboard.scenes {
            *counts.entry(scene.mood.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Write `storyboard` as 2-space indented JSON. Returns false on failure.
    pub fn save_storyboard<T: Serialize>(&self, storyboard: &T, path: &Path) -> bool {
        match write_json(storyboard, path) {
            Ok(()) => {
                info!(path = %path.display(), "Storyboard saved");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error saving storyboard");
                false
            }
        }
    }

    /// Dispatch a named operation.
    ///
    /// Unknown names are an error. Failures inside a known operation are
    /// logged and come back as `Ok(None)`.
    pub async fn execute(&self, call: OperationCall) -> Result<Option<Value>> {
        let Some(kind) = OperationKind::from_name(&call.name) else {
            return Err(Error::UnknownOperation(call.name));
        };

        info!(operation = %kind, "Executing operation");
        match self.run(kind, call.arguments).await {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                error!(operation = %kind, error = %e, "Operation failed");
                Ok(None)
            }
        }
    }

    async fn run(&self, kind: OperationKind, arguments: Value) -> Result<Value> {
        match kind {
            OperationKind::GenerateStoryboard => {
                let args: GenerateArgs = parse_args(arguments)?;
                let options = GenerateOptions {
                    visual_style: args.visual_style,
                    output_dir: args.output_dir,
                };
                let storyboard = self
                    .generate_storyboard(&args.plot, args.num_scenes, &options)
                    .await;
                Ok(serde_json::to_value(storyboard)?)
            }
            OperationKind::AnalyzeMood => {
                let args: MoodArgs = parse_args(arguments)?;
                Ok(serde_json::to_value(analyze_mood_value(&args.storyboard))?)
            }
            OperationKind::SaveStoryboard => {
                let args: SaveArgs = parse_args(arguments)?;
                Ok(Value::Bool(self.save_storyboard(&args.storyboard, &args.path)))
            }
        }
    }
}

/// Mood counts over raw storyboard JSON; scenes without a mood count as "unknown".
pub fn analyze_mood_value(storyboard: &Value) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let scenes = storyboard
        .get("scenes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for scene in scenes {
        let mood = scene.get("mood").and_then(Value::as_str).unwrap_or(UNKNOWN_MOOD);
        *counts.entry(mood.to_string()).or_insert(0) += 1;
    }
    counts
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Internal(format!("create {}: {e}", parent.display())))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .map_err(|e| Error::Internal(format!("write {}: {e}", path.display())))
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArguments(e.to_string()))
}

fn default_num_scenes() -> u32 {
    DEFAULT_NUM_SCENES
}

#[derive(Debug, Deserialize)]
struct GenerateArgs {
    plot: String,
    #[serde(default = "default_num_scenes")]
    num_scenes: u32,
    #[serde(default)]
    visual_style: Option<String>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct MoodArgs {
    storyboard: Value,
}

#[derive(Debug, Deserialize)]
struct SaveArgs {
    storyboard: Value,
    path: PathBuf,
}
