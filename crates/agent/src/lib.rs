//! The storyboard generation pipeline.
//!
//! [`StoryboardAgent`] composes the pieces in order:
//!
//! 1. **Retrieve** similar past plots from the knowledge base
//! 2. **Contextualize** with genre background and example dialogue
//! 3. **Prompt** the generative backend and validate its JSON reply,
//!    retrying up to a fixed budget before falling back
//! 4. **Illustrate** each scene, degrading to placeholder frames
//! 5. **Remember** the plot and storyboard for future retrieval

pub mod context;
pub mod generation;
pub mod imaging;
pub mod orchestrator;
pub mod placeholder;
pub mod prompt;
pub mod settings;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::ContextProvider;
pub use generation::{AttemptOutcome, GenerationClient, fallback_storyboard};
pub use imaging::{ImageGenerator, MAX_IMAGE_ATTEMPTS, sanitize};
pub use orchestrator::{GenerateOptions, StoryboardAgent, analyze_mood_value};
pub use prompt::PromptBuilder;
pub use settings::AgentConfig;
pub use validate::validate;
