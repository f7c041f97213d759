//! # Storyweaver Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! Storyweaver storyboard generator. This crate has **no transport
//! dependencies**: it defines the storyboard model and the seams that the
//! provider and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (generative model, embedding model, image
//! model, background-context source) is a trait here. Implementations live
//! in `storyweaver-providers`, and the tests in every crate substitute
//! scripted mocks for them.

pub mod background;
pub mod embedding;
pub mod error;
pub mod image;
pub mod knowledge;
pub mod message;
pub mod operation;
pub mod provider;
pub mod storyboard;

// Re-export key types at crate root for ergonomics
pub use background::BackgroundSource;
pub use embedding::Embedder;
pub use error::{Error, Result};
pub use image::{GeneratedImage, ImageBackend, ImageRequest};
pub use knowledge::{KnowledgeBase, KnowledgeRecord};
pub use message::{Message, Role};
pub use operation::{OperationCall, OperationKind};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use storyboard::{Genre, Scene, Storyboard};
