//! Backend implementations for Storyweaver.
//!
//! Every type here implements one of the collaborator traits from
//! `storyweaver_core`. The router builds the set a session needs from
//! configuration.

pub mod embedder;
pub mod images;
pub mod openai_compat;
pub mod router;
pub mod wikipedia;

pub use embedder::ProviderEmbedder;
pub use images::OpenAiImageBackend;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, Backends};
pub use wikipedia::WikipediaBackground;
