//! Knowledge base types: the persisted retrieval corpus.
//!
//! On disk the corpus is a single JSON object:
//! `{"plots": [{plot, storyboard, embedding, timestamp}, ...]}`.
//! Records are appended in generation order and never edited.

use serde::{Deserialize, Serialize};
use crate::storyboard::Storyboard;

/// A past generation: the plot, what it produced, and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub plot: String,

    pub storyboard: Storyboard,

    /// Plot embedding; empty when no embedding capability was available
    #[serde(default)]
    pub embedding: Vec<f32>,

    pub timestamp: String,
}

/// The whole persisted corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub plots: Vec<KnowledgeRecord>,
}

impl KnowledgeBase {
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }
}
