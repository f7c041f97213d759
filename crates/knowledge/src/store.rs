//! File-backed knowledge store holding one JSON document per corpus.
//!
//! The whole corpus lives in a single `{"plots": [...]}` file. Every read
//! goes to disk and every append rewrites the whole file, so changes made
//! by other processes between calls are visible. There is no locking: two
//! concurrent writers can lose each other's appends (last write wins).

use chrono::Local;
use std::path::{Path, PathBuf};
use storyweaver_core::error::KnowledgeError;
use storyweaver_core::knowledge::{KnowledgeBase, KnowledgeRecord};
use storyweaver_core::storyboard::Storyboard;
use tracing::debug;

/// Handle to a knowledge-base file. Holds no cached state.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    path: PathBuf,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty corpus if it does not exist yet.
    pub fn initialize(&self) -> Result<(), KnowledgeError> {
        if self.path.exists() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "Creating empty knowledge base");
        self.write(&KnowledgeBase::default())
    }

    /// Read the full corpus from disk.
    pub fn load(&self) -> Result<KnowledgeBase, KnowledgeError> {
        self.initialize()?;

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            KnowledgeError::Storage(format!(
                "Failed to read knowledge base {}: {e}",
                self.path.display()
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            KnowledgeError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    /// Append one record: read, push, rewrite.
    pub fn append(&self, record: KnowledgeRecord) -> Result<usize, KnowledgeError> {
        let mut kb = self.load()?;
        kb.plots.push(record);
        self.write(&kb)?;
        debug!(path = %self.path.display(), count = kb.len(), "Knowledge base updated");
        Ok(kb.len())
    }

    fn write(&self, kb: &KnowledgeBase) -> Result<(), KnowledgeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                KnowledgeError::Storage(format!("Failed to create knowledge base directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(kb).map_err(|e| {
            KnowledgeError::Storage(format!("Failed to serialize knowledge base: {e}"))
        })?;

        std::fs::write(&self.path, content).map_err(|e| {
            KnowledgeError::Storage(format!("Failed to write knowledge base: {e}"))
        })
    }
}

/// Build a record stamped with the local wall clock.
pub fn new_record(plot: &str, storyboard: &Storyboard, embedding: Vec<f32>) -> KnowledgeRecord {
    KnowledgeRecord {
        plot: plot.to_string(),
        storyboard: storyboard.clone(),
        embedding,
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
    }
}
