//! Plot knowledge base for StoryWeaver.

pub mod retriever;
pub mod store;
pub mod vector;

pub use retriever::Retriever;
pub use store::{KnowledgeStore, new_record};
pub use vector::{cosine_similarity, rank_records};
