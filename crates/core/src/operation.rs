//! Operation calls: the uniform dispatch surface of the storyboard agent.
//!
//! Front-ends name an operation and pass JSON arguments; the agent looks
//! the name up and runs it. An unknown name is a caller error, distinct
//! from a failure inside a known operation.

use serde::{Deserialize, Serialize};

/// A request to run a named operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationCall {
    /// Name of the operation to run
    pub name: String,

    /// Arguments as a JSON value
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl OperationCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// The operations the agent exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    GenerateStoryboard,
    AnalyzeMood,
    SaveStoryboard,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::GenerateStoryboard,
        OperationKind::AnalyzeMood,
        OperationKind::SaveStoryboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::GenerateStoryboard => "generate_storyboard",
            OperationKind::AnalyzeMood => "analyze_mood",
            OperationKind::SaveStoryboard => "save_storyboard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
