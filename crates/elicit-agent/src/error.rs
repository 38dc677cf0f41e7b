//! Error types for agents and populations

use std::path::PathBuf;

/// Agent-layer errors
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Memory subsystem reported a failure
    #[error("memory index error: {0}")]
    Memory(String),

    /// Reading or writing an `.agent` file failed
    #[error("agent file i/o: {0}")]
    Io(#[from] std::io::Error),

    /// An `.agent` file or record did not deserialize
    #[error("agent record error: {0}")]
    Record(#[from] serde_json::Error),

    /// Population directory does not exist
    #[error("population not found at {0}")]
    PopulationNotFound(PathBuf),
}
