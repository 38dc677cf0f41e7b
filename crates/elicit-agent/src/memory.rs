//! Memory subsystem boundary
//!
//! The persona memory subsystem (embedding storage, relevance/recency/
//! importance scoring, reflection synthesis) is an external collaborator.
//! This module defines only the capability surface the elicitation engine
//! consumes.

use crate::error::AgentError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One retrieved memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryNode {
    /// Stable identifier within the owning memory index
    pub node_id: String,
    /// Memory content, as text
    pub content: String,
}

impl MemoryNode {
    /// Create a memory node
    #[inline]
    #[must_use]
    pub fn new(node_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            content: content.into(),
        }
    }
}

/// Capability surface of an agent's private memory store
///
/// Implementations own ranking and storage entirely; callers only see
/// ranked content. All methods take `&self` so one index can be shared
/// across concurrent elicitation tasks.
#[async_trait]
pub trait MemoryIndex: Send + Sync + std::fmt::Debug {
    /// Retrieve up to `n_count` ranked memories per anchor
    ///
    /// The returned map is keyed by anchor, in anchor order. An anchor
    /// with no relevant memories may be absent or map to an empty list.
    async fn retrieve(
        &self,
        anchors: &[String],
        time_step: i64,
        n_count: usize,
    ) -> Result<IndexMap<String, Vec<MemoryNode>>, AgentError>;

    /// Record a new observation
    async fn remember(&self, content: &str, time_step: i64) -> Result<(), AgentError>;

    /// Synthesize a reflection around an anchor
    async fn reflect(&self, anchor: &str, time_step: i64) -> Result<(), AgentError>;

    /// Remove a single memory
    async fn forget(&self, memory_id: &str) -> Result<(), AgentError>;

    /// Remove all memories
    async fn forget_all(&self) -> Result<(), AgentError>;
}
