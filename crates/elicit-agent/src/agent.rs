//! Individual agents
//!
//! An agent couples an immutable id, a persona attribute record, and a
//! handle to its private memory index. The memory contents themselves are
//! owned by the external memory subsystem; `.agent` files persist only the
//! id and attributes.

use crate::error::AgentError;
use crate::memory::{MemoryIndex, MemoryNode};
use crate::scratch::Scratch;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Truncated v4 UUID, matching the 15-character id form used in persisted
/// registries and `.agent` files
#[must_use]
pub fn short_uuid() -> String {
    uuid::Uuid::new_v4().to_string().chars().take(15).collect()
}

/// Persistable agent state: id plus persona attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Agent id; generated when absent from the file
    #[serde(default = "short_uuid")]
    pub id: String,
    /// Persona attributes
    #[serde(default)]
    pub scratch: Scratch,
}

/// A simulated persona
#[derive(Debug, Clone)]
pub struct Agent {
    id: String,
    /// Persona attributes
    pub scratch: Scratch,
    memory: Arc<dyn MemoryIndex>,
}

impl Agent {
    /// Create an agent with a fresh id
    #[must_use]
    pub fn new(scratch: Scratch, memory: Arc<dyn MemoryIndex>) -> Self {
        Self {
            id: short_uuid(),
            scratch,
            memory,
        }
    }

    /// Reconstruct an agent from a persisted record
    #[must_use]
    pub fn from_record(record: AgentRecord, memory: Arc<dyn MemoryIndex>) -> Self {
        Self {
            id: record.id,
            scratch: record.scratch,
            memory,
        }
    }

    /// Load an agent from an `.agent` file (JSON)
    ///
    /// # Errors
    /// I/O failure or a record that does not deserialize.
    pub fn load(path: &Path, memory: Arc<dyn MemoryIndex>) -> Result<Self, AgentError> {
        let raw = std::fs::read_to_string(path)?;
        let record: AgentRecord = serde_json::from_str(&raw)?;
        Ok(Self::from_record(record, memory))
    }

    /// Write the agent's record to an `.agent` file (JSON)
    ///
    /// # Errors
    /// I/O or serialization failure.
    pub fn save(&self, path: &Path) -> Result<(), AgentError> {
        let raw = serde_json::to_string_pretty(&self.package())?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Immutable agent id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Persona display name
    #[inline]
    #[must_use]
    pub fn fullname(&self) -> String {
        self.scratch.fullname()
    }

    /// Handle to the agent's memory index
    #[inline]
    #[must_use]
    pub fn memory(&self) -> &Arc<dyn MemoryIndex> {
        &self.memory
    }

    /// Package the persistable state
    #[must_use]
    pub fn package(&self) -> AgentRecord {
        AgentRecord {
            id: self.id.clone(),
            scratch: self.scratch.clone(),
        }
    }

    /// Retrieve ranked memories for a set of anchors
    ///
    /// # Errors
    /// Propagates memory subsystem failures.
    pub async fn retrieve(
        &self,
        anchors: &[String],
        time_step: i64,
        n_count: usize,
    ) -> Result<IndexMap<String, Vec<MemoryNode>>, AgentError> {
        self.memory.retrieve(anchors, time_step, n_count).await
    }

    /// Record an observation in the agent's memory
    ///
    /// # Errors
    /// Propagates memory subsystem failures.
    pub async fn remember(&self, content: &str, time_step: i64) -> Result<(), AgentError> {
        self.memory.remember(content, time_step).await
    }

    /// Synthesize a reflection around an anchor
    ///
    /// # Errors
    /// Propagates memory subsystem failures.
    pub async fn reflect(&self, anchor: &str, time_step: i64) -> Result<(), AgentError> {
        self.memory.reflect(anchor, time_step).await
    }

    /// Remove a single memory
    ///
    /// # Errors
    /// Propagates memory subsystem failures.
    pub async fn forget(&self, memory_id: &str) -> Result<(), AgentError> {
        self.memory.forget(memory_id).await
    }

    /// Remove all memories
    ///
    /// # Errors
    /// Propagates memory subsystem failures.
    pub async fn forget_all(&self) -> Result<(), AgentError> {
        self.memory.forget_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct NullMemory;

    #[async_trait]
    impl MemoryIndex for NullMemory {
        async fn retrieve(
            &self,
            _anchors: &[String],
            _time_step: i64,
            _n_count: usize,
        ) -> Result<IndexMap<String, Vec<MemoryNode>>, AgentError> {
            Ok(IndexMap::new())
        }

        async fn remember(&self, _content: &str, _time_step: i64) -> Result<(), AgentError> {
            Ok(())
        }

        async fn reflect(&self, _anchor: &str, _time_step: i64) -> Result<(), AgentError> {
            Ok(())
        }

        async fn forget(&self, _memory_id: &str) -> Result<(), AgentError> {
            Ok(())
        }

        async fn forget_all(&self) -> Result<(), AgentError> {
            Ok(())
        }
    }

    #[test]
    fn short_uuid_is_fifteen_chars() {
        let id = short_uuid();
        assert_eq!(id.chars().count(), 15);
    }

    #[test]
    fn agent_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vera.agent");

        let scratch = Scratch {
            first_name: "Vera".to_string(),
            last_name: "Moss".to_string(),
            age: 42,
            ..Scratch::default()
        };
        let agent = Agent::new(scratch, Arc::new(NullMemory));
        agent.save(&path).unwrap();

        let loaded = Agent::load(&path, Arc::new(NullMemory)).unwrap();
        assert_eq!(loaded.id(), agent.id());
        assert_eq!(loaded.scratch, agent.scratch);
    }

    #[test]
    fn record_without_id_gets_one() {
        let record: AgentRecord =
            serde_json::from_str(r#"{"scratch": {"first_name": "Io"}}"#).unwrap();
        assert_eq!(record.id.chars().count(), 15);
        assert_eq!(record.scratch.first_name, "Io");
    }
}
