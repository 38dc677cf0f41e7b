//! Response store interface
//!
//! Survey and interview environments share one administration skeleton but
//! differ in how completed results land: upsert-by-key into a table versus
//! append-only transcripts. Each variant implements this trait; there are
//! no subclass hooks, only the two concrete stores.

use crate::error::EnvError;
use crate::registry::AgentRef;
use indexmap::IndexMap;
use std::path::Path;

/// Storage semantics of one environment variant
pub trait ResponseStore: Default {
    /// Environment kind tag, used in `env_id` prefixes and logs
    const KIND: &'static str;

    /// Per-agent result merged after a successful wave task
    type WaveResult;

    /// Read the store's snapshot file from a directory
    ///
    /// Returns `Ok(None)` when the file is absent (tolerated; the caller
    /// keeps the default-empty store).
    ///
    /// # Errors
    /// A present but undecodable snapshot.
    fn load(dir: &Path) -> Result<Option<Self>, EnvError>
    where
        Self: Sized;

    /// Write the store's snapshot file into a directory
    ///
    /// # Errors
    /// I/O or encoding failure.
    fn save(&self, dir: &Path) -> Result<(), EnvError>;

    /// Packaged form of the stored responses
    fn package(&self) -> serde_json::Value;

    /// Merge one completed agent result into the store
    ///
    /// Runs on the calling thread, after the wave's full join.
    fn merge(&mut self, agent_pid: &str, result: Self::WaveResult);

    /// Select the agent pids targeted by the next wave
    ///
    /// The default targets the full registry; the survey store narrows
    /// this by inclusion criteria over previously stored responses.
    fn filter(
        &self,
        registry: &IndexMap<String, AgentRef>,
        criteria: &IndexMap<String, Vec<String>>,
    ) -> Vec<String> {
        let _ = criteria;
        registry.keys().cloned().collect()
    }
}
