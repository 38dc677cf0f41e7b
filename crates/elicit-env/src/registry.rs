//! Agent registry entries
//!
//! The registry maps administration handles (`agent_pid`) to agents living
//! in named populations. The handle is distinct from the agent's own id so
//! one registry can reference agents across populations, and so the same
//! agent can be enrolled in several environments independently.

use elicit_agent::short_uuid;
use serde::{Deserialize, Serialize};

/// Where a registered agent lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    /// Name of the population holding the agent
    pub population: String,
    /// The agent's own id within that population
    pub agent_id: String,
}

impl AgentRef {
    /// Create a registry entry
    #[inline]
    #[must_use]
    pub fn new(population: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            population: population.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// Fresh administration handle
#[must_use]
pub fn new_agent_pid() -> String {
    format!("agent_pid_{}", short_uuid())
}
