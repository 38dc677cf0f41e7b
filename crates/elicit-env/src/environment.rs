//! Environment façade
//!
//! An environment owns an agent registry and a response store, shares one
//! administration skeleton across its variants, and persists to a
//! directory snapshot:
//! - `meta.json`: `{ "env_id": ... }`
//! - `agent_registry.json`: `agent_pid -> { population, agent_id }`
//! - `responses.csv` / `responses.json`: the store's own snapshot
//!
//! Load is tolerant: any missing snapshot file is reported and the
//! corresponding structure keeps its default-empty value. The registry
//! only grows; the store is mutated only by wave aggregation.

use crate::error::EnvError;
use crate::interview::InterviewStore;
use crate::registry::{new_agent_pid, AgentRef};
use crate::store::ResponseStore;
use crate::survey::SurveyStore;
use elicit_agent::short_uuid;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Survey environment: questionnaire waves over a typed response table
pub type Survey = Environment<SurveyStore>;

/// Interview environment: scripted dialogue waves over transcripts
pub type Interview = Environment<InterviewStore>;

#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    env_id: String,
}

/// Packaged environment state, as written to a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct EnvPackage {
    /// `meta.json` content
    pub meta: serde_json::Value,
    /// `agent_registry.json` content
    pub agents: serde_json::Value,
    /// Store content in its packaged form
    pub responses: serde_json::Value,
}

/// One environment instance
///
/// `env_id` is generated at creation and stable across save/load. Waves
/// against the same instance must be serialized by the caller; the
/// environment provides no internal locking.
#[derive(Debug)]
pub struct Environment<S: ResponseStore> {
    env_id: String,
    registry: IndexMap<String, AgentRef>,
    store: S,
}

impl<S: ResponseStore> Default for Environment<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ResponseStore> Environment<S> {
    /// Create a fresh environment with an empty registry and store
    #[must_use]
    pub fn new() -> Self {
        Self {
            env_id: format!("{}_{}", S::KIND, short_uuid()),
            registry: IndexMap::new(),
            store: S::default(),
        }
    }

    /// Restore an environment from a directory snapshot
    ///
    /// Tolerant per file: a missing meta, registry, or responses file is
    /// logged and the in-memory structure stays at its default (including
    /// a freshly generated `env_id` when `meta.json` is absent).
    ///
    /// # Errors
    /// A file that exists but cannot be read or decoded.
    pub fn load(dir: &Path) -> Result<Self, EnvError> {
        let mut env = Self::new();

        let meta_path = dir.join("meta.json");
        if meta_path.exists() {
            let meta: Meta = serde_json::from_str(&std::fs::read_to_string(&meta_path)?)?;
            env.env_id = meta.env_id;
            tracing::info!(path = %meta_path.display(), "loaded meta information");
        } else {
            tracing::warn!(path = %meta_path.display(), "meta file not found");
        }

        let registry_path = dir.join("agent_registry.json");
        if registry_path.exists() {
            env.registry = serde_json::from_str(&std::fs::read_to_string(&registry_path)?)?;
            tracing::info!(path = %registry_path.display(), "loaded agent registry");
        } else {
            tracing::warn!(path = %registry_path.display(), "agent registry file not found");
        }

        match S::load(dir)? {
            Some(store) => env.store = store,
            None => tracing::warn!(dir = %dir.display(), "responses file not found"),
        }

        Ok(env)
    }

    /// Environment id, stable across save/load
    #[inline]
    #[must_use]
    pub fn env_id(&self) -> &str {
        &self.env_id
    }

    /// Registered agents, keyed by administration handle
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &IndexMap<String, AgentRef> {
        &self.registry
    }

    /// The response store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Enroll agents, generating a fresh `agent_pid` per entry
    ///
    /// Appends only; there is no removal path for registry entries.
    /// Returns the new handles, in input order.
    pub fn load_agents(&mut self, refs: impl IntoIterator<Item = AgentRef>) -> Vec<String> {
        let mut new_pids = Vec::new();
        for entry in refs {
            let agent_pid = new_agent_pid();
            self.registry.insert(agent_pid.clone(), entry);
            new_pids.push(agent_pid);
        }
        tracing::info!(
            env_id = %self.env_id,
            added = new_pids.len(),
            total = self.registry.len(),
            "registered agents"
        );
        new_pids
    }

    /// Package the environment's full state
    #[must_use]
    pub fn package(&self) -> EnvPackage {
        EnvPackage {
            meta: serde_json::json!({ "env_id": self.env_id }),
            agents: serde_json::to_value(&self.registry).unwrap_or_default(),
            responses: self.store.package(),
        }
    }

    /// Write a directory snapshot
    ///
    /// # Errors
    /// I/O or encoding failure; persistence errors are hard failures.
    pub fn save(&self, dir: &Path) -> Result<(), EnvError> {
        std::fs::create_dir_all(dir)?;

        std::fs::write(
            dir.join("meta.json"),
            serde_json::to_string_pretty(&Meta {
                env_id: self.env_id.clone(),
            })?,
        )?;
        // Serialized directly so registry order survives the round trip.
        std::fs::write(
            dir.join("agent_registry.json"),
            serde_json::to_string_pretty(&self.registry)?,
        )?;
        self.store.save(dir)?;

        tracing::info!(env_id = %self.env_id, dir = %dir.display(), "saved environment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn env_id_carries_kind_prefix() {
        let survey = Survey::new();
        assert!(survey.env_id().starts_with("survey_"));

        let interview = Interview::new();
        assert!(interview.env_id().starts_with("interview_"));
    }

    #[test]
    fn load_agents_appends_with_fresh_pids() {
        let mut env = Survey::new();
        let first = env.load_agents(vec![AgentRef::new("p", "a")]);
        let second = env.load_agents(vec![AgentRef::new("p", "b"), AgentRef::new("q", "c")]);

        assert_eq!(env.registry().len(), 3);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_ne!(first[0], second[0]);
        assert_eq!(env.registry()[&second[1]], AgentRef::new("q", "c"));
    }

    #[test]
    fn missing_snapshot_files_leave_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = Survey::load(dir.path()).unwrap();

        assert!(env.env_id().starts_with("survey_"));
        assert!(env.registry().is_empty());
        assert!(env.store().is_empty());
    }

    #[test]
    fn corrupt_registry_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("agent_registry.json"), "{ not json").unwrap();

        assert!(matches!(Survey::load(dir.path()), Err(EnvError::Json(_))));
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Interview::new();
        env.load_agents(vec![AgentRef::new("p", "a")]);
        env.save(dir.path()).unwrap();

        let restored = Interview::load(dir.path()).unwrap();
        assert_eq!(restored.env_id(), env.env_id());
        assert_eq!(restored.registry(), env.registry());
    }
}
