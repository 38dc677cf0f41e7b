//! Agent collections
//!
//! A population is an ordered sequence of agents plus a separate id→index
//! map, exposing slicing and concatenation as plain methods rather than
//! inherited container behavior. Duplicate ids are tolerated but flagged.

use crate::agent::{Agent, AgentRecord};
use crate::error::AgentError;
use crate::memory::MemoryIndex;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Ordered collection of agents with O(1) id lookup
#[derive(Debug, Clone, Default)]
pub struct Population {
    agents: Vec<Agent>,
    id_to_index: HashMap<String, usize>,
    has_duplicates: bool,
}

impl Population {
    /// Build a population from an ordered agent list
    ///
    /// Duplicate ids are tolerated; the id map keeps the first occurrence
    /// and the condition is logged and exposed via
    /// [`has_duplicate_ids`](Population::has_duplicate_ids).
    #[must_use]
    pub fn new(agents: Vec<Agent>) -> Self {
        let mut id_to_index = HashMap::with_capacity(agents.len());
        let mut has_duplicates = false;
        for (index, agent) in agents.iter().enumerate() {
            if id_to_index.contains_key(agent.id()) {
                has_duplicates = true;
            } else {
                id_to_index.insert(agent.id().to_string(), index);
            }
        }
        if has_duplicates {
            tracing::warn!("duplicate agent ids detected in population");
        }
        Self {
            agents,
            id_to_index,
            has_duplicates,
        }
    }

    /// Load every `*.agent` file in a directory
    ///
    /// `memory_for` supplies each loaded agent's memory handle, keeping the
    /// memory subsystem an external collaborator. Files are loaded in
    /// lexicographic name order so population order is reproducible.
    ///
    /// # Errors
    /// - [`AgentError::PopulationNotFound`] when the directory is missing
    /// - I/O or record errors from individual agent files
    pub fn load(
        dir: &Path,
        memory_for: impl Fn(&AgentRecord) -> Arc<dyn MemoryIndex>,
    ) -> Result<Self, AgentError> {
        if !dir.is_dir() {
            return Err(AgentError::PopulationNotFound(dir.to_path_buf()));
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "agent"))
            .collect();
        paths.sort();

        let mut agents = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = std::fs::read_to_string(&path)?;
            let record: AgentRecord = serde_json::from_str(&raw)?;
            let memory = memory_for(&record);
            agents.push(Agent::from_record(record, memory));
        }
        tracing::info!(count = agents.len(), dir = %dir.display(), "loaded population");
        Ok(Self::new(agents))
    }

    /// Save every agent to `<dir>/<id>.agent`
    ///
    /// # Errors
    /// I/O or serialization failure.
    pub fn save(&self, dir: &Path) -> Result<(), AgentError> {
        std::fs::create_dir_all(dir)?;
        for agent in &self.agents {
            agent.save(&dir.join(format!("{}.agent", agent.id())))?;
        }
        Ok(())
    }

    /// Agent at a position
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    /// Agent by id (first occurrence when ids collide)
    #[inline]
    #[must_use]
    pub fn get_agent(&self, agent_id: &str) -> Option<&Agent> {
        self.id_to_index.get(agent_id).map(|&i| &self.agents[i])
    }

    /// Ordered agent ids
    #[must_use]
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(Agent::id).collect()
    }

    /// Whether two or more agents share an id
    #[inline]
    #[must_use]
    pub fn has_duplicate_ids(&self) -> bool {
        self.has_duplicates
    }

    /// Sub-population covering `range`, in order
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self::new(self.agents[range].to_vec())
    }

    /// Concatenate two populations, preserving order
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.agents.extend(other.agents);
        Self::new(self.agents)
    }

    /// Iterate agents in order
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Number of agents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Agent;
    type IntoIter = std::slice::Iter<'a, Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}

/// Named populations, as referenced by environment registries
///
/// A registry entry names an agent by `(population, agent_id)`; this set
/// resolves such pairs to live agents.
#[derive(Debug, Clone, Default)]
pub struct PopulationSet {
    populations: IndexMap<String, Population>,
}

impl PopulationSet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a named population
    pub fn insert(&mut self, name: impl Into<String>, population: Population) {
        self.populations.insert(name.into(), population);
    }

    /// Population by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Population> {
        self.populations.get(name)
    }

    /// Resolve a `(population, agent_id)` pair to an agent
    #[inline]
    #[must_use]
    pub fn resolve(&self, population: &str, agent_id: &str) -> Option<&Agent> {
        self.populations.get(population)?.get_agent(agent_id)
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.populations.keys().map(String::as_str)
    }
}
