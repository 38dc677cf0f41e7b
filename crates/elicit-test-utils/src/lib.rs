//! Testing utilities for the elicit workspace
//!
//! Shared test doubles and fixtures: a scripted generator, stub memory
//! indexes, and persona/population builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use elicit_agent::{Agent, AgentError, MemoryIndex, MemoryNode, Population, PopulationSet, Scratch};
use elicit_protocol::{CompletionRequest, Generator, GeneratorError};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Scripted generator double
///
/// Replies are selected by substring match against the request's joined
/// inputs, first match wins; `fail_for` rules are checked before replies.
/// Unmatched requests fall through to the default reply. Every request is
/// recorded for inspection.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    default_reply: String,
    replies: Vec<(String, String)>,
    failures: Vec<String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            default_reply: default_reply.into(),
            ..Self::default()
        }
    }

    /// Reply with `reply` when the joined inputs contain `needle`
    #[must_use]
    pub fn reply_for(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.push((needle.into(), reply.into()));
        self
    }

    /// Fail generation when the joined inputs contain `needle`
    #[must_use]
    pub fn fail_for(mut self, needle: impl Into<String>) -> Self {
        self.failures.push(needle.into());
        self
    }

    /// All requests seen so far, in call order
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GeneratorError> {
        let haystack = request.inputs.join("\n");
        self.calls.lock().push(request);

        if let Some(needle) = self.failures.iter().find(|n| haystack.contains(n.as_str())) {
            return Err(GeneratorError(format!("scripted failure for '{needle}'")));
        }
        let reply = self
            .replies
            .iter()
            .find(|(needle, _)| haystack.contains(needle.as_str()))
            .map_or(&self.default_reply, |(_, reply)| reply);
        Ok(reply.clone())
    }
}

/// Well-formed questionnaire reply: numbered entries with `Response` and
/// `Reasoning` fields
#[must_use]
pub fn questionnaire_reply(entries: &[(&str, &str)]) -> String {
    let mut map = serde_json::Map::new();
    for (index, (response, reasoning)) in entries.iter().enumerate() {
        map.insert(
            (index + 1).to_string(),
            serde_json::json!({ "Response": response, "Reasoning": reasoning }),
        );
    }
    serde_json::Value::Object(map).to_string()
}

/// Well-formed utterance reply
#[must_use]
pub fn utterance_reply(text: &str) -> String {
    serde_json::json!({ "utterance": text }).to_string()
}

/// Memory index double with fixed contents
///
/// Every anchor retrieves the same node list; writes are recorded and
/// retrievable for assertions.
#[derive(Debug, Default)]
pub struct StubMemory {
    nodes: Vec<MemoryNode>,
    remembered: Mutex<Vec<String>>,
    reflected: Mutex<Vec<String>>,
}

impl StubMemory {
    #[must_use]
    pub fn with_contents(contents: &[&str]) -> Self {
        Self {
            nodes: contents
                .iter()
                .enumerate()
                .map(|(i, content)| MemoryNode::new(format!("node_{i}"), *content))
                .collect(),
            ..Self::default()
        }
    }

    pub fn remembered(&self) -> Vec<String> {
        self.remembered.lock().clone()
    }

    pub fn reflected(&self) -> Vec<String> {
        self.reflected.lock().clone()
    }
}

#[async_trait]
impl MemoryIndex for StubMemory {
    async fn retrieve(
        &self,
        anchors: &[String],
        _time_step: i64,
        n_count: usize,
    ) -> Result<IndexMap<String, Vec<MemoryNode>>, AgentError> {
        Ok(anchors
            .iter()
            .map(|anchor| {
                let ranked = self.nodes.iter().take(n_count).cloned().collect();
                (anchor.clone(), ranked)
            })
            .collect())
    }

    async fn remember(&self, content: &str, _time_step: i64) -> Result<(), AgentError> {
        self.remembered.lock().push(content.to_string());
        Ok(())
    }

    async fn reflect(&self, anchor: &str, _time_step: i64) -> Result<(), AgentError> {
        self.reflected.lock().push(anchor.to_string());
        Ok(())
    }

    async fn forget(&self, _memory_id: &str) -> Result<(), AgentError> {
        Ok(())
    }

    async fn forget_all(&self) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Memory index double whose every operation fails
#[derive(Debug, Default)]
pub struct FailingMemory;

#[async_trait]
impl MemoryIndex for FailingMemory {
    async fn retrieve(
        &self,
        _anchors: &[String],
        _time_step: i64,
        _n_count: usize,
    ) -> Result<IndexMap<String, Vec<MemoryNode>>, AgentError> {
        Err(AgentError::Memory("memory subsystem unavailable".to_string()))
    }

    async fn remember(&self, _content: &str, _time_step: i64) -> Result<(), AgentError> {
        Err(AgentError::Memory("memory subsystem unavailable".to_string()))
    }

    async fn reflect(&self, _anchor: &str, _time_step: i64) -> Result<(), AgentError> {
        Err(AgentError::Memory("memory subsystem unavailable".to_string()))
    }

    async fn forget(&self, _memory_id: &str) -> Result<(), AgentError> {
        Err(AgentError::Memory("memory subsystem unavailable".to_string()))
    }

    async fn forget_all(&self) -> Result<(), AgentError> {
        Err(AgentError::Memory("memory subsystem unavailable".to_string()))
    }
}

/// Persona fixture whose self-description carries the agent's name, so a
/// scripted generator can target one agent by name
#[must_use]
pub fn test_scratch(first_name: &str, last_name: &str) -> Scratch {
    Scratch {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        age: 34,
        self_description: format!("{first_name} {last_name} lives a quiet life."),
        private_self_description: format!("{first_name} worries about money."),
        speech_pattern: "Short sentences. Dry humor.".to_string(),
        ..Scratch::default()
    }
}

#[must_use]
pub fn test_agent(first_name: &str, last_name: &str) -> Agent {
    Agent::new(
        test_scratch(first_name, last_name),
        Arc::new(StubMemory::default()),
    )
}

#[must_use]
pub fn test_agent_with_memory(
    first_name: &str,
    last_name: &str,
    memory: Arc<dyn MemoryIndex>,
) -> Agent {
    Agent::new(test_scratch(first_name, last_name), memory)
}

/// Population of `first_names.len()` agents, all sharing the last name
/// "Reyes"
#[must_use]
pub fn test_population(first_names: &[&str]) -> Population {
    Population::new(
        first_names
            .iter()
            .map(|name| test_agent(name, "Reyes"))
            .collect(),
    )
}

/// Single-population set under the given name
#[must_use]
pub fn test_population_set(name: &str, first_names: &[&str]) -> PopulationSet {
    let mut set = PopulationSet::new();
    set.insert(name, test_population(first_names));
    set
}
