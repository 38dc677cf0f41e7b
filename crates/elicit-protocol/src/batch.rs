//! Population-level parallel operations
//!
//! `ask_all`, `remember_all`, and `reflect_all` apply the same bounded
//! worker pool and per-task isolation as environment waves, but directly
//! over a [`Population`] with no response-store aggregation: results come
//! back as a plain list aligned to population order, or nowhere at all for
//! the fire-and-forget memory operations.

use crate::error::ProtocolError;
use crate::generator::Generator;
use crate::interaction::{ask, AskAnswer};
use crate::questions::{normalize, AskQuestion};
use elicit_dispatch::{DispatchConfig, Dispatcher, TaskError};
use elicit_agent::Population;

/// Ask every agent the same ordered question list, in parallel
///
/// The question list is validated once before dispatch; per-agent failures
/// after that point are isolated and reported in the agent's slot. The
/// returned list is aligned to population order, one entry per agent.
///
/// # Errors
/// [`ProtocolError::Validation`] when the question list is mis-specified;
/// raised before any task is submitted.
pub async fn ask_all(
    population: &Population,
    generator: &dyn Generator,
    questions: &[AskQuestion],
    remember: bool,
    config: DispatchConfig,
) -> Result<Vec<(String, Result<Vec<AskAnswer>, TaskError>)>, ProtocolError> {
    // Surface specification mistakes before any agent is touched.
    normalize(questions)?;

    let dispatcher = Dispatcher::new(config);
    let units: Vec<_> = population
        .iter()
        .map(|agent| {
            let key = agent.id().to_string();
            (key, async move {
                ask(agent, generator, questions, remember)
                    .await
                    .map_err(|err| TaskError::from(anyhow::Error::new(err)))
            })
        })
        .collect();

    Ok(dispatcher.dispatch(units).await)
}

/// Commit the same observation to every agent's memory, in parallel
///
/// Fire-and-forget: failures are logged by the dispatcher and otherwise
/// dropped.
pub async fn remember_all(
    population: &Population,
    content: &str,
    time_step: i64,
    config: DispatchConfig,
) {
    let dispatcher = Dispatcher::new(config);
    let units: Vec<_> = population
        .iter()
        .map(|agent| {
            let key = agent.id().to_string();
            (key, async move {
                agent
                    .remember(content, time_step)
                    .await
                    .map_err(|err| TaskError::from(anyhow::Error::new(err)))
            })
        })
        .collect();

    dispatcher.dispatch_collect(units).await;
}

/// Trigger a reflection around the same anchor for every agent, in parallel
///
/// Fire-and-forget, like [`remember_all`].
pub async fn reflect_all(
    population: &Population,
    anchor: &str,
    time_step: i64,
    config: DispatchConfig,
) {
    let dispatcher = Dispatcher::new(config);
    let units: Vec<_> = population
        .iter()
        .map(|agent| {
            let key = agent.id().to_string();
            (key, async move {
                agent
                    .reflect(anchor, time_step)
                    .await
                    .map_err(|err| TaskError::from(anyhow::Error::new(err)))
            })
        })
        .collect();

    dispatcher.dispatch_collect(units).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{CompletionRequest, GeneratorError};
    use crate::parser::ResponseValue;
    use async_trait::async_trait;
    use elicit_agent::{Agent, AgentError, MemoryIndex, MemoryNode, Scratch};
    use indexmap::IndexMap;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct CountingMemory {
        remembered: Mutex<Vec<String>>,
        reflected: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl MemoryIndex for CountingMemory {
        async fn retrieve(
            &self,
            _anchors: &[String],
            _time_step: i64,
            _n_count: usize,
        ) -> Result<IndexMap<String, Vec<MemoryNode>>, AgentError> {
            if self.fail {
                return Err(AgentError::Memory("index offline".to_string()));
            }
            Ok(IndexMap::new())
        }

        async fn remember(&self, content: &str, _time_step: i64) -> Result<(), AgentError> {
            if self.fail {
                return Err(AgentError::Memory("index offline".to_string()));
            }
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

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, GeneratorError> {
            Ok(r#"{"1": {"Response": "Tea", "Reasoning": "habit"}}"#.to_string())
        }
    }

    fn population_of(memories: Vec<Arc<CountingMemory>>) -> Population {
        let agents = memories
            .into_iter()
            .enumerate()
            .map(|(i, memory)| {
                Agent::new(
                    Scratch {
                        first_name: format!("agent{i}"),
                        ..Scratch::default()
                    },
                    memory,
                )
            })
            .collect();
        Population::new(agents)
    }

    #[tokio::test]
    async fn ask_all_aligned_to_population_order() {
        let population = population_of(vec![
            Arc::new(CountingMemory::default()),
            Arc::new(CountingMemory::default()),
            Arc::new(CountingMemory::default()),
        ]);
        let questions = vec![AskQuestion::open("What do you drink?")];

        let results = ask_all(
            &population,
            &EchoGenerator,
            &questions,
            false,
            DispatchConfig::default().with_max_workers(2),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 3);
        for ((key, outcome), agent) in results.iter().zip(&population) {
            assert_eq!(key, agent.id());
            let answers = outcome.as_ref().unwrap();
            assert_eq!(answers[0].response, ResponseValue::from("Tea"));
        }
    }

    #[tokio::test]
    async fn ask_all_isolates_failing_agent() {
        let bad = Arc::new(CountingMemory {
            fail: true,
            ..CountingMemory::default()
        });
        let population = population_of(vec![
            Arc::new(CountingMemory::default()),
            bad,
            Arc::new(CountingMemory::default()),
        ]);
        let questions = vec![AskQuestion::open("What do you drink?")];

        let results = ask_all(
            &population,
            &EchoGenerator,
            &questions,
            false,
            DispatchConfig::default(),
        )
        .await
        .unwrap();

        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
    }

    #[tokio::test]
    async fn ask_all_rejects_invalid_questions_before_dispatch() {
        let population = population_of(vec![Arc::new(CountingMemory::default())]);
        let mut bad = AskQuestion::int("Rate happiness", "1-10");
        bad.response_scale = None;

        let result = ask_all(
            &population,
            &EchoGenerator,
            &[bad],
            false,
            DispatchConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(ProtocolError::Validation(_))));
    }

    #[tokio::test]
    async fn remember_all_reaches_every_agent() {
        let memories = vec![
            Arc::new(CountingMemory::default()),
            Arc::new(CountingMemory::default()),
        ];
        let population = population_of(memories.iter().map(Arc::clone).collect());

        remember_all(&population, "The town flooded", 3, DispatchConfig::default()).await;

        for memory in &memories {
            assert_eq!(memory.remembered.lock().as_slice(), ["The town flooded"]);
        }
    }

    #[tokio::test]
    async fn reflect_all_reaches_every_agent() {
        let memories = vec![
            Arc::new(CountingMemory::default()),
            Arc::new(CountingMemory::default()),
        ];
        let population = population_of(memories.iter().map(Arc::clone).collect());

        reflect_all(&population, "the flood", 3, DispatchConfig::default()).await;

        for memory in &memories {
            assert_eq!(memory.reflected.lock().as_slice(), ["the flood"]);
        }
    }
}
