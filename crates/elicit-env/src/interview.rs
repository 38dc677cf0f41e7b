//! Interview store and interview waves
//!
//! Interview responses land in per-agent transcripts: ordered
//! `(speaker, utterance)` pairs, strictly appended across waves. A failed
//! agent task leaves no partial transcript for that wave.

use crate::environment::Environment;
use crate::error::EnvError;
use crate::store::ResponseStore;
use elicit_agent::PopulationSet;
use elicit_dispatch::{DispatchConfig, Dispatcher, TaskError};
use elicit_protocol::{utterance, Generator};
use indexmap::IndexMap;
use std::path::Path;

/// Transcript speaker name for the scripted side of the dialogue
pub const INTERVIEWER: &str = "Interviewer";

/// Append-only transcript store
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterviewStore {
    transcripts: IndexMap<String, Vec<(String, String)>>,
}

impl InterviewStore {
    /// Transcript for one agent
    #[must_use]
    pub fn transcript(&self, agent_pid: &str) -> Option<&[(String, String)]> {
        self.transcripts.get(agent_pid).map(Vec::as_slice)
    }

    /// All transcripts, keyed by agent pid
    #[inline]
    #[must_use]
    pub fn transcripts(&self) -> &IndexMap<String, Vec<(String, String)>> {
        &self.transcripts
    }

    /// Number of agents with a stored transcript
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    /// Whether no transcript has been stored yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}

impl ResponseStore for InterviewStore {
    const KIND: &'static str = "interview";

    type WaveResult = Vec<(String, String)>;

    fn load(dir: &Path) -> Result<Option<Self>, EnvError> {
        let path = dir.join("responses.json");
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        let transcripts = serde_json::from_str(&raw)?;
        tracing::info!(path = %path.display(), "loaded interview responses");
        Ok(Some(Self { transcripts }))
    }

    fn save(&self, dir: &Path) -> Result<(), EnvError> {
        let raw = serde_json::to_string_pretty(&self.transcripts)?;
        std::fs::write(dir.join("responses.json"), raw)?;
        Ok(())
    }

    fn package(&self) -> serde_json::Value {
        serde_json::to_value(&self.transcripts).unwrap_or_default()
    }

    fn merge(&mut self, agent_pid: &str, result: Self::WaveResult) {
        self.transcripts
            .entry(agent_pid.to_string())
            .or_default()
            .extend(result);
    }
}

impl Environment<InterviewStore> {
    /// Administer one interview wave across the full registry
    ///
    /// Each agent walks the script in order: the interviewer's question is
    /// appended to the working dialogue, then the agent's generated
    /// utterance. Completed transcript segments are appended to the store
    /// after the full join; a failed agent is omitted from this wave with
    /// no partial transcript. The script's per-question durations are
    /// carried for interviewer pacing and do not affect administration.
    pub async fn interview(
        &mut self,
        populations: &PopulationSet,
        generator: &dyn Generator,
        script: &[(String, u32)],
        context: &str,
        config: DispatchConfig,
    ) -> &IndexMap<String, Vec<(String, String)>> {
        tracing::info!(
            env_id = %self.env_id(),
            agents = self.registry().len(),
            turns = script.len(),
            "administering interview wave"
        );

        let units: Vec<_> = self
            .registry()
            .iter()
            .map(|(agent_pid, entry)| {
                let entry = entry.clone();
                (agent_pid.clone(), async move {
                    let agent = populations
                        .resolve(&entry.population, &entry.agent_id)
                        .ok_or_else(|| {
                            TaskError::msg(format!(
                                "agent {} not found in population {}",
                                entry.agent_id, entry.population
                            ))
                        })?;
                    tracing::debug!(agent_id = %entry.agent_id, "interviewing agent");

                    let fullname = agent.fullname();
                    let mut turns: Vec<(String, String)> = Vec::with_capacity(script.len() * 2);
                    for (question, _duration) in script {
                        turns.push((INTERVIEWER.to_string(), question.clone()));
                        let reply = utterance(agent, generator, &turns, context)
                            .await
                            .map_err(|err| TaskError::from(anyhow::Error::new(err)))?;
                        turns.push((fullname.clone(), reply));
                    }
                    Ok(turns)
                })
            })
            .collect();

        let outcomes = Dispatcher::new(config).dispatch(units).await;

        for (agent_pid, outcome) in outcomes {
            // Failures were logged by the dispatcher; no partial transcript.
            if let Ok(turns) = outcome {
                self.store_mut().merge(&agent_pid, turns);
            }
        }
        self.store().transcripts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn turns(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(s, t)| ((*s).to_string(), (*t).to_string()))
            .collect()
    }

    #[test]
    fn merge_creates_then_appends() {
        let mut store = InterviewStore::default();
        store.merge("agent_pid_1", turns(&[("Interviewer", "Hi"), ("Vera", "Hello")]));
        store.merge("agent_pid_1", turns(&[("Interviewer", "Still there?")]));

        let transcript = store.transcript("agent_pid_1").unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].1, "Still there?");
    }

    #[test]
    fn merge_never_touches_other_agents() {
        let mut store = InterviewStore::default();
        store.merge("agent_pid_1", turns(&[("Interviewer", "Hi")]));
        store.merge("agent_pid_2", turns(&[("Interviewer", "Hi")]));

        assert_eq!(store.len(), 2);
        assert_eq!(store.transcript("agent_pid_1").unwrap().len(), 1);
    }

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = InterviewStore::default();
        store.merge("agent_pid_1", turns(&[("Interviewer", "Hi"), ("Vera", "Hello")]));
        store.save(dir.path()).unwrap();

        // The snapshot is the documented pair-list mapping.
        let raw = std::fs::read_to_string(dir.path().join("responses.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["agent_pid_1"][0][0], "Interviewer");
        assert_eq!(value["agent_pid_1"][1][1], "Hello");

        let loaded = InterviewStore::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn missing_snapshot_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        assert!(InterviewStore::load(dir.path()).unwrap().is_none());
    }
}
