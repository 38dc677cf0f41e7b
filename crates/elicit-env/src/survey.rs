//! Survey store and survey waves
//!
//! Survey responses land in a typed table: an ordered column list plus one
//! row per administered agent. Columns grow monotonically as new questions
//! are asked and are never removed; re-surveying an agent overwrites only
//! the cells named by that wave.

use crate::environment::Environment;
use crate::error::EnvError;
use crate::registry::AgentRef;
use crate::store::ResponseStore;
use elicit_agent::PopulationSet;
use elicit_dispatch::{DispatchConfig, Dispatcher, TaskError};
use elicit_protocol::{categorical_resp, Generator, QuestionnaireOutput};
use indexmap::IndexMap;
use std::path::Path;

/// The key column present in every survey table
pub const PID_COLUMN: &str = "agent_pid";

/// Typed survey table
///
/// Invariant: exactly one row per `agent_pid` after any successful upsert;
/// `agent_pid` is always the first column, remaining columns in first-seen
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyStore {
    columns: Vec<String>,
    rows: IndexMap<String, IndexMap<String, String>>,
}

impl Default for SurveyStore {
    fn default() -> Self {
        Self {
            columns: vec![PID_COLUMN.to_string()],
            rows: IndexMap::new(),
        }
    }
}

impl SurveyStore {
    /// Ordered column names
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of stored rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stored value for one agent and question
    #[must_use]
    pub fn value(&self, agent_pid: &str, question: &str) -> Option<&str> {
        self.rows
            .get(agent_pid)
            .and_then(|row| row.get(question))
            .map(String::as_str)
    }

    /// Row cells for one agent, in column order where present
    #[must_use]
    pub fn row(&self, agent_pid: &str) -> Option<&IndexMap<String, String>> {
        self.rows.get(agent_pid)
    }

    /// Stored agent pids, in first-administered order
    pub fn agent_pids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    fn ensure_column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }
}

impl ResponseStore for SurveyStore {
    const KIND: &'static str = "survey";

    type WaveResult = IndexMap<String, String>;

    fn load(dir: &Path) -> Result<Option<Self>, EnvError> {
        let path = dir.join("responses.csv");
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut store = Self::default();
        for header in &headers {
            store.ensure_column(header);
        }

        for record in reader.records() {
            let record = record?;
            let Some(agent_pid) = record.get(0).filter(|pid| !pid.is_empty()) else {
                continue;
            };
            let mut row = IndexMap::new();
            for (column, cell) in headers.iter().skip(1).zip(record.iter().skip(1)) {
                // An empty cell means the question was never answered.
                if !cell.is_empty() {
                    row.insert(column.clone(), cell.to_string());
                }
            }
            store.rows.insert(agent_pid.to_string(), row);
        }
        tracing::info!(path = %path.display(), rows = store.len(), "loaded survey responses");
        Ok(Some(store))
    }

    fn save(&self, dir: &Path) -> Result<(), EnvError> {
        let mut writer = csv::Writer::from_path(dir.join("responses.csv"))?;
        writer.write_record(&self.columns)?;
        for (agent_pid, row) in &self.rows {
            let record: Vec<&str> = self
                .columns
                .iter()
                .map(|column| {
                    if column == PID_COLUMN {
                        agent_pid.as_str()
                    } else {
                        row.get(column).map_or("", String::as_str)
                    }
                })
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn package(&self) -> serde_json::Value {
        if self.is_empty() {
            return serde_json::Value::Array(Vec::new());
        }
        let mut packaged = vec![serde_json::to_value(&self.columns).unwrap_or_default()];
        for (agent_pid, row) in &self.rows {
            let cells: Vec<&str> = self
                .columns
                .iter()
                .map(|column| {
                    if column == PID_COLUMN {
                        agent_pid.as_str()
                    } else {
                        row.get(column).map_or("", String::as_str)
                    }
                })
                .collect();
            packaged.push(serde_json::to_value(cells).unwrap_or_default());
        }
        serde_json::Value::Array(packaged)
    }

    fn merge(&mut self, agent_pid: &str, result: Self::WaveResult) {
        for question in result.keys() {
            self.ensure_column(question);
        }
        let row = self.rows.entry(agent_pid.to_string()).or_default();
        // Cell-level upsert: only this wave's questions are touched.
        for (question, value) in result {
            row.insert(question, value);
        }
    }

    fn filter(
        &self,
        registry: &IndexMap<String, AgentRef>,
        criteria: &IndexMap<String, Vec<String>>,
    ) -> Vec<String> {
        if criteria.is_empty() {
            return registry.keys().cloned().collect();
        }
        // Criteria are conjunctive over stored responses; an agent with no
        // stored value for a named question never qualifies.
        self.rows
            .iter()
            .filter(|(_, row)| {
                criteria.iter().all(|(question, allowed)| {
                    row.get(question)
                        .is_some_and(|value| allowed.iter().any(|a| a == value))
                })
            })
            .map(|(agent_pid, _)| agent_pid.clone())
            .collect()
    }
}

/// One agent's completed survey result for a wave
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    /// Administration handle of the respondent
    pub agent_pid: String,
    /// Parsed responses and reasonings, in question order
    pub output: QuestionnaireOutput,
}

impl Environment<SurveyStore> {
    /// Administer one survey wave
    ///
    /// Selects targets by `inclusion_criteria` over previously stored
    /// responses (empty criteria target the full registry), fans one
    /// categorical questionnaire per agent through the bounded dispatcher,
    /// joins, then merges completed results into the table by cell-level
    /// upsert. A failed task or fail-safe response is logged and omitted
    /// from the wave; the agent's existing row is untouched.
    pub async fn survey(
        &mut self,
        populations: &PopulationSet,
        generator: &dyn Generator,
        questions: &IndexMap<String, Vec<String>>,
        inclusion_criteria: &IndexMap<String, Vec<String>>,
        config: DispatchConfig,
    ) -> Vec<SurveyRecord> {
        let targets = self.store().filter(self.registry(), inclusion_criteria);
        if targets.is_empty() {
            tracing::info!(env_id = %self.env_id(), "no agents meet the inclusion criteria");
            return Vec::new();
        }
        tracing::info!(
            env_id = %self.env_id(),
            agents = targets.len(),
            questions = questions.len(),
            "administering survey wave"
        );

        let registry = self.registry();
        let units: Vec<_> = targets
            .into_iter()
            .map(|agent_pid| {
                let entry = registry.get(&agent_pid).cloned();
                (agent_pid, async move {
                    let entry = entry
                        .ok_or_else(|| TaskError::msg("agent_pid not present in registry"))?;
                    let agent = populations
                        .resolve(&entry.population, &entry.agent_id)
                        .ok_or_else(|| {
                            TaskError::msg(format!(
                                "agent {} not found in population {}",
                                entry.agent_id, entry.population
                            ))
                        })?;
                    tracing::debug!(agent_id = %entry.agent_id, "generating survey response");
                    categorical_resp(agent, generator, questions)
                        .await
                        .map_err(|err| TaskError::from(anyhow::Error::new(err)))
                })
            })
            .collect();

        let outcomes = Dispatcher::new(config).dispatch(units).await;

        let mut records = Vec::new();
        for (agent_pid, outcome) in outcomes {
            match outcome {
                Ok(Some(output)) => {
                    let wave: IndexMap<String, String> = questions
                        .keys()
                        .cloned()
                        .zip(output.responses.iter().map(ToString::to_string))
                        .collect();
                    self.store_mut().merge(&agent_pid, wave);
                    records.push(SurveyRecord { agent_pid, output });
                }
                Ok(None) => {
                    tracing::warn!(
                        agent_pid = %agent_pid,
                        "fail-safe survey response; omitting agent from this wave"
                    );
                }
                // Task failures were already logged by the dispatcher.
                Err(_) => {}
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wave(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(q, v)| ((*q).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn merge_appends_new_row_and_columns() {
        let mut store = SurveyStore::default();
        store.merge("agent_pid_1", wave(&[("Likes coffee?", "Yes")]));

        assert_eq!(store.columns(), ["agent_pid", "Likes coffee?"]);
        assert_eq!(store.value("agent_pid_1", "Likes coffee?"), Some("Yes"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_is_cell_level_upsert() {
        let mut store = SurveyStore::default();
        store.merge("agent_pid_1", wave(&[("Q1", "Yes"), ("Q2", "No")]));
        store.merge("agent_pid_1", wave(&[("Q2", "Maybe")]));

        assert_eq!(store.len(), 1);
        assert_eq!(store.value("agent_pid_1", "Q1"), Some("Yes"));
        assert_eq!(store.value("agent_pid_1", "Q2"), Some("Maybe"));
    }

    #[test]
    fn columns_grow_monotonically_in_first_seen_order() {
        let mut store = SurveyStore::default();
        store.merge("agent_pid_1", wave(&[("Q1", "a")]));
        store.merge("agent_pid_2", wave(&[("Q2", "b"), ("Q1", "c")]));
        store.merge("agent_pid_1", wave(&[("Q1", "d")]));

        assert_eq!(store.columns(), ["agent_pid", "Q1", "Q2"]);
    }

    #[test]
    fn empty_criteria_target_full_registry() {
        let store = SurveyStore::default();
        let mut registry = IndexMap::new();
        registry.insert("agent_pid_1".to_string(), AgentRef::new("p", "a"));
        registry.insert("agent_pid_2".to_string(), AgentRef::new("p", "b"));

        let targets = store.filter(&registry, &IndexMap::new());
        assert_eq!(targets, vec!["agent_pid_1", "agent_pid_2"]);
    }

    #[test]
    fn criteria_are_conjunctive_over_stored_values() {
        let mut store = SurveyStore::default();
        store.merge("agent_pid_1", wave(&[("Q1", "x"), ("Q2", "m")]));
        store.merge("agent_pid_2", wave(&[("Q1", "y"), ("Q2", "n")]));
        store.merge("agent_pid_3", wave(&[("Q1", "x")]));

        let mut registry = IndexMap::new();
        for pid in ["agent_pid_1", "agent_pid_2", "agent_pid_3", "agent_pid_4"] {
            registry.insert(pid.to_string(), AgentRef::new("p", pid));
        }

        let mut criteria = IndexMap::new();
        criteria.insert("Q1".to_string(), vec!["x".to_string(), "y".to_string()]);
        criteria.insert("Q2".to_string(), vec!["m".to_string()]);

        // agent 2 fails Q2, agent 3 has no Q2 value, agent 4 has no row.
        let targets = store.filter(&registry, &criteria);
        assert_eq!(targets, vec!["agent_pid_1"]);
    }

    #[test]
    fn csv_round_trip_preserves_sparse_cells() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SurveyStore::default();
        store.merge("agent_pid_1", wave(&[("Q1", "Yes")]));
        store.merge("agent_pid_2", wave(&[("Q2", "8")]));
        store.save(dir.path()).unwrap();

        let loaded = SurveyStore::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.columns(), store.columns());
        assert_eq!(loaded.value("agent_pid_1", "Q1"), Some("Yes"));
        assert_eq!(loaded.value("agent_pid_1", "Q2"), None);
        assert_eq!(loaded.value("agent_pid_2", "Q2"), Some("8"));
    }

    #[test]
    fn missing_snapshot_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SurveyStore::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn package_is_header_plus_rows() {
        let mut store = SurveyStore::default();
        store.merge("agent_pid_1", wave(&[("Q1", "Yes")]));

        let packaged = store.package();
        let rows = packaged.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "Q1");
        assert_eq!(rows[1][0], "agent_pid_1");
        assert_eq!(rows[1][1], "Yes");
    }
}
