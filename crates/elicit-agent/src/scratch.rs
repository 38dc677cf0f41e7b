//! Persona attribute record
//!
//! The scratch holds everything the prompt assembler may draw on when
//! describing an agent: demographics, OCEAN personality scores, free-text
//! self-descriptions, and the agent's speech pattern.

use serde::{Deserialize, Serialize};

/// Persona attributes for one agent
///
/// All fields default to empty/zero so partial `.agent` files load cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scratch {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Age in years
    pub age: u32,
    /// Sex
    pub sex: String,
    /// Census division of residence
    pub census_division: String,
    /// Political ideology
    pub political_ideology: String,
    /// Political party affiliation
    pub political_party: String,
    /// Highest education level
    pub education: String,
    /// Race
    pub race: String,
    /// Ethnicity
    pub ethnicity: String,
    /// Annual income in dollars
    pub annual_income: f64,
    /// Home address
    pub address: String,
    /// Big Five: extraversion score
    pub extraversion: f64,
    /// Big Five: agreeableness score
    pub agreeableness: f64,
    /// Big Five: conscientiousness score
    pub conscientiousness: f64,
    /// Big Five: neuroticism score
    pub neuroticism: f64,
    /// Big Five: openness score
    pub openness: f64,
    /// Free-text fact sheet
    pub fact_sheet: String,
    /// How the agent talks; used in place of private information for
    /// dialogue tasks
    pub speech_pattern: String,
    /// Public self-description
    pub self_description: String,
    /// Private self-description, withheld from dialogue contexts
    pub private_self_description: String,
}

impl Scratch {
    /// Full display name, `"First Last"` with missing parts elided
    #[must_use]
    pub fn fullname(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullname_joins_names() {
        let scratch = Scratch {
            first_name: "Vera".to_string(),
            last_name: "Moss".to_string(),
            ..Scratch::default()
        };
        assert_eq!(scratch.fullname(), "Vera Moss");
    }

    #[test]
    fn fullname_elides_missing_parts() {
        let scratch = Scratch {
            first_name: "Vera".to_string(),
            ..Scratch::default()
        };
        assert_eq!(scratch.fullname(), "Vera");
        assert_eq!(Scratch::default().fullname(), "");
    }

    #[test]
    fn partial_record_deserializes_with_defaults() {
        let scratch: Scratch =
            serde_json::from_str(r#"{"first_name": "Io", "age": 31}"#).unwrap();
        assert_eq!(scratch.first_name, "Io");
        assert_eq!(scratch.age, 31);
        assert_eq!(scratch.speech_pattern, "");
        assert_eq!(scratch.annual_income, 0.0);
    }
}
