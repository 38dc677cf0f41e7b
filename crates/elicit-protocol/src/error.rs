//! Error types for the interaction protocol
//!
//! Three distinct fates:
//! - [`ValidationError`]: the task itself is mis-specified; fatal, raised
//!   before any generation attempt.
//! - [`ParseError`]: generator output did not yield the expected shape;
//!   recovered by substituting the task's fail-safe value.
//! - [`ProtocolError`]: everything that can surface from one interaction
//!   operation (validation, memory subsystem failures).

use elicit_agent::AgentError;

/// Malformed task specification
///
/// Raised during question normalization, before any prompt is assembled or
/// generator call made; no partial work is performed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Categorical question declared without its option set
    #[error("categorical question missing response options: {question}")]
    MissingOptions {
        /// Offending question text
        question: String,
    },

    /// Numeric question declared without its scale
    #[error("numerical question missing response scale: {question}")]
    MissingScale {
        /// Offending question text
        question: String,
    },
}

/// Generator output did not yield the expected structured shape
///
/// Never propagated to callers of the interaction operations; the task's
/// fail-safe value is substituted instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No well-formed JSON object anywhere in the output text
    #[error("no JSON object found in generator output")]
    NoJson,

    /// A required questionnaire entry is absent
    #[error("missing entry for question {index}")]
    MissingEntry {
        /// 1-based question index
        index: usize,
    },

    /// An entry exists but lacks a required field
    #[error("question {index} missing field {field:?}")]
    MissingField {
        /// 1-based question index
        index: usize,
        /// Field name
        field: &'static str,
    },

    /// A value could not be coerced to the declared numeric type
    #[error("cannot coerce {value:?} to {expected}")]
    Coercion {
        /// Textual form of the offending value
        value: String,
        /// Target type name
        expected: &'static str,
    },
}

/// Errors surfaced by interaction operations
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Task specification failed validation
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Agent or memory subsystem failure during prompt assembly or the
    /// post-generation memory commit
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
}
