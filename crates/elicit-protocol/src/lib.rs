//! Elicit Protocol - per-agent interaction operations
//!
//! Each elicitation task kind composes the same pipeline:
//! build an anchor → assemble the agent description from persona state and
//! retrieved memory → select a prompt template by cardinality → call the
//! generator → parse/validate/coerce the output → optionally commit the
//! exchange to memory.
//!
//! Four task kinds are provided:
//! - [`categorical_resp`]: multiple-choice questions
//! - [`numerical_resp`]: numeric questions with int/float coercion
//! - [`ask`]: mixed-type ordered question lists
//! - [`utterance`]: one dialogue turn
//!
//! Malformed generator output never raises: the task's declared fail-safe
//! value is substituted and the call completes ([`safe_generate`]).
//! Mis-specified questions, by contrast, fail before any generation call.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod assemble;
pub mod batch;
pub mod error;
pub mod generator;
pub mod interaction;
pub mod parser;
pub mod questions;

pub use batch::{ask_all, reflect_all, remember_all};
pub use error::{ParseError, ProtocolError, ValidationError};
pub use generator::{safe_generate, CompletionRequest, Generator, GeneratorError, TemplateRef};
pub use interaction::{
    ask, categorical_resp, numerical_resp, utterance, AskAnswer, QuestionnaireOutput,
    FAIL_SAFE_TEXT,
};
pub use parser::ResponseValue;
pub use questions::{AskQuestion, NormalizedQuestion, ResponseType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
