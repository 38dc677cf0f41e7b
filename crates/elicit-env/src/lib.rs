//! Elicit Env - durable elicitation environments
//!
//! An environment owns an agent registry (administration handles mapped to
//! agents living in named populations) and a response store, and runs
//! elicitation waves over them:
//! - [`Survey`]: categorical questionnaires merged into a typed table by
//!   cell-level upsert, with panel-style inclusion criteria
//! - [`Interview`]: scripted dialogues appended to per-agent transcripts
//!
//! Waves fan out through the bounded dispatcher; aggregation always runs
//! on the calling thread after the full batch joins. Concurrent waves
//! against the same environment instance are not supported and must be
//! serialized by the caller.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod environment;
pub mod error;
pub mod interview;
pub mod registry;
pub mod store;
pub mod survey;

pub use environment::{EnvPackage, Environment, Interview, Survey};
pub use error::EnvError;
pub use interview::{InterviewStore, INTERVIEWER};
pub use registry::{new_agent_pid, AgentRef};
pub use store::ResponseStore;
pub use survey::{SurveyRecord, SurveyStore, PID_COLUMN};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
