//! Elicit Agent - simulated personas and populations
//!
//! Defines the data model for elicitation targets:
//! - Persona attributes ([`Scratch`])
//! - The external memory subsystem boundary ([`MemoryIndex`])
//! - Individual agents with `.agent` file persistence ([`Agent`])
//! - Ordered agent collections with id lookup ([`Population`])
//!
//! Agents are independent of one another; no agent holds a reference to
//! another agent. The memory subsystem (embedding storage, relevance
//! scoring, reflection synthesis) lives behind the [`MemoryIndex`] trait
//! and is consumed, not implemented, here.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod agent;
pub mod error;
pub mod memory;
pub mod population;
pub mod scratch;

pub use agent::{short_uuid, Agent, AgentRecord};
pub use error::AgentError;
pub use memory::{MemoryIndex, MemoryNode};
pub use population::{Population, PopulationSet};
pub use scratch::Scratch;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
