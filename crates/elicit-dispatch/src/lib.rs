//! Elicit Dispatch - bounded-concurrency batch execution
//!
//! Runs one keyed unit of work per agent under a worker-count ceiling:
//! - Bounded fan-out (default ceiling 50, caller-configurable)
//! - Per-task failure isolation: one failed unit never aborts its siblings
//! - Synchronous join: `dispatch` returns only after every unit finished
//!
//! # Example
//!
//! ```rust,ignore
//! use elicit_dispatch::{Dispatcher, DispatchConfig, TaskError};
//!
//! # async fn example() {
//! let dispatcher = Dispatcher::new(DispatchConfig::default());
//! let units = vec![
//!     ("a".to_string(), async { Ok::<_, TaskError>(1) }),
//!     ("b".to_string(), async { Ok(2) }),
//! ];
//! let outcomes = dispatcher.dispatch(units).await;
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod dispatcher;
pub mod error;

pub use dispatcher::{DispatchConfig, Dispatcher};
pub use error::TaskError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
