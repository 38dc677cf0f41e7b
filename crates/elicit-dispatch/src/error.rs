//! Error types for the dispatcher
//!
//! A failed unit of work is reported to the caller as a [`TaskError`]
//! alongside its key; it is never allowed to escape and abort the batch.

/// Failure of a single dispatched unit of work
///
/// Wraps whatever went wrong during one agent's task (prompt assembly,
/// memory retrieval, generation, aggregation-time conflicts) as an opaque
/// error value.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct TaskError(#[from] anyhow::Error);

impl TaskError {
    /// Create a task error from a plain message
    #[inline]
    #[must_use]
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(anyhow::Error::msg(msg.into()))
    }

    /// Access the underlying error
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}
