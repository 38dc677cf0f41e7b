//! Error types for environment persistence
//!
//! Waves never fail wholesale because of one bad agent; the only hard
//! failures an environment surfaces are snapshot I/O and decode errors.

/// Environment persistence errors
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// Filesystem failure while reading or writing a snapshot
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file is present but does not decode
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The survey table snapshot is present but does not decode
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err: EnvError = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert!(err.to_string().contains("disk gone"));
    }
}
