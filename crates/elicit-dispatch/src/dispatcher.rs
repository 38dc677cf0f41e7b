//! Batch dispatcher with a bounded worker pool
//!
//! One dispatch call fans a batch of keyed, independent futures out over at
//! most `max_workers` concurrent slots, then joins the whole batch before
//! returning. Per-unit failures are captured and reported independently.

use crate::error::TaskError;
use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;

/// Dispatcher configuration
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Maximum number of units in flight at once
    pub max_workers: usize,
}

impl DispatchConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a worker-count ceiling
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_workers: 50 }
    }
}

/// Executes batches of keyed units under a concurrency ceiling
///
/// The dispatcher makes no ordering guarantee across units while they run;
/// the returned vector is re-aligned to submission order so callers see a
/// deterministic view regardless of completion order. There is no per-unit
/// timeout and no way to cancel a submitted batch; latency inside a unit
/// (typically the generation call) is opaque to the dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the given configuration
    #[inline]
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// Worker-count ceiling for this dispatcher
    #[inline]
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.config.max_workers.max(1)
    }

    /// Run every unit in the batch and join
    ///
    /// Each unit is attempted exactly once. A unit that returns `Err` is
    /// logged and reported in its slot of the result; it does not abort or
    /// delay sibling units beyond worker-slot contention.
    ///
    /// # Returns
    /// One `(key, result)` entry per submitted unit, in submission order.
    pub async fn dispatch<K, T, F>(&self, units: Vec<(K, F)>) -> Vec<(K, Result<T, TaskError>)>
    where
        K: Display + Send,
        T: Send,
        F: Future<Output = Result<T, TaskError>> + Send,
    {
        let total = units.len();
        if total == 0 {
            return Vec::new();
        }

        tracing::debug!(total, max_workers = self.max_workers(), "dispatching batch");

        let mut slots: Vec<Option<(K, Result<T, TaskError>)>> =
            (0..total).map(|_| None).collect();

        let mut in_flight = stream::iter(units.into_iter().enumerate().map(
            |(index, (key, unit))| async move {
                let outcome = unit.await;
                (index, key, outcome)
            },
        ))
        .buffer_unordered(self.max_workers());

        while let Some((index, key, outcome)) = in_flight.next().await {
            if let Err(err) = &outcome {
                tracing::warn!(key = %key, error = %err, "task failed; dropping from this batch");
            }
            slots[index] = Some((key, outcome));
        }
        drop(in_flight);

        // Every index was filled exactly once by the loop above.
        slots.into_iter().flatten().collect()
    }

    /// Run a batch and keep only the successful results
    ///
    /// Convenience for fire-and-forget callers that only care about
    /// completed units; failures have already been logged by [`dispatch`].
    ///
    /// [`dispatch`]: Dispatcher::dispatch
    pub async fn dispatch_collect<K, T, F>(&self, units: Vec<(K, F)>) -> Vec<(K, T)>
    where
        K: Display + Send,
        T: Send,
        F: Future<Output = Result<T, TaskError>> + Send,
    {
        self.dispatch(units)
            .await
            .into_iter()
            .filter_map(|(key, outcome)| outcome.ok().map(|value| (key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn dispatch_empty_batch() {
        let dispatcher = Dispatcher::new(DispatchConfig::default());
        let units: Vec<(String, futures::future::Ready<Result<u32, TaskError>>)> = Vec::new();
        let outcomes = dispatcher.dispatch(units).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn dispatch_preserves_submission_order() {
        let dispatcher = Dispatcher::new(DispatchConfig::default().with_max_workers(4));

        // Later units finish first; the output must still be in submission order.
        let units: Vec<_> = (0..8u64)
            .map(|i| {
                (format!("unit-{i}"), async move {
                    tokio::time::sleep(Duration::from_millis(40 - i * 5)).await;
                    Ok::<_, TaskError>(i)
                })
            })
            .collect();

        let outcomes = dispatcher.dispatch(units).await;
        assert_eq!(outcomes.len(), 8);
        for (i, (key, outcome)) in outcomes.iter().enumerate() {
            assert_eq!(key, &format!("unit-{i}"));
            assert_eq!(*outcome.as_ref().unwrap(), i as u64);
        }
    }

    #[tokio::test]
    async fn dispatch_isolates_failures() {
        let dispatcher = Dispatcher::new(DispatchConfig::default().with_max_workers(2));

        type BoxedUnit = std::pin::Pin<Box<dyn Future<Output = Result<u32, TaskError>> + Send>>;
        let units: Vec<(String, BoxedUnit)> = vec![
            ("ok-1".to_string(), Box::pin(async { Ok(1u32) })),
            (
                "bad".to_string(),
                Box::pin(async { Err(TaskError::msg("simulated agent failure")) }),
            ),
            ("ok-2".to_string(), Box::pin(async { Ok(2u32) })),
        ];

        let outcomes = dispatcher.dispatch(units).await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].1.is_ok());
        assert!(outcomes[1].1.is_err());
        assert_eq!(*outcomes[2].1.as_ref().unwrap(), 2);
    }

    #[tokio::test]
    async fn dispatch_respects_worker_ceiling() {
        let dispatcher = Dispatcher::new(DispatchConfig::default().with_max_workers(3));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let units: Vec<_> = (0..20u32)
            .map(|i| {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                (format!("unit-{i}"), async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, TaskError>(i)
                })
            })
            .collect();

        let outcomes = dispatcher.dispatch(units).await;
        assert_eq!(outcomes.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn dispatch_collect_filters_failures() {
        let dispatcher = Dispatcher::default();

        type BoxedUnit = std::pin::Pin<Box<dyn Future<Output = Result<u32, TaskError>> + Send>>;
        let units: Vec<(String, BoxedUnit)> = vec![
            ("a".to_string(), Box::pin(async { Ok(10u32) })),
            (
                "b".to_string(),
                Box::pin(async { Err(TaskError::msg("nope")) }),
            ),
        ];

        let kept = dispatcher.dispatch_collect(units).await;
        assert_eq!(kept, vec![("a".to_string(), 10)]);
    }

    #[test]
    fn zero_worker_config_is_clamped() {
        let dispatcher = Dispatcher::new(DispatchConfig::default().with_max_workers(0));
        assert_eq!(dispatcher.max_workers(), 1);
    }
}
