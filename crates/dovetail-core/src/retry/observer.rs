//! Retry observation and logging
//!
//! This module provides the `RetryObserver` trait, notified before every retry
//! attempt, and a `TracingObserver` implementation that logs using the
//! `tracing` crate. Observers are advisory and cannot influence control flow.

use std::sync::Mutex;

/// Observer notified before each retry attempt
///
/// Never called before the first attempt.
///
/// # Example
///
/// ```rust
/// use dovetail_core::retry::RetryObserver;
///
/// struct MetricsObserver;
///
/// impl RetryObserver for MetricsObserver {
///     fn on_retry(&self, attempt: u32, max_retries: u32) {
///         // Record a retry metric
///         let _ = (attempt, max_retries);
///     }
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called before a retry attempt
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt about to run, counted from 1 (the first retry
    ///   is attempt 2)
    /// * `max_retries` - The configured retry count (not the total attempt
    ///   count)
    fn on_retry(&self, attempt: u32, max_retries: u32);
}

/// A no-op observer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_retry(&self, _attempt: u32, _max_retries: u32) {}
}

/// An observer that logs retries at WARN using the `tracing` crate
///
/// # Example
///
/// ```rust
/// use dovetail_core::retry::TracingObserver;
///
/// let observer = TracingObserver::new("/insights");
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried (for log context)
    operation: String,
}

impl TracingObserver {
    /// Create a new tracing observer labelled with `operation`
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Get the operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_retry(&self, attempt: u32, max_retries: u32) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            max_retries = max_retries,
            "request failed, retrying ({}/{})",
            attempt,
            max_retries
        );
    }
}

/// An observer backed by a closure
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(u32, u32) + Send + Sync,
{
    /// Wrap `f(attempt, max_retries)` as an observer
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RetryObserver for FnObserver<F>
where
    F: Fn(u32, u32) + Send + Sync,
{
    fn on_retry(&self, attempt: u32, max_retries: u32) {
        (self.f)(attempt, max_retries)
    }
}

/// An observer that records every notification
///
/// Useful for testing.
#[derive(Debug, Default)]
pub struct StatsObserver {
    calls: Mutex<Vec<(u32, u32)>>,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retries observed
    pub fn retries(&self) -> usize {
        self.calls().len()
    }

    /// Every `(attempt, max_retries)` pair observed, in order
    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RetryObserver for StatsObserver {
    fn on_retry(&self, attempt: u32, max_retries: u32) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((attempt, max_retries));
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_retry(&self, attempt: u32, max_retries: u32) {
        (**self).on_retry(attempt, max_retries)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_retry(&self, attempt: u32, max_retries: u32) {
        (**self).on_retry(attempt, max_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_noop_observer() {
        NoOpObserver.on_retry(2, 3);
    }

    #[test]
    fn test_stats_observer_records_in_order() {
        let observer = StatsObserver::new();

        observer.on_retry(2, 3);
        observer.on_retry(3, 3);

        assert_eq!(observer.retries(), 2);
        assert_eq!(observer.calls(), vec![(2, 3), (3, 3)]);
    }

    #[test]
    fn test_fn_observer() {
        let total = Arc::new(AtomicU32::new(0));
        let sink = total.clone();
        let observer = FnObserver::new(move |attempt, _| {
            sink.fetch_add(attempt, Ordering::SeqCst);
        });

        observer.on_retry(2, 3);
        observer.on_retry(3, 3);

        assert_eq!(total.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_tracing_observer_creation() {
        let observer = TracingObserver::new("/insights");
        assert_eq!(observer.operation(), "/insights");

        let default_observer = TracingObserver::default();
        assert_eq!(default_observer.operation(), "retry");
    }

    #[test]
    fn test_arc_observer() {
        let observer = Arc::new(StatsObserver::new());
        let shared: Box<dyn RetryObserver> = Box::new(observer.clone());

        shared.on_retry(2, 1);

        assert_eq!(observer.calls(), vec![(2, 1)]);
    }
}
