//! Retry execution engine
//!
//! This module provides the retry loop and the immutable configuration it
//! runs under.

use std::fmt;
use std::future::Future;

use crate::types::RetryPolicy;

use super::delay::{calculate_delay, Delay};
use super::observer::{FnObserver, RetryObserver};
use super::predicate::{AlwaysRetry, ClosurePredicate, RetryPredicate};

/// Configuration for one retried call site
///
/// Built once per call with the `with_*` methods and then only read by the
/// executor.
///
/// # Example
///
/// ```rust
/// use dovetail_core::retry::{Delay, RetryConfig};
///
/// let config = RetryConfig::<std::io::Error>::new()
///     .with_max_retries(5)
///     .with_delay(Delay::constant(250))
///     .with_predicate_fn(|err| err.kind() == std::io::ErrorKind::TimedOut)
///     .on_retry(|attempt, max_retries| eprintln!("retrying ({attempt}/{max_retries})"));
/// ```
pub struct RetryConfig<E> {
    max_retries: u32,
    predicate: Box<dyn RetryPredicate<E>>,
    observer: Option<Box<dyn RetryObserver>>,
    delay: Delay<E>,
}

impl<E> Default for RetryConfig<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryConfig<E> {
    /// Three retries, every failure retryable, exponential backoff from 1s
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            predicate: Box::new(AlwaysRetry),
            observer: None,
            delay: Delay::default(),
        }
    }

    /// Set the maximum number of additional attempts after the first
    ///
    /// Zero means the operation runs exactly once.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the retry predicate
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: RetryPredicate<E> + 'static,
    {
        self.predicate = Box::new(predicate);
        self
    }

    /// Set the retry predicate from a closure
    pub fn with_predicate_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.with_predicate(ClosurePredicate::new(predicate))
    }

    /// Set the observer notified before each retry
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RetryObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Set a closure notified before each retry with `(attempt, max_retries)`
    pub fn on_retry<F>(self, f: F) -> Self
    where
        F: Fn(u32, u32) + Send + Sync + 'static,
    {
        self.with_observer(FnObserver::new(f))
    }

    /// Set the delay policy
    pub fn with_delay(mut self, delay: Delay<E>) -> Self {
        self.delay = delay;
        self
    }

    /// Maximum number of additional attempts
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The configured delay policy
    pub fn delay(&self) -> &Delay<E> {
        &self.delay
    }

    /// Run `operation` under this configuration
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        execute(operation, self).await
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("delay", &self.delay)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Execute an async operation, retrying qualifying failures
///
/// The operation is invoked at most `max_retries + 1` times. The first
/// success is returned as is. A failure is returned unchanged, without
/// wrapping, when the predicate rejects it or no retries remain; earlier
/// failures are dropped.
///
/// The operation must be safe to invoke more than once.
///
/// # Example
///
/// ```rust,no_run
/// use dovetail_core::retry::{execute, RetryConfig};
///
/// async fn example() -> Result<String, std::io::Error> {
///     let config = RetryConfig::new();
///
///     execute(|| async {
///         // Your fallible operation here
///         Ok("success".to_string())
///     }, &config).await
/// }
/// ```
pub async fn execute<F, Fut, T, E>(mut operation: F, config: &RetryConfig<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            if let Some(observer) = &config.observer {
                observer.on_retry(attempt + 1, config.max_retries);
            }
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= config.max_retries || !config.predicate.should_retry(&err) {
                    return Err(err);
                }

                let delay = calculate_delay(&config.delay, attempt, &err);
                drop(err);

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                attempt += 1;
            }
        }
    }
}

/// Execute an operation under a file-level retry policy
///
/// Every failure is retryable and no observer is attached. For more control,
/// build a [`RetryConfig`] with [`RetryPolicy::to_config`].
pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    execute(operation, &policy.to_config()).await
}
