//! Retry execution engine
//!
//! This module wraps an arbitrary async operation with retry, backoff, and
//! failure classification. It backs every outbound Dovetail API call.
//!
//! # Features
//!
//! - Constant or exponential backoff, or a delay computed per attempt
//! - Failure classification via the `RetryPredicate` trait
//! - Observable retries via the `RetryObserver` trait
//! - Built-in `TracingObserver` for logging
//! - Failures are returned unchanged; the executor adds no wrapping
//!
//! # Example
//!
//! ```rust,no_run
//! use dovetail_core::retry::{execute, Delay, RetryConfig, TracingObserver};
//!
//! async fn example() -> Result<String, std::io::Error> {
//!     let config = RetryConfig::new()
//!         .with_max_retries(3)
//!         .with_delay(Delay::exponential(1000))
//!         .with_observer(TracingObserver::new("download"));
//!
//!     execute(|| async {
//!         // Your fallible operation here
//!         Ok("success".to_string())
//!     }, &config).await
//! }
//! ```

mod delay;
mod executor;
mod observer;
mod predicate;

pub use delay::{calculate_delay, Delay, DelayContext};
pub use executor::{execute, retry_with_policy, RetryConfig};
pub use observer::{FnObserver, NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use predicate::{
    AlwaysRetry, ClosurePredicate, HttpStatusError, HttpStatusPredicate, NeverRetry,
    RetryPredicate,
};
