//! Retry delay policies
//!
//! A delay is either a backoff policy (constant or exponential over a base
//! delay) or a caller-supplied function of the attempt index and the failure.
//! The two forms are variants of one enum, so a configuration carries exactly
//! one of them.

use std::fmt;
use std::time::Duration;

use crate::types::BackoffKind;

/// Input handed to a computed delay function
#[derive(Debug)]
pub struct DelayContext<'a, E> {
    /// Zero-based index of the attempt that just failed
    pub attempt: u32,
    /// The failure produced by that attempt
    pub error: &'a E,
}

type DelayFn<E> = Box<dyn Fn(DelayContext<'_, E>) -> u64 + Send + Sync>;

/// How long to wait between a failed attempt and the next one
pub enum Delay<E> {
    /// Backoff over a base delay in milliseconds
    Backoff {
        /// Constant or exponential
        kind: BackoffKind,
        /// Base delay in milliseconds
        base_ms: u64,
    },

    /// Delay in milliseconds computed by the caller, used verbatim
    Computed(DelayFn<E>),
}

impl<E> Delay<E> {
    /// Backoff delay of the given kind
    pub fn backoff(kind: BackoffKind, base_ms: u64) -> Self {
        Delay::Backoff { kind, base_ms }
    }

    /// Constant delay of `base_ms` before every retry
    pub fn constant(base_ms: u64) -> Self {
        Self::backoff(BackoffKind::Constant, base_ms)
    }

    /// Exponential delay: `base_ms * 2^attempt`
    pub fn exponential(base_ms: u64) -> Self {
        Self::backoff(BackoffKind::Exponential, base_ms)
    }

    /// Delay computed from the attempt index and the failure
    ///
    /// # Example
    ///
    /// ```rust
    /// use dovetail_core::retry::Delay;
    ///
    /// let delay: Delay<std::io::Error> = Delay::computed(|ctx| 100 * (ctx.attempt as u64 + 1));
    /// ```
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(DelayContext<'_, E>) -> u64 + Send + Sync + 'static,
    {
        Delay::Computed(Box::new(f))
    }
}

impl<E> Default for Delay<E> {
    fn default() -> Self {
        Self::exponential(1000)
    }
}

impl<E> fmt::Debug for Delay<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Backoff { kind, base_ms } => f
                .debug_struct("Backoff")
                .field("kind", kind)
                .field("base_ms", base_ms)
                .finish(),
            Delay::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Calculate the delay before the next attempt
///
/// # Arguments
///
/// * `delay` - The configured delay policy
/// * `attempt` - Zero-based index of the attempt that just failed
/// * `error` - The failure from that attempt
///
/// # Example
///
/// ```rust
/// use dovetail_core::retry::{calculate_delay, Delay};
///
/// let delay: Delay<std::io::Error> = Delay::exponential(1000);
/// let err = std::io::Error::other("boom");
///
/// assert_eq!(calculate_delay(&delay, 0, &err).as_millis(), 1000);
/// assert_eq!(calculate_delay(&delay, 1, &err).as_millis(), 2000);
/// ```
pub fn calculate_delay<E>(delay: &Delay<E>, attempt: u32, error: &E) -> Duration {
    let delay_ms = match delay {
        Delay::Computed(f) => f(DelayContext { attempt, error }),

        Delay::Backoff {
            kind: BackoffKind::Constant,
            base_ms,
        } => *base_ms,

        Delay::Backoff {
            kind: BackoffKind::Exponential,
            base_ms,
        } => base_ms.saturating_mul(2u64.saturating_pow(attempt)),
    };

    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn err() -> io::Error {
        io::Error::other("boom")
    }

    #[test]
    fn test_constant_delay() {
        let delay = Delay::constant(500);
        for attempt in 0..5 {
            assert_eq!(
                calculate_delay(&delay, attempt, &err()),
                Duration::from_millis(500)
            );
        }
    }

    #[test]
    fn test_exponential_delay() {
        let delay = Delay::exponential(1000);

        // attempt 0: 1000 * 2^0 = 1000
        assert_eq!(
            calculate_delay(&delay, 0, &err()),
            Duration::from_millis(1000)
        );
        // attempt 1: 1000 * 2^1 = 2000
        assert_eq!(
            calculate_delay(&delay, 1, &err()),
            Duration::from_millis(2000)
        );
        // attempt 2: 1000 * 2^2 = 4000
        assert_eq!(
            calculate_delay(&delay, 2, &err()),
            Duration::from_millis(4000)
        );
    }

    #[test]
    fn test_exponential_delay_saturates() {
        let delay = Delay::exponential(1000);
        assert_eq!(
            calculate_delay(&delay, 80, &err()),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn test_default_is_exponential_one_second() {
        let delay: Delay<io::Error> = Delay::default();
        assert!(matches!(
            delay,
            Delay::Backoff {
                kind: BackoffKind::Exponential,
                base_ms: 1000
            }
        ));
    }

    #[test]
    fn test_computed_delay_receives_context() {
        let delay = Delay::computed(|ctx: DelayContext<'_, io::Error>| {
            assert_eq!(ctx.error.to_string(), "boom");
            ctx.attempt as u64 * 7
        });

        assert_eq!(calculate_delay(&delay, 0, &err()), Duration::ZERO);
        assert_eq!(calculate_delay(&delay, 3, &err()), Duration::from_millis(21));
    }

    #[test]
    fn test_computed_delay_not_clamped() {
        let delay: Delay<io::Error> = Delay::computed(|_| 123_456);
        assert_eq!(
            calculate_delay(&delay, 0, &err()),
            Duration::from_millis(123_456)
        );
    }

    #[test]
    fn test_debug_hides_function() {
        let delay: Delay<io::Error> = Delay::computed(|_| 1);
        assert_eq!(format!("{:?}", delay), "Computed(<fn>)");
    }
}
