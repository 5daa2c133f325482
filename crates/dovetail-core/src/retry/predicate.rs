//! Retry predicates
//!
//! A predicate classifies a failure as retryable or terminal. The executor
//! treats failures as opaque and leaves the decision entirely to the predicate.

/// A predicate that determines whether a failure should be retried
///
/// # Example
///
/// ```rust
/// use dovetail_core::retry::RetryPredicate;
/// use std::io::{Error, ErrorKind};
///
/// struct IoRetryPredicate;
///
/// impl RetryPredicate<Error> for IoRetryPredicate {
///     fn should_retry(&self, error: &Error) -> bool {
///         !matches!(
///             error.kind(),
///             ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::InvalidInput
///         )
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given failure should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that always returns true (all failures are retryable)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate that never retries
#[derive(Debug, Clone, Copy)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// A predicate that uses a closure to determine retryability
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// A trait for failures that may carry HTTP status information
pub trait HttpStatusError {
    /// The HTTP status code of the response, if one was received
    fn status_code(&self) -> Option<u16>;

    /// Whether the failure happened at the transport level (connect, timeout,
    /// interrupted body) rather than in the response
    fn is_transport(&self) -> bool {
        false
    }
}

/// A predicate over HTTP failures
///
/// Transport failures are always retried; responses are retried when their
/// status is in the retryable set. Any other failure is terminal.
#[derive(Debug, Clone)]
pub struct HttpStatusPredicate {
    retryable_codes: Vec<u16>,
}

impl HttpStatusPredicate {
    /// Retry transport failures and 500, 502, 503, 504
    pub fn server_errors() -> Self {
        Self::with_codes(vec![500, 502, 503, 504])
    }

    /// Create a predicate with custom retryable status codes
    pub fn with_codes(codes: Vec<u16>) -> Self {
        Self {
            retryable_codes: codes,
        }
    }

    /// Check if a status code is retryable
    pub fn is_retryable_code(&self, code: u16) -> bool {
        self.retryable_codes.contains(&code)
    }
}

impl Default for HttpStatusPredicate {
    fn default() -> Self {
        Self::server_errors()
    }
}

impl<E: HttpStatusError> RetryPredicate<E> for HttpStatusPredicate {
    fn should_retry(&self, error: &E) -> bool {
        if error.is_transport() {
            return true;
        }
        error
            .status_code()
            .is_some_and(|code| self.is_retryable_code(code))
    }
}
