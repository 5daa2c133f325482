//! # dovetail-core
//!
//! Core library for the Dovetail MCP server providing:
//! - Retry execution engine with predicate, observer, and backoff configuration
//! - Serializable retry policy types
//! - Configuration file loading (dovetail-mcp.yaml)

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::{ApiSettings, DovetailConfig};
pub use error::{Error, Result};
pub use types::{BackoffKind, RetryPolicy};
