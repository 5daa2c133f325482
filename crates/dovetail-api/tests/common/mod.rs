//! Common test infrastructure for dovetail-api tests
//!
//! # Modules
//!
//! - `constants`: Tokens, ids, and response bodies
//! - `mock_server`: Wiremock setup helpers for API endpoints

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod mock_server;

pub use constants::*;
pub use mock_server::*;

use dovetail_api::DovetailClient;
use dovetail_core::{BackoffKind, DovetailConfig, RetryPolicy};
use wiremock::MockServer;

/// Configuration pointing at `server` with fast constant retries
pub fn test_config(server: &MockServer, max_retries: u32) -> DovetailConfig {
    let mut config = DovetailConfig::default()
        .with_token(Some(TEST_TOKEN.to_string()))
        .with_base_url(Some(format!("{}{}", server.uri(), API_PREFIX)));
    config.retry = RetryPolicy {
        max_retries,
        delay: BackoffKind::Constant,
        base_delay_ms: 1,
    };
    config.api.timeout_secs = 5;
    config
}

/// Client pointing at `server` with fast constant retries
pub fn test_client(server: &MockServer, max_retries: u32) -> DovetailClient {
    DovetailClient::new(&test_config(server, max_retries)).expect("test client builds")
}

/// Number of requests the server has received
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}
