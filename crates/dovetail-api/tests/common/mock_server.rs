//! Mock server helpers for Dovetail API testing
//!
//! Paths given to these helpers are relative to [`API_PREFIX`].

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

fn api_path(endpoint: &str) -> String {
    format!("{}{}", API_PREFIX, endpoint)
}

/// Set up a GET endpoint returning `body` as JSON
pub async fn mock_json(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(api_path(endpoint)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Set up a GET endpoint that answers `status` N times before succeeding
pub async fn mock_flaky_json(
    server: &MockServer,
    endpoint: &str,
    status: u16,
    fail_count: u64,
    body: Value,
) {
    // First N requests fail
    Mock::given(method("GET"))
        .and(path(api_path(endpoint)))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    // Subsequent requests succeed
    mock_json(server, endpoint, body).await;
}

/// Set up a GET endpoint that always answers `status`
pub async fn mock_status(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(api_path(endpoint)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Set up a GET endpoint returning a 200 with a body that is not JSON
pub async fn mock_invalid_json(server: &MockServer, endpoint: &str) {
    Mock::given(method("GET"))
        .and(path(api_path(endpoint)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(server)
        .await;
}
