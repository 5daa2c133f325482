//! Shared constants for test infrastructure

/// Path prefix mirroring the production base URL
pub const API_PREFIX: &str = "/api/v1";

pub const TEST_TOKEN: &str = "test-token-123";

pub const INSIGHT_ID: &str = "ins_42";
pub const DATA_ID: &str = "dat_7";

/// Minimal insight body
pub fn insight_body() -> serde_json::Value {
    serde_json::json!({
        "data": { "id": INSIGHT_ID, "title": "Checkout friction", "published": true }
    })
}

/// Minimal list body
pub fn list_body() -> serde_json::Value {
    serde_json::json!({
        "data": [],
        "page": { "has_more": false, "next_cursor": null, "total_count": 0 }
    })
}
