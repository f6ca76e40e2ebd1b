//! Canned response for API traffic while offline.

use offline_core::ResponseSnapshot;

pub const OFFLINE_API_STATUS: u16 = 503;

/// Exact body clients match on. Not produced by a serializer so the bytes never drift.
pub const OFFLINE_API_BODY: &str = "{\"error\": \"Offline – no network connection\"}";

pub fn offline_api_response() -> ResponseSnapshot {
    ResponseSnapshot::new(
        OFFLINE_API_STATUS,
        vec![("Content-Type".to_string(), "application/json".to_string())],
        OFFLINE_API_BODY,
    )
}
