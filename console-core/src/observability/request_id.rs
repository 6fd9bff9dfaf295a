//! Request correlation for outgoing HTTP calls.
//!
//! Every logical request gets one `x-request-id`. A request that is replayed
//! (for example after an access-token refresh) keeps its id so both attempts
//! can be correlated in backend logs.

use http::{HeaderMap, HeaderValue};
use uuid::Uuid;

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate a fresh request id.
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Insert `request_id` unless the headers already carry one.
pub fn inject_request_id(headers: &mut HeaderMap, request_id: &str) {
    if headers.contains_key(REQUEST_ID_HEADER) {
        return;
    }

    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Extract request ID from headers.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_and_extract() {
        let mut headers = HeaderMap::new();
        inject_request_id(&mut headers, "abc-123");
        assert_eq!(extract_request_id(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_inject_keeps_existing_id() {
        let mut headers = HeaderMap::new();
        inject_request_id(&mut headers, "first");
        inject_request_id(&mut headers, "second");
        assert_eq!(extract_request_id(&headers), Some("first".to_string()));
    }

    #[test]
    fn test_new_request_id_is_uuid() {
        let id = new_request_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, new_request_id());
    }
}
