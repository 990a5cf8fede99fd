//! JSON reply bodies.
//!
//! # Design Decisions
//! - Keys are camelCase (`service`, `statusCode`, `headers`, `message`)
//! - The HTTP status always matches `statusCode`
//! - Echoed header names arrive lower-cased from the HTTP stack; a repeated
//!   name keeps its last value

use std::collections::BTreeMap;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of every JSON reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReply {
    pub service: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceReply {
    pub fn ok(service: &str) -> Self {
        Self::with_status(service, StatusCode::OK)
    }

    pub fn failed(service: &str) -> Self {
        Self::with_status(service, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn timed_out(service: &str) -> Self {
        Self::with_status(service, StatusCode::GATEWAY_TIMEOUT)
    }

    fn with_status(service: &str, status: StatusCode) -> Self {
        Self {
            service: service.to_string(),
            status_code: status.as_u16(),
            headers: None,
            message: None,
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render with the given response headers.
    pub fn into_response(self, headers: HeaderMap) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, headers, Json(self)).into_response()
    }
}

/// Flatten request headers into a name → value map.
pub fn echoed_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_serialized_shape() {
        let reply = ServiceReply::failed("cart");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({ "service": "cart", "statusCode": 500 })
        );

        let reply = ServiceReply::ok("cart").with_message("latency set to: 5ms");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({ "service": "cart", "statusCode": 200, "message": "latency set to: 5ms" })
        );
    }

    #[test]
    fn test_status_follows_body() {
        let response = ServiceReply::failed("cart").into_response(HeaderMap::new());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_echoed_headers_last_value_wins() {
        let mut headers = HeaderMap::new();
        headers.append("x-user", HeaderValue::from_static("first"));
        headers.append("x-user", HeaderValue::from_static("second"));
        headers.insert("accept", HeaderValue::from_static("*/*"));
        headers.insert("x-bytes", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let echoed = echoed_headers(&headers);
        assert_eq!(echoed.len(), 3);
        assert_eq!(echoed["x-user"], "second");
        assert_eq!(echoed["accept"], "*/*");
        assert_eq!(echoed["x-bytes"], "caf\u{fffd}");
    }

    #[test]
    fn test_empty_headers() {
        assert!(echoed_headers(&HeaderMap::new()).is_empty());
    }
}
