//! Request identification and client extraction.
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An incoming `x-request-id` is kept; otherwise a UUID v4 is generated
//! - Client identity is the peer IP; the port is ignored

use std::net::SocketAddr;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID as set by the request-id layer, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Raw `Authorization` header value, if present and valid ASCII.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Admission key for a peer.
pub fn client_identity(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_request_ids_are_unique() {
        let req = Request::new(());
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&req).unwrap();
        let b = maker.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
        assert!(Uuid::parse_str(a.header_value().to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_header_helpers() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        assert_eq!(authorization(&headers), None);

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-1"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer x"));
        assert_eq!(request_id(&headers), "req-1");
        assert_eq!(authorization(&headers), Some("Bearer x"));
    }

    #[test]
    fn test_client_identity_drops_port() {
        let a: SocketAddr = "192.168.1.10:5000".parse().unwrap();
        let b: SocketAddr = "192.168.1.10:6000".parse().unwrap();
        assert_eq!(client_identity(&a), "192.168.1.10");
        assert_eq!(client_identity(&a), client_identity(&b));
    }
}
