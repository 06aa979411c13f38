//! API Middleware
//!
//! Operation context extraction and request logging.

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;

/// Header carrying the signed-in user's id, set by the frontend
pub const REQUEST_USER_HEADER: &str = "X-Request-User-Id";

/// Header carrying a caller-supplied correlation id
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

// =========================================================================
// Operation Context Middleware
// =========================================================================

/// Build the operation context from request headers
pub fn context_from_headers(headers: &HeaderMap) -> OperationContext {
    let mut context = OperationContext::new();

    if let Some(user_id) = headers
        .get(REQUEST_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
    {
        context = context.with_request_user(user_id);
    }

    // Use the caller's correlation ID or generate a new one
    let correlation_id = headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    context.with_correlation_id(correlation_id)
}

/// Attach an [`OperationContext`] to every request
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let context = context_from_headers(request.headers());
    request.extensions_mut().insert(context);

    next.run(request).await
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let headers = mask_headers_for_logging(request.headers());

    let correlation_id = request
        .extensions()
        .get::<OperationContext>()
        .and_then(|ctx| ctx.correlation_id);

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer firebase-token".parse().unwrap());
        headers.insert("x-request-user-id", "uid-123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let auth = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let user_id = masked.iter().find(|(k, _)| k == "x-request-user-id");

        assert_eq!(auth.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(user_id.unwrap().1, "uid-123");
    }

    #[test]
    fn test_context_from_headers() {
        let correlation_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-request-user-id", "uid-123".parse().unwrap());
        headers.insert(
            "x-correlation-id",
            correlation_id.to_string().parse().unwrap(),
        );

        let context = context_from_headers(&headers);

        assert_eq!(context.request_user_id.as_deref(), Some("uid-123"));
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_context_generates_correlation_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-correlation-id", "not-a-uuid".parse().unwrap());

        let context = context_from_headers(&headers);

        assert!(context.request_user_id.is_none());
        assert!(context.correlation_id.is_some());
    }
}
