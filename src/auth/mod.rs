//! Admin key authentication for the publishing routes.
//!
//! The key may arrive in `x-api-key` or as an `Authorization: Bearer` token and
//! is compared in constant time. It is the only gate on writes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::AppState;

/// Header name for the admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware guarding `/api/admin`.
///
/// With no key configured every request passes (dev mode).
pub async fn admin_key_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.admin_key.as_deref() else {
        return next.run(request).await;
    };

    let rejection = match presented_key(request.headers()) {
        Some(key) if constant_time_compare(key, expected) => None,
        Some(_) => Some("Invalid admin key"),
        None => Some("Missing admin key"),
    };
    let Some(rejection) = rejection else {
        return next.run(request).await;
    };

    tracing::warn!(path = %request.uri().path(), "Rejected admin request: {}", rejection);
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    AppError::Unauthorized(rejection.to_string())
        .at_revision(revision_id)
        .into_response()
}

/// The key from `x-api-key`, falling back to a bearer token.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("admin-key-123", "admin-key-123"));
        assert!(!constant_time_compare("admin-key-123", "admin-key-124"));
    }

    #[test]
    fn test_four_digit_pin_is_not_a_prefix_match() {
        assert!(!constant_time_compare("1234", "12345678"));
        assert!(!constant_time_compare("", "1234"));
    }

    #[test]
    fn test_presented_key_prefers_api_key_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(presented_key(&headers), Some("from-bearer"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(presented_key(&headers), Some("from-header"));
    }

    #[test]
    fn test_non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(presented_key(&headers), None);
    }
}
