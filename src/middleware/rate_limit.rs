// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admission limiting for public write endpoints.

use crate::error::AppError;
use crate::services::Admission;
use crate::time_utils::{format_unix_millis, now_unix_millis};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Bucket shared by every client that sends no identifying header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client address headers, most trusted first.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Identify the caller from proxy headers.
///
/// For `x-forwarded-for` only the first (client-most) address is used.
pub fn client_key(headers: &HeaderMap) -> String {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, admission: &Admission) {
    headers.insert("X-RateLimit-Limit", HeaderValue::from(admission.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(admission.remaining));
    if let Ok(reset) = HeaderValue::from_str(&format_unix_millis(admission.reset_at_ms)) {
        headers.insert("X-RateLimit-Reset", reset);
    }
}

/// Middleware applying the configured public-write policy.
///
/// All guarded routes draw from one budget per client.
pub async fn limit_public_writes(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers());
    let now_ms = now_unix_millis();
    let admission = state.limiter.admit_at(
        &key,
        state.config.rate_limit_max_requests,
        state.config.rate_limit_window_ms,
        now_ms,
    );

    let mut response = if admission.allowed {
        next.run(request).await
    } else {
        tracing::warn!(
            client = %key,
            reset_at = %format_unix_millis(admission.reset_at_ms),
            "Rate limit exceeded"
        );
        AppError::RateLimited {
            retry_after_secs: admission.retry_after_secs(now_ms),
        }
        .into_response()
    };

    insert_rate_limit_headers(response.headers_mut(), &admission);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_client_key_preference_order() {
        assert_eq!(
            client_key(&headers(&[
                ("x-real-ip", "3.3.3.3"),
                ("x-forwarded-for", "2.2.2.2"),
                ("cf-connecting-ip", "1.1.1.1"),
            ])),
            "1.1.1.1"
        );
        assert_eq!(
            client_key(&headers(&[("x-real-ip", "3.3.3.3"), ("x-forwarded-for", "2.2.2.2")])),
            "2.2.2.2"
        );
        assert_eq!(client_key(&headers(&[("x-real-ip", "3.3.3.3")])), "3.3.3.3");
        assert_eq!(client_key(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_client_key_forwarded_for_list() {
        assert_eq!(
            client_key(&headers(&[("x-forwarded-for", "9.9.9.9, 10.0.0.1, 10.0.0.2")])),
            "9.9.9.9"
        );
        // An empty header doesn't shadow the next candidate.
        assert_eq!(
            client_key(&headers(&[("cf-connecting-ip", ""), ("x-real-ip", "3.3.3.3")])),
            "3.3.3.3"
        );
    }

    #[test]
    fn test_rate_limit_headers() {
        let admission = Admission {
            allowed: true,
            limit: 5,
            remaining: 2,
            reset_at_ms: 1_700_000_000_000,
        };
        let mut map = HeaderMap::new();
        insert_rate_limit_headers(&mut map, &admission);

        assert_eq!(map.get("X-RateLimit-Limit").unwrap(), "5");
        assert_eq!(map.get("X-RateLimit-Remaining").unwrap(), "2");
        assert_eq!(
            map.get("X-RateLimit-Reset").unwrap(),
            "2023-11-14T22:13:20.000Z"
        );
    }
}
