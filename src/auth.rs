//! Caller identity resolution
//!
//! Placeholder until a real authentication layer lands: the service
//! trusts a client-supplied numeric id. Precedence: `Authorization:
//! Bearer <id>` header, then `user_id` query parameter, then a `user_id`
//! field in a JSON body. Parts extractors cannot see the body, so
//! handlers with bodies merge that last step via [`Identity::or_body`].

use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::header;
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::ApiError;

/// Identity carried by the request's header or query string, if any.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Option<i64>);

impl Identity {
    /// Resolved caller id, or 401 when nothing identified the caller.
    pub fn require(self) -> Result<i64, ApiError> {
        self.0.ok_or(ApiError::Unauthenticated)
    }

    /// Fold in a `user_id` from a JSON body, at lowest precedence.
    pub fn or_body(self, body_user_id: Option<i64>) -> Result<i64, ApiError> {
        self.0.or(body_user_id).ok_or(ApiError::Unauthenticated)
    }
}

#[derive(Debug, Deserialize)]
struct IdentityQuery {
    user_id: Option<i64>,
}

fn bearer_id(parts: &Parts) -> Option<i64> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    // A non-numeric token is ignored, not rejected; lower sources may
    // still identify the caller.
    value.strip_prefix("Bearer ")?.trim().parse().ok()
}

fn query_id(parts: &Parts) -> Option<i64> {
    Query::<IdentityQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.user_id)
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_id(parts).or_else(|| query_id(parts))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_header_beats_query() {
        let p = parts("/checkout?user_id=9", Some("Bearer 3"));
        assert_eq!(bearer_id(&p).or_else(|| query_id(&p)), Some(3));
    }

    #[test]
    fn test_non_numeric_bearer_falls_through() {
        let p = parts("/checkout?user_id=9", Some("Bearer abc"));
        assert_eq!(bearer_id(&p), None);
        assert_eq!(query_id(&p), Some(9));
    }

    #[test]
    fn test_query_param() {
        let p = parts("/cart?user_id=42&limit=5", None);
        assert_eq!(query_id(&p), Some(42));
    }

    #[test]
    fn test_absent_everywhere() {
        let p = parts("/cart", None);
        assert_eq!(bearer_id(&p).or_else(|| query_id(&p)), None);
        assert!(matches!(
            Identity(None).require(),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_body_fallback() {
        assert_eq!(Identity(None).or_body(Some(7)).unwrap(), 7);
        assert_eq!(Identity(Some(2)).or_body(Some(7)).unwrap(), 2);
        assert!(Identity(None).or_body(None).is_err());
    }
}
