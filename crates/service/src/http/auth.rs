use axum::async_trait;
use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;

use super::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Collection id taken from the `Authorization` header.
///
/// The header carries the id verbatim; a `Bearer ` prefix is accepted
///  and stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CollectionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .trim_start();
        let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();

        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }
        Ok(Self(token.to_string()))
    }
}
