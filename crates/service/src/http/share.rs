//! Creating, reading and removing shares.

use axum::extract::{Path, State};
use http::StatusCode;
use serde::Deserialize;

use common::prelude::{token, NodePath};

use super::auth::CollectionToken;
use super::db::node_path;
use super::error::ApiError;
use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct SharedParams {
    pub token: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Snapshot a directory of the caller's collection under a fresh token.
/// Answers with the token.
pub async fn share_handler(
    State(state): State<ServiceState>,
    CollectionToken(collection): CollectionToken,
    path: Option<Path<String>>,
) -> Result<String, ApiError> {
    let path = node_path(path);
    let share_token = token::generate(token::SHARE_TOKEN_BYTES);

    state
        .shares()
        .share(&collection, &path, &share_token)
        .await
        .map_err(ApiError::store("cannot share node"))
}

/// Read a shared collection. The token in the URL is the only credential.
pub async fn shared_handler(
    State(state): State<ServiceState>,
    Path(params): Path<SharedParams>,
) -> Result<Vec<u8>, ApiError> {
    let path = params
        .path
        .as_deref()
        .map(NodePath::parse)
        .unwrap_or_default();
    tracing::debug!(token = %params.token, %path, "GET shared node");

    state
        .store()
        .get(&params.token, &path)
        .await
        .map_err(ApiError::store("cannot view node"))
}

/// Remove a shared collection, and its record in the source's share block.
/// Only collections created by a share can be removed this way.
pub async fn delete_shared_handler(
    State(state): State<ServiceState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .shares()
        .unshare(&token)
        .await
        .map_err(ApiError::store("cannot delete node"))?;

    Ok(StatusCode::NO_CONTENT)
}
