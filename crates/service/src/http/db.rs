//! Reads and writes against the caller's own collection.

use axum::extract::{Path, State};
use bytes::Bytes;

use common::prelude::NodePath;

use super::auth::CollectionToken;
use super::error::ApiError;
use crate::ServiceState;

/// Node path from an optional `*path` capture. No capture is the root.
pub(crate) fn node_path(path: Option<Path<String>>) -> NodePath {
    path.map(|Path(raw)| NodePath::parse(&raw))
        .unwrap_or_default()
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    CollectionToken(collection): CollectionToken,
    path: Option<Path<String>>,
) -> Result<Vec<u8>, ApiError> {
    let path = node_path(path);
    tracing::debug!(%path, "GET node");

    state
        .store()
        .get(&collection, &path)
        .await
        .map_err(ApiError::store("cannot view node"))
}

/// Store the request body as a file and answer with the updated root view.
pub async fn put_handler(
    State(state): State<ServiceState>,
    CollectionToken(collection): CollectionToken,
    path: Option<Path<String>>,
    body: Bytes,
) -> Result<Vec<u8>, ApiError> {
    let path = node_path(path);
    tracing::debug!(%path, size = body.len(), "PUT node");

    state
        .store()
        .put(&collection, &path, &body)
        .await
        .map_err(ApiError::store("cannot create node"))?;

    state
        .store()
        .get(&collection, &NodePath::root())
        .await
        .map_err(ApiError::store(
            "data written successfully, but cannot view result",
        ))
}

/// Remove a node and answer with the updated root view.
pub async fn delete_handler(
    State(state): State<ServiceState>,
    CollectionToken(collection): CollectionToken,
    path: Option<Path<String>>,
) -> Result<Vec<u8>, ApiError> {
    let path = node_path(path);
    tracing::debug!(%path, "DELETE node");

    state
        .store()
        .delete(&collection, &path)
        .await
        .map_err(ApiError::store("cannot delete node"))?;

    state
        .store()
        .get(&collection, &NodePath::root())
        .await
        .map_err(ApiError::store(
            "data deleted successfully, but cannot view result",
        ))
}
