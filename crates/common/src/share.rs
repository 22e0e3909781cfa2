//! Point-in-time shares of a collection subtree.
//!
//! Sharing copies a directory into a brand new top-level collection named
//! by the share token, and records the token in the source collection's
//! share index. The copy is independent: later writes on either side do
//! not propagate.

use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::database::Database;
use crate::error::{Context, Error, Result};
use crate::path::NodePath;
use crate::store::ensure_collection_id;
use crate::store::queries::{self, ChildRef, ContentRow};
use crate::tree::NodeKind;

#[derive(Clone, Debug)]
pub struct ShareManager {
    db: Database,
}

impl ShareManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Snapshot the directory at `path` in `collection` into a new
    ///  collection named `token`, and return the token.
    ///
    /// Creating the target, copying, and recording the share happen in
    ///  one write transaction, so a failure leaves no trace of `token`.
    pub async fn share(&self, collection: &str, path: &NodePath, token: &str) -> Result<String> {
        ensure_collection_id(collection)?;
        ensure_collection_id(token)?;

        let mut tx = self.db.begin_write().await?;

        if queries::collection_exists(&mut tx, token).await? {
            return Err(Error::AlreadyExists(token.to_string()));
        }
        let target_root = queries::insert_collection(&mut tx, token).await?;

        let source_root = queries::require_root(&mut tx, collection).await?;
        let source = resolve_dir(&mut tx, source_root, path).await?;

        let copied = copy_subtree(&mut tx, source, token, target_root).await?;

        // A copy of the whole root carries the root's share block along,
        //  so both root views stay identical.
        if path.is_root() {
            for existing in queries::shares_of(&mut tx, collection).await? {
                queries::insert_share(&mut tx, token, &existing).await?;
            }
        }
        queries::insert_share(&mut tx, collection, token).await?;

        tx.commit().await.context("share")?;

        tracing::info!(collection, %path, token, copied, "shared subtree");
        Ok(token.to_string())
    }

    /// Drop the collection a share created under `token`.
    ///
    /// Ids that no share points at are reported as not found, so private
    ///  collections can never be removed through a token.
    pub async fn unshare(&self, token: &str) -> Result<()> {
        ensure_collection_id(token)?;

        let mut tx = self.db.begin_write().await?;
        if !queries::is_share_target(&mut tx, token).await? {
            return Err(Error::CollectionNotFound(token.to_string()));
        }
        queries::delete_collection(&mut tx, token).await?;
        tx.commit().await.context("unshare")?;

        tracing::info!(token, "share removed");
        Ok(())
    }

    /// Share tokens recorded for `collection`, in key order.
    pub async fn shares(&self, collection: &str) -> Result<Vec<String>> {
        ensure_collection_id(collection)?;
        let mut tx = self.db.begin_read().await?;
        queries::require_root(&mut tx, collection).await?;
        queries::shares_of(&mut tx, collection).await
    }
}

/// Resolve `path` below `root` to a directory node.
async fn resolve_dir(conn: &mut SqliteConnection, root: i64, path: &NodePath) -> Result<i64> {
    let Some((parents, name)) = path.split_last() else {
        return Ok(root);
    };
    let parent = queries::walk_dirs(conn, root, parents, path).await?;
    match queries::child(conn, parent, name).await? {
        Some(ChildRef {
            id,
            kind: NodeKind::Directory,
        }) => Ok(id),
        Some(_) => Err(Error::PathNotFound(format!("{} is not a directory", path))),
        None => Err(Error::PathNotFound(path.to_string())),
    }
}

/// Recreate every descendant of `source` under `target` in `collection`.
/// Returns the number of copied nodes.
async fn copy_subtree(
    conn: &mut SqliteConnection,
    source: i64,
    collection: &str,
    target: i64,
) -> Result<usize> {
    let rows = queries::subtree_with_content(conn, source).await?;

    let mut children: HashMap<i64, Vec<ContentRow>> = HashMap::new();
    for row in rows {
        if let Some(parent_id) = row.parent_id {
            children.entry(parent_id).or_default().push(row);
        }
    }

    let mut copied = 0;
    let mut pending = vec![(source, target)];
    while let Some((from, to)) = pending.pop() {
        for row in children.remove(&from).unwrap_or_default() {
            match row.kind {
                NodeKind::Directory => {
                    let id = queries::insert_dir(conn, collection, to, &row.name).await?;
                    pending.push((row.id, id));
                }
                NodeKind::File => {
                    let content = row.content.unwrap_or_default();
                    queries::insert_file(conn, collection, to, &row.name, &content).await?;
                }
            }
            copied += 1;
        }
    }

    Ok(copied)
}
