//! Hierarchical namespaces on top of the engine.
//!
//! Every collection is a tree of directories and files addressed by
//! [`NodePath`]s. Each public operation runs inside exactly one engine
//! transaction; nothing is held open between calls.

pub(crate) mod queries;

use crate::database::Database;
use crate::error::{Context, Error, Result};
use crate::path::NodePath;
use crate::tree::NodeKind;
use crate::view::{self, Snapshot};

use queries::ChildRef;

#[derive(Clone, Debug)]
pub struct NamespaceStore {
    db: Database,
}

impl NamespaceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Create an empty collection named `collection`.
    pub async fn create(&self, collection: &str) -> Result<()> {
        ensure_collection_id(collection)?;

        let mut tx = self.db.begin_write().await?;
        if queries::collection_exists(&mut tx, collection).await? {
            return Err(Error::AlreadyExists(collection.to_string()));
        }
        queries::insert_collection(&mut tx, collection).await?;
        tx.commit().await.context("create")?;

        tracing::debug!(collection, "created collection");
        Ok(())
    }

    pub async fn exists(&self, collection: &str) -> Result<bool> {
        let mut tx = self.db.begin_read().await?;
        queries::collection_exists(&mut tx, collection).await
    }

    /// Read the node at `path`.
    ///
    /// - the root path yields the collection's root view, share block included
    /// - a directory yields its view, children starting at depth zero
    /// - a file yields its raw content
    pub async fn get(&self, collection: &str, path: &NodePath) -> Result<Vec<u8>> {
        ensure_collection_id(collection)?;

        let mut tx = self.db.begin_read().await?;
        let root = queries::require_root(&mut tx, collection).await?;

        let Some((parents, name)) = path.split_last() else {
            let snapshot = load_snapshot(&mut tx, collection, root).await?;
            return Ok(view::render_root(&snapshot, collection).into_bytes());
        };

        let parent = queries::walk_dirs(&mut tx, root, parents, path).await?;
        match queries::child(&mut tx, parent, name).await? {
            Some(ChildRef {
                id,
                kind: NodeKind::File,
            }) => queries::file_content(&mut tx, id).await,
            Some(ChildRef {
                id,
                kind: NodeKind::Directory,
            }) => {
                let dir = queries::load_directory(&mut tx, id).await?;
                Ok(view::render(&dir).into_bytes())
            }
            None => Err(Error::PathNotFound(path.to_string())),
        }
    }

    /// Write `content` as a file at `path`, creating missing parent
    ///  directories on the way. Either the whole path materializes
    ///  and the content is stored, or nothing changes.
    ///
    /// `content` must already be fully buffered: the engine's writer
    ///  lock is held from the first lookup until commit.
    pub async fn put(&self, collection: &str, path: &NodePath, content: &[u8]) -> Result<()> {
        ensure_collection_id(collection)?;
        path.ensure_writable()?;
        let (parents, name) = path.split_last().ok_or_else(|| {
            Error::InvalidInput("cannot write a file at the collection root".to_string())
        })?;

        let mut tx = self.db.begin_write().await?;
        let mut parent = queries::require_root(&mut tx, collection).await?;

        for (depth, segment) in parents.iter().enumerate() {
            parent = match queries::child(&mut tx, parent, segment).await? {
                Some(ChildRef {
                    id,
                    kind: NodeKind::Directory,
                }) => id,
                Some(ChildRef {
                    kind: NodeKind::File,
                    ..
                }) => {
                    let prefix: NodePath = parents[..=depth].iter().collect();
                    return Err(Error::NameConflict(format!("{} is a file", prefix)));
                }
                None => queries::insert_dir(&mut tx, collection, parent, segment).await?,
            };
        }

        match queries::child(&mut tx, parent, name).await? {
            Some(ChildRef {
                kind: NodeKind::Directory,
                ..
            }) => {
                return Err(Error::NameConflict(format!("{} is a directory", path)));
            }
            Some(ChildRef {
                id,
                kind: NodeKind::File,
            }) => queries::update_file(&mut tx, id, content).await?,
            None => {
                queries::insert_file(&mut tx, collection, parent, name, content).await?;
            }
        }

        tx.commit().await.context("put")?;

        tracing::debug!(collection, %path, size = content.len(), "stored file");
        Ok(())
    }

    /// Remove the file or directory at `path`. Directories are removed
    ///  together with every descendant.
    pub async fn delete(&self, collection: &str, path: &NodePath) -> Result<()> {
        ensure_collection_id(collection)?;
        let (parents, name) = path.split_last().ok_or_else(|| {
            Error::InvalidInput("cannot delete the collection root".to_string())
        })?;
        path.ensure_writable()?;

        let mut tx = self.db.begin_write().await?;
        let root = queries::require_root(&mut tx, collection).await?;
        let parent = queries::walk_dirs(&mut tx, root, parents, path).await?;

        let target = queries::child(&mut tx, parent, name)
            .await?
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        let removed = queries::delete_subtree(&mut tx, target.id).await?;

        tx.commit().await.context("delete")?;

        tracing::debug!(collection, %path, kind = ?target.kind, removed, "deleted node");
        Ok(())
    }

    /// Remove a collection entirely, along with the share records that
    ///  point to it or originate from it. Collections produced by its
    ///  shares are independent and survive.
    pub async fn drop_collection(&self, collection: &str) -> Result<()> {
        ensure_collection_id(collection)?;

        let mut tx = self.db.begin_write().await?;
        if !queries::collection_exists(&mut tx, collection).await? {
            return Err(Error::CollectionNotFound(collection.to_string()));
        }
        queries::delete_collection(&mut tx, collection).await?;
        tx.commit().await.context("drop collection")?;

        tracing::debug!(collection, "dropped collection");
        Ok(())
    }
}

pub(crate) fn ensure_collection_id(collection: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(Error::InvalidInput("empty collection id".to_string()));
    }
    Ok(())
}

/// Read the tree and share tokens of `collection` and of every collection
///  its root view embeds, all through the same transaction.
async fn load_snapshot(
    conn: &mut sqlx::SqliteConnection,
    collection: &str,
    root: i64,
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();
    let mut pending = vec![(collection.to_string(), Some(root))];

    while let Some((id, root)) = pending.pop() {
        if snapshot.contains(&id) {
            continue;
        }
        let root = match root {
            Some(root) => root,
            None => match queries::root_id(conn, &id).await? {
                Some(root) => root,
                None => continue,
            },
        };

        let tree = queries::load_directory(conn, root).await?;
        let shares = queries::shares_of(conn, &id).await?;
        for token in &shares {
            if !snapshot.contains(token) {
                pending.push((token.clone(), None));
            }
        }
        snapshot.insert(id, tree, shares);
    }

    Ok(snapshot)
}
