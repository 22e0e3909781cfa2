//! Low-level statements against the node arena.
//!
//! Every function runs on a connection the caller already holds inside a
//! transaction; none of them commit.

use sqlx::{Row, SqliteConnection};

use crate::error::{Context, Error, Result};
use crate::path::NodePath;
use crate::tree::{Directory, NodeKind, NodeRow};

/// A child node found under a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChildRef {
    pub id: i64,
    pub kind: NodeKind,
}

/// A node row with its content, used when copying subtrees.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ContentRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub kind: NodeKind,
    pub content: Option<Vec<u8>>,
}

pub(crate) async fn collection_exists(conn: &mut SqliteConnection, collection: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM collections WHERE id = ?")
        .bind(collection)
        .fetch_optional(&mut *conn)
        .await
        .context("collection lookup")?;
    Ok(row.is_some())
}

/// Insert a collection together with its empty root directory.
/// Returns the id of the root node.
pub(crate) async fn insert_collection(conn: &mut SqliteConnection, collection: &str) -> Result<i64> {
    sqlx::query("INSERT INTO collections (id) VALUES (?)")
        .bind(collection)
        .execute(&mut *conn)
        .await
        .context("create collection")?;

    let result = sqlx::query(
        r#"
        INSERT INTO nodes (collection_id, parent_id, name, kind, content)
        VALUES (?, NULL, '', ?, NULL)
        "#,
    )
    .bind(collection)
    .bind(NodeKind::Directory)
    .execute(&mut *conn)
    .await
    .context("create collection root")?;

    Ok(result.last_insert_rowid())
}

pub(crate) async fn root_id(conn: &mut SqliteConnection, collection: &str) -> Result<Option<i64>> {
    let row = sqlx::query("SELECT id FROM nodes WHERE collection_id = ? AND parent_id IS NULL")
        .bind(collection)
        .fetch_optional(&mut *conn)
        .await
        .context("root lookup")?;
    Ok(row.map(|r| r.get("id")))
}

/// Root directory of `collection`, failing if the collection does not exist.
pub(crate) async fn require_root(conn: &mut SqliteConnection, collection: &str) -> Result<i64> {
    root_id(conn, collection)
        .await?
        .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))
}

pub(crate) async fn child(
    conn: &mut SqliteConnection,
    parent_id: i64,
    name: &str,
) -> Result<Option<ChildRef>> {
    let row = sqlx::query("SELECT id, kind FROM nodes WHERE parent_id = ? AND name = ?")
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .context("child lookup")?;

    row.map(|r| {
        Ok(ChildRef {
            id: r.try_get("id").context("child lookup")?,
            kind: r.try_get("kind").context("child lookup")?,
        })
    })
    .transpose()
}

/// Follow `segments` from `start`, requiring every one of them to be an
///  existing directory. `path` is only used for error messages.
pub(crate) async fn walk_dirs(
    conn: &mut SqliteConnection,
    start: i64,
    segments: &[String],
    path: &NodePath,
) -> Result<i64> {
    let mut current = start;
    for (depth, segment) in segments.iter().enumerate() {
        match child(conn, current, segment).await? {
            Some(ChildRef {
                id,
                kind: NodeKind::Directory,
            }) => current = id,
            Some(_) => {
                let prefix: NodePath = segments[..=depth].iter().collect();
                return Err(Error::PathNotFound(format!(
                    "{} is not a directory (in {})",
                    prefix, path
                )));
            }
            None => return Err(Error::PathNotFound(path.to_string())),
        }
    }
    Ok(current)
}

pub(crate) async fn insert_dir(
    conn: &mut SqliteConnection,
    collection: &str,
    parent_id: i64,
    name: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO nodes (collection_id, parent_id, name, kind, content)
        VALUES (?, ?, ?, ?, NULL)
        "#,
    )
    .bind(collection)
    .bind(parent_id)
    .bind(name)
    .bind(NodeKind::Directory)
    .execute(&mut *conn)
    .await
    .context("create directory")?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn insert_file(
    conn: &mut SqliteConnection,
    collection: &str,
    parent_id: i64,
    name: &str,
    content: &[u8],
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO nodes (collection_id, parent_id, name, kind, content)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(collection)
    .bind(parent_id)
    .bind(name)
    .bind(NodeKind::File)
    .bind(content)
    .execute(&mut *conn)
    .await
    .context("create file")?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn update_file(conn: &mut SqliteConnection, id: i64, content: &[u8]) -> Result<()> {
    sqlx::query("UPDATE nodes SET content = ? WHERE id = ? AND kind = ?")
        .bind(content)
        .bind(id)
        .bind(NodeKind::File)
        .execute(&mut *conn)
        .await
        .context("overwrite file")?;
    Ok(())
}

pub(crate) async fn file_content(conn: &mut SqliteConnection, id: i64) -> Result<Vec<u8>> {
    let row = sqlx::query("SELECT content FROM nodes WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .context("read file")?;
    let content: Option<Vec<u8>> = row.try_get("content").context("read file")?;
    Ok(content.unwrap_or_default())
}

/// Every node below (and including) `root_id`, without file contents.
pub(crate) async fn subtree(conn: &mut SqliteConnection, root_id: i64) -> Result<Vec<NodeRow>> {
    sqlx::query_as::<_, NodeRow>(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT ?
            UNION ALL
            SELECT n.id FROM nodes n JOIN subtree s ON n.parent_id = s.id
        )
        SELECT n.id, n.parent_id, n.name, n.kind
        FROM nodes n JOIN subtree s ON n.id = s.id
        "#,
    )
    .bind(root_id)
    .fetch_all(&mut *conn)
    .await
    .context("load subtree")
}

/// Every node below (and including) `root_id`, with file contents.
pub(crate) async fn subtree_with_content(
    conn: &mut SqliteConnection,
    root_id: i64,
) -> Result<Vec<ContentRow>> {
    sqlx::query_as::<_, ContentRow>(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT ?
            UNION ALL
            SELECT n.id FROM nodes n JOIN subtree s ON n.parent_id = s.id
        )
        SELECT n.id, n.parent_id, n.name, n.kind, n.content
        FROM nodes n JOIN subtree s ON n.id = s.id
        "#,
    )
    .bind(root_id)
    .fetch_all(&mut *conn)
    .await
    .context("load subtree")
}

/// Load the directory rooted at `root_id` as an in-memory tree.
pub(crate) async fn load_directory(conn: &mut SqliteConnection, root_id: i64) -> Result<Directory> {
    let rows = subtree(conn, root_id).await?;
    Ok(Directory::from_rows(root_id, rows))
}

/// Delete a node and all of its descendants. Returns the number of
///  removed nodes.
pub(crate) async fn delete_subtree(conn: &mut SqliteConnection, id: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT ?
            UNION ALL
            SELECT n.id FROM nodes n JOIN subtree s ON n.parent_id = s.id
        )
        DELETE FROM nodes WHERE id IN (SELECT id FROM subtree)
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await
    .context("delete")?;
    Ok(result.rows_affected())
}

/// Share tokens recorded for `collection`, in key order.
pub(crate) async fn shares_of(conn: &mut SqliteConnection, collection: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT token FROM shares WHERE source_id = ? ORDER BY token")
        .bind(collection)
        .fetch_all(&mut *conn)
        .await
        .context("list shares")?;
    Ok(rows.iter().map(|r| r.get("token")).collect())
}

/// Whether `collection` was created by a share.
pub(crate) async fn is_share_target(conn: &mut SqliteConnection, collection: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM shares WHERE token = ? LIMIT 1")
        .bind(collection)
        .fetch_optional(&mut *conn)
        .await
        .context("share lookup")?;
    Ok(row.is_some())
}

pub(crate) async fn insert_share(conn: &mut SqliteConnection, source: &str, token: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO shares (source_id, token) VALUES (?, ?)")
        .bind(source)
        .bind(token)
        .execute(&mut *conn)
        .await
        .context("record share")?;
    Ok(())
}

/// Remove a collection, all of its nodes, and every share record that
///  mentions it on either side.
pub(crate) async fn delete_collection(conn: &mut SqliteConnection, collection: &str) -> Result<()> {
    sqlx::query("DELETE FROM shares WHERE source_id = ? OR token = ?")
        .bind(collection)
        .bind(collection)
        .execute(&mut *conn)
        .await
        .context("drop shares")?;

    sqlx::query("DELETE FROM nodes WHERE collection_id = ?")
        .bind(collection)
        .execute(&mut *conn)
        .await
        .context("drop nodes")?;

    sqlx::query("DELETE FROM collections WHERE id = ?")
        .bind(collection)
        .execute(&mut *conn)
        .await
        .context("drop collection")?;

    Ok(())
}
