use std::collections::{BTreeMap, HashMap};

/// Type of a node as persisted in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum NodeKind {
    #[sqlx(rename = "dir")]
    Directory,
    #[sqlx(rename = "file")]
    File,
}

/**
 * Directories
 * ===========
 * An in-memory copy of a directory subtree, as read from the engine
 *  within a single snapshot. Only names and node types are kept;
 *  file contents stay in the engine.
 * Entries are ordered by name, byte by byte, which matches the
 *  engine's own key ordering.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Directory(Directory),
    File,
}

/// A node row without its content.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct NodeRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub kind: NodeKind,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_dir(mut self, name: impl Into<String>, dir: Directory) -> Self {
        self.entries.insert(name.into(), Entry::Directory(dir));
        self
    }

    pub fn with_file(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::File);
        self
    }

    /// Rebuild the subtree rooted at `root_id` from its flat rows.
    pub(crate) fn from_rows(root_id: i64, rows: Vec<NodeRow>) -> Self {
        let mut children: HashMap<i64, Vec<NodeRow>> = HashMap::new();
        for row in rows {
            if let Some(parent_id) = row.parent_id {
                children.entry(parent_id).or_default().push(row);
            }
        }
        Self::build(root_id, &mut children)
    }

    fn build(id: i64, children: &mut HashMap<i64, Vec<NodeRow>>) -> Self {
        let mut dir = Directory::new();
        for row in children.remove(&id).unwrap_or_default() {
            let entry = match row.kind {
                NodeKind::Directory => Entry::Directory(Self::build(row.id, children)),
                NodeKind::File => Entry::File,
            };
            dir.entries.insert(row.name, entry);
        }
        dir
    }
}
