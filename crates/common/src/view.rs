//! Indented text listings of directory trees.
//!
//! A view lists every name of a directory depth-first, one per line,
//! indented by two spaces per level:
//!
//! ```text
//! a
//!   b
//!     c
//! notes.txt
//! ```
//!
//! Root views additionally end with a `shared` block listing each share
//! token of the collection, followed by the full view of the collection
//! that token names.

use std::collections::HashMap;

use crate::path::SHARED;
use crate::tree::{Directory, Entry};

const INDENT: &str = "  ";

/// Render `dir` with its children starting at depth zero.
/// An empty directory renders to an empty string.
pub fn render(dir: &Directory) -> String {
    let mut out = String::new();
    write_tree(&mut out, dir, 0);
    out
}

/// Render the root view of `collection`, including its share block.
pub fn render_root(snapshot: &Snapshot, collection: &str) -> String {
    let mut out = String::new();
    write_collection(&mut out, snapshot, collection, 0);
    out
}

/// The trees and share tokens of a collection and of every collection
///  reachable from it through shares, read within one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    trees: HashMap<String, Directory>,
    shares: HashMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a collection's tree and its share tokens (in key order).
    pub fn insert(&mut self, collection: impl Into<String>, tree: Directory, shares: Vec<String>) {
        let collection = collection.into();
        self.shares.insert(collection.clone(), shares);
        self.trees.insert(collection, tree);
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.trees.contains_key(collection)
    }

    pub fn tree(&self, collection: &str) -> Option<&Directory> {
        self.trees.get(collection)
    }

    pub fn shares(&self, collection: &str) -> &[String] {
        self.shares
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn write_collection(out: &mut String, snapshot: &Snapshot, collection: &str, depth: usize) {
    if let Some(tree) = snapshot.tree(collection) {
        write_tree(out, tree, depth);
    }

    let shares = snapshot.shares(collection);
    if shares.is_empty() {
        return;
    }

    write_line(out, SHARED, depth);
    for token in shares {
        write_line(out, token, depth + 1);
        write_collection(out, snapshot, token, depth + 2);
    }
}

fn write_tree(out: &mut String, dir: &Directory, depth: usize) {
    for (name, entry) in dir.entries() {
        write_line(out, name, depth);
        if let Entry::Directory(child) = entry {
            write_tree(out, child, depth + 1);
        }
    }
}

fn write_line(out: &mut String, name: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(name);
    out.push('\n');
}
