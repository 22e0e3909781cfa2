/**
 * Handle to the SQLite engine that backs
 *  every collection.
 */
pub mod database;
pub mod error;
/**
 * Slash-separated node paths and the
 *  reserved `shared` name.
 */
pub mod path;
/**
 * Point-in-time copies of a collection subtree
 *  into a new collection named by a token.
 */
pub mod share;
/**
 * The hierarchical namespace itself:
 *  collections of directories and files.
 */
pub mod store;
pub mod token;
/**
 * In-memory directory trees, as loaded
 *  from the engine for rendering.
 */
pub mod tree;
/**
 * Indented text views of trees and
 *  share blocks.
 */
pub mod view;

pub mod prelude {
    pub use crate::database::Database;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::path::NodePath;
    pub use crate::share::ShareManager;
    pub use crate::store::NamespaceStore;
    pub use crate::token;
    pub use crate::tree::{Directory, Entry};
}
