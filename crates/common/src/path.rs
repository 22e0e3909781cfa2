use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Name rendered as the header of a root view's share block.
/// User data may not be written or deleted under it.
pub const SHARED: &str = "shared";

/// A location inside a collection: an ordered list of non-empty
///  segment names. The empty list is the collection's root directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split a raw `a//b/c/` style string on `/`, dropping empty fragments.
    pub fn parse(raw: &str) -> Self {
        raw.split('/').collect()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The parent segments and the final name, or `None` for the root.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.0
            .split_last()
            .map(|(last, parents)| (parents, last.as_str()))
    }

    /// Reject paths that would shadow the share block of a root view.
    pub fn ensure_writable(&self) -> Result<()> {
        match self.0.first() {
            Some(first) if first == SHARED => Err(Error::InvalidInput(format!(
                "'{}' is a reserved name: {}",
                SHARED, self
            ))),
            _ => Ok(()),
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for NodePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter(|segment| !segment.as_ref().is_empty())
                .map(|segment| segment.as_ref().to_string())
                .collect(),
        )
    }
}

impl FromStr for NodePath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}
