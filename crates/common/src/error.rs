//! Error types for namespace, view and share operations.

/// Coarse classification of an [`Error`], used by callers that
/// need to map failures onto a transport (HTTP status codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A collection or a path segment does not exist
    NotFound,
    /// A path segment exists with the wrong node type
    NameConflict,
    /// A collection id (user or share token) is already taken
    AlreadyExists,
    /// The request itself is malformed
    InvalidInput,
    /// The engine (or another dependency) failed
    UpstreamFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("name conflict: {0}")]
    NameConflict(String),

    #[error("collection already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error during {context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CollectionNotFound(_) | Error::PathNotFound(_) => ErrorKind::NotFound,
            Error::NameConflict(_) => ErrorKind::NameConflict,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Database { .. } | Error::Migration(_) | Error::Io(_) => {
                ErrorKind::UpstreamFailure
            }
        }
    }
}

/// Attach the name of the running operation to a raw engine error.
pub(crate) trait Context<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> Context<T> for std::result::Result<T, sqlx::Error> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Database { context, source })
    }
}

/// Result type alias for namespace operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::CollectionNotFound("c".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::PathNotFound("/a".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::NameConflict("/a".into()).kind(),
            ErrorKind::NameConflict
        );
        assert_eq!(
            Error::AlreadyExists("c".into()).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            Error::InvalidInput("empty".into()).kind(),
            ErrorKind::InvalidInput
        );

        let wrapped: Result<()> = Err(sqlx::Error::RowNotFound).context("get");
        let err = wrapped.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(err.to_string().starts_with("database error during get"));
    }
}
