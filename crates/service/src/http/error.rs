use axum::response::{IntoResponse, Response};
use http::StatusCode;

use common::prelude::{Error, ErrorKind};

/// Failure of a namespace or share request.
///
/// The response body is a short plain-text message naming the operation
///  that failed. The underlying error only goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("empty Authorization header")]
    MissingToken,
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: Error,
    },
}

impl ApiError {
    /// Wrap a store error under `message`, for use with `map_err`.
    pub fn store(message: &'static str) -> impl FnOnce(Error) -> Self {
        move |source| Self::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken => StatusCode::BAD_REQUEST,
            ApiError::Store { source, .. } => status_for(source.kind()),
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NameConflict | ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API ERROR: {}", self);
        } else {
            tracing::warn!("API ERROR: {}", self);
        }

        let body = match self {
            ApiError::MissingToken => "empty Authorization header",
            ApiError::Store { message, .. } => message,
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::store("cannot view node")(Error::PathNotFound("/a".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "cannot view node: path not found: /a");

        let err = ApiError::store("cannot create node")(Error::NameConflict("/a".to_string()));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::store("cannot share node")(Error::AlreadyExists("t".to_string()));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::store("cannot delete node")(Error::InvalidInput("x".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        assert_eq!(ApiError::MissingToken.status(), StatusCode::BAD_REQUEST);
    }
}
