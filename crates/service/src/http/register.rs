use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::prelude::token;

use super::error::status_for;
use crate::mailer::MailerError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Address the new collection token is mailed to
    pub email: String,
}

/// Mint a collection token, mail it, then create the collection.
///
/// Nothing is created when the mail cannot be sent, so a token only
///  ever exists once its owner has been told about it.
///
/// The body is parsed as JSON whatever its content type, so plain
///  `curl -d` requests work.
pub async fn handler(
    State(state): State<ServiceState>,
    body: Bytes,
) -> Result<impl IntoResponse, RegisterError> {
    let req: RegisterRequest = serde_json::from_slice(&body)?;
    let email = req.email.trim();

    if email.is_empty() {
        return Err(RegisterError::EmptyEmail);
    }
    if !state.may_register(email) {
        return Err(RegisterError::NotWhitelisted(email.to_string()));
    }

    let collection = token::generate(token::REGISTRATION_TOKEN_BYTES);

    state.mailer().send(email, &collection).await?;
    state.store().create(&collection).await?;

    tracing::info!(email, "registered new collection");
    Ok((StatusCode::CREATED, "registration successful. check email"))
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("empty email")]
    EmptyEmail,
    #[error("email is not whitelisted: {0}")]
    NotWhitelisted(String),
    #[error("cannot send email with token: {0}")]
    Mail(#[from] MailerError),
    #[error("cannot register: {0}")]
    Store(#[from] common::error::Error),
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        tracing::error!("REGISTER ERROR: {}", self);
        match self {
            RegisterError::InvalidBody(_) | RegisterError::EmptyEmail => {
                (StatusCode::BAD_REQUEST, "invalid request body").into_response()
            }
            RegisterError::NotWhitelisted(_) => (
                StatusCode::FORBIDDEN,
                "current email is not whitelisted",
            )
                .into_response(),
            RegisterError::Mail(_) => {
                (StatusCode::BAD_GATEWAY, "cannot send email with token").into_response()
            }
            RegisterError::Store(e) => (status_for(e.kind()), "cannot register").into_response(),
        }
    }
}
