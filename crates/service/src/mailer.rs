//! Delivery of registration tokens by email.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::MailgunConfig;

const MAILGUN_API: &str = "https://api.mailgun.net/v3/";
const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const SUBJECT: &str = "token";

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send `body` to `recipient`.
    async fn send(&self, recipient: &str, body: &str) -> Result<(), MailerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("mail provider answered {0}: {1}")]
    HttpStatus(StatusCode, String),
}

/// Sends messages through the Mailgun HTTP API.
#[derive(Debug, Clone)]
pub struct MailgunMailer {
    endpoint: Url,
    api_key: String,
    sender: String,
    client: Client,
}

impl MailgunMailer {
    pub fn new(config: &MailgunConfig) -> Result<Self, MailerError> {
        let domain = config.domain();
        let endpoint = Url::parse(MAILGUN_API)?.join(&format!("{}/messages", domain))?;
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            sender: format!("dbfs@{}", domain),
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, recipient: &str, body: &str) -> Result<(), MailerError> {
        let form = [
            ("from", self.sender.as_str()),
            ("to", recipient),
            ("subject", SUBJECT),
            ("text", body),
        ];

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::debug!(recipient, "mail accepted by provider");
            Ok(())
        } else {
            Err(MailerError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, body: &str) -> Result<(), MailerError> {
        tracing::warn!(recipient, body, "no mail provider configured, not sending");
        Ok(())
    }
}
