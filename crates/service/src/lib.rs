//! Service infrastructure for the DBFS gateway.
//!
//! This crate wires the namespace core to the outside world:
//! - Configuration and shared state (store, share manager, mailer)
//! - Registration by email (Mailgun, or the log in development)
//! - HTTP handlers (collections, shares, registration, health checks)

pub mod config;
pub mod http;
pub mod mailer;
pub mod state;

// Re-export key types for convenience
pub use config::{Config, MailgunConfig};
pub use mailer::{LogMailer, Mailer, MailerError, MailgunMailer};
pub use state::{State as ServiceState, StateSetupError};
