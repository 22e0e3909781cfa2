use std::sync::Arc;

use axum::extract::FromRef;
use common::prelude::{Database, NamespaceStore, ShareManager};

use super::config::Config;
use super::mailer::{LogMailer, MailerError, MailgunMailer, Mailer};

/// Main service state, shared by every request handler
#[derive(Clone)]
pub struct State {
    store: NamespaceStore,
    shares: ShareManager,
    mailer: Arc<dyn Mailer>,
    whitelist: Arc<Vec<String>>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let database = match config.sqlite_path {
            Some(ref path) => {
                tracing::info!("Database path: {}", path.display());
                Database::open(path).await?
            }
            // otherwise just set up an in-memory database
            None => {
                tracing::warn!("no database path set, data will not survive a restart");
                Database::in_memory().await?
            }
        };

        // 2. Setup mailer
        let mailer: Arc<dyn Mailer> = match config.mailgun {
            Some(ref mailgun) => {
                let mailer = MailgunMailer::new(mailgun)?;
                tracing::info!("Mailgun endpoint: {}", mailer.endpoint());
                Arc::new(mailer)
            }
            None => {
                tracing::warn!("no mailgun api key set, registration tokens are only logged");
                Arc::new(LogMailer)
            }
        };

        if config.whitelist.is_empty() {
            tracing::info!("registration is open to any email");
        } else {
            tracing::info!(count = config.whitelist.len(), "registration allow-list loaded");
        }

        Ok(Self::new(database, mailer, config.whitelist.clone()))
    }

    pub fn new(database: Database, mailer: Arc<dyn Mailer>, whitelist: Vec<String>) -> Self {
        Self {
            store: NamespaceStore::new(database.clone()),
            shares: ShareManager::new(database),
            mailer,
            whitelist: Arc::new(whitelist),
        }
    }

    pub fn store(&self) -> &NamespaceStore {
        &self.store
    }

    pub fn shares(&self) -> &ShareManager {
        &self.shares
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn database(&self) -> &Database {
        self.store.database()
    }

    /// Whether `email` may register. An empty allow-list admits everyone.
    pub fn may_register(&self, email: &str) -> bool {
        self.whitelist.is_empty() || self.whitelist.iter().any(|allowed| allowed == email)
    }
}

impl FromRef<State> for Database {
    fn from_ref(state: &State) -> Self {
        state.database().clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] common::error::Error),
    #[error("Mailer setup error: {0}")]
    MailerSetupError(#[from] MailerError),
}
