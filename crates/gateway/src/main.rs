//! DBFS - hierarchical file storage over HTTP
//!
//! Every user owns a collection of directories and files, addressed by the
//! token they receive on registration. Directories can be shared as
//! point-in-time snapshots under a fresh token.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use service::config::{parse_whitelist, MAX_UPLOAD_SIZE_BYTES};
use service::{Config, MailgunConfig, ServiceState};

const REQUEST_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// DBFS - hierarchical file storage over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long, env = "APP_PORT", default_value = "8080")]
    port: u16,

    /// Path to the SQLite data file
    #[arg(short, long, env = "DB_PATH", default_value = "/tmp/dbfs.sqlite")]
    db_path: PathBuf,

    /// Keep all data in memory instead of the data file
    #[arg(long, conflicts_with = "db_path")]
    in_memory: bool,

    /// Mailgun API key. Without one, registration tokens are only logged
    #[arg(long, env = "MAILGUN_API_KEY", hide_env_values = true)]
    mailgun_api_key: Option<String>,

    /// Mailgun sending domain
    #[arg(long, env = "MAILGUN_ROOT_DOMAIN", default_value = "")]
    mailgun_root_domain: String,

    /// Optional subdomain prepended to the Mailgun domain
    #[arg(long, env = "MAILGUN_SUBDOMAIN")]
    mailgun_subdomain: Option<String>,

    /// Comma separated emails allowed to register. Empty allows anyone
    #[arg(long, env = "WHITELIST", default_value = "")]
    whitelist: String,

    /// Largest accepted upload, in bytes
    #[arg(long, default_value_t = MAX_UPLOAD_SIZE_BYTES)]
    max_upload_bytes: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mailgun = match self.mailgun_api_key.filter(|key| !key.is_empty()) {
            Some(api_key) => {
                if self.mailgun_root_domain.is_empty() {
                    anyhow::bail!("MAILGUN_ROOT_DOMAIN is required with MAILGUN_API_KEY");
                }
                Some(MailgunConfig {
                    api_key,
                    root_domain: self.mailgun_root_domain,
                    subdomain: self.mailgun_subdomain,
                })
            }
            None => None,
        };

        Ok(Config {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port),
            max_upload_bytes: self.max_upload_bytes,
            sqlite_path: (!self.in_memory).then_some(self.db_path),
            mailgun,
            whitelist: parse_whitelist(&self.whitelist),
            log_level: self.log_level.parse().unwrap_or(tracing::Level::INFO),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.into_config()?;

    // Initialize tracing
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    register_panic_logger();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting DBFS");

    // Create state
    let state = match ServiceState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create service state: {}", e);
            std::process::exit(3);
        }
    };

    // Set up graceful shutdown
    let shutdown_rx = graceful_shutdown_blocker()?;

    let http_config = service::http::Config::from(&config);
    if let Err(e) = service::http::run(http_config, state.clone(), shutdown_rx).await {
        tracing::error!("HTTP server error: {}", e);
    }

    state.database().close().await;
    tracing::info!("DBFS shutdown complete");
    Ok(())
}

/// Spawns a task that listens for SIGINT and SIGTERM and signals shutdown
///  through the returned watch.
fn graceful_shutdown_blocker() -> Result<watch::Receiver<()>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let (tx, rx) = watch::channel(());

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("gracefully exiting immediately on SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::debug!("initiating graceful shutdown with delay on SIGTERM");
                tokio::time::sleep(REQUEST_GRACE_PERIOD).await;
            }
        }

        let _ = tx.send(());
    });

    Ok(rx)
}

/// Registers a panic hook that logs panics using the `tracing` crate
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let config = Args::parse_from(["dbfs"]).into_config().unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.sqlite_path, Some(PathBuf::from("/tmp/dbfs.sqlite")));
        assert_eq!(config.max_upload_bytes, MAX_UPLOAD_SIZE_BYTES);
        assert!(config.whitelist.is_empty());
    }

    #[test]
    fn test_flags() {
        let config = Args::parse_from([
            "dbfs",
            "--port",
            "9000",
            "--in-memory",
            "--whitelist",
            "neo@matrix.io,trinity@matrix.io",
            "--mailgun-api-key",
            "key",
            "--mailgun-root-domain",
            "example.com",
            "--log-level",
            "debug",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.sqlite_path, None);
        assert_eq!(config.whitelist.len(), 2);
        assert_eq!(config.mailgun.unwrap().domain(), "example.com");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_mailgun_key_needs_domain() {
        let result = Args::parse_from(["dbfs", "--mailgun-api-key", "key"]).into_config();
        assert!(result.is_err());
    }
}
