use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

/// Maximum upload size in bytes (500 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 500 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the HTTP server to listen on
    pub listen_addr: SocketAddr,
    /// largest request body accepted on a write
    pub max_upload_bytes: usize,

    // data store configuration
    /// a path to the sqlite data file, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // registration
    /// mailgun credentials, if not set registration tokens
    ///  are only written to the log
    pub mailgun: Option<MailgunConfig>,
    /// emails allowed to register. Empty means anyone may.
    pub whitelist: Vec<String>,

    // misc
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080),
            max_upload_bytes: MAX_UPLOAD_SIZE_BYTES,
            sqlite_path: Some(PathBuf::from("/tmp/dbfs.sqlite")),
            mailgun: None,
            whitelist: Vec::new(),
            log_level: tracing::Level::INFO,
        }
    }
}

#[derive(Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub root_domain: String,
    pub subdomain: Option<String>,
}

impl MailgunConfig {
    /// Sending domain: `{subdomain}.{root_domain}`, or the root
    ///  domain alone when no subdomain is set.
    pub fn domain(&self) -> String {
        match self.subdomain.as_deref() {
            Some(sub) if !sub.is_empty() => format!("{}.{}", sub, self.root_domain),
            _ => self.root_domain.clone(),
        }
    }
}

impl std::fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("api_key", &"<redacted>")
            .field("root_domain", &self.root_domain)
            .field("subdomain", &self.subdomain)
            .finish()
    }
}

/// Split a comma separated allow-list, dropping blanks.
pub fn parse_whitelist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whitelist() {
        assert!(parse_whitelist("").is_empty());
        assert!(parse_whitelist(" , ,").is_empty());
        assert_eq!(
            parse_whitelist("neo@matrix.io, trinity@matrix.io,"),
            ["neo@matrix.io", "trinity@matrix.io"]
        );
    }

    #[test]
    fn test_mailgun_domain() {
        let mut config = MailgunConfig {
            api_key: "key".to_string(),
            root_domain: "example.com".to_string(),
            subdomain: None,
        };
        assert_eq!(config.domain(), "example.com");

        config.subdomain = Some("mg".to_string());
        assert_eq!(config.domain(), "mg.example.com");

        config.subdomain = Some(String::new());
        assert_eq!(config.domain(), "example.com");

        assert!(!format!("{:?}", config).contains("\"key\""));
    }
}
