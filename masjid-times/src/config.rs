//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::devotional::{DEFAULT_MAILBOX_TIMEOUT, ImapConfig};
use crate::source::{DEFAULT_TIMEOUT_SECS, SourceConfig};

const SOURCE_URL: &str = "MASJID_SOURCE_URL";
const HTTP_TIMEOUT_SECS: &str = "MASJID_HTTP_TIMEOUT_SECS";
const CACHE_DIR: &str = "MASJID_CACHE_DIR";
const CACHE_TTL_SECS: &str = "MASJID_CACHE_TTL_SECS";
const MAILBOX_DIR: &str = "MASJID_MAILBOX_DIR";
const MAILBOX_TIMEOUT_SECS: &str = "MASJID_MAILBOX_TIMEOUT_SECS";
const IMAP_HOST: &str = "MASJID_IMAP_HOST";
const IMAP_PORT: &str = "MASJID_IMAP_PORT";
const IMAP_USER: &str = "MASJID_IMAP_USER";
const IMAP_PASSWORD: &str = "MASJID_IMAP_PASSWORD";
const IMAP_FOLDER: &str = "MASJID_IMAP_FOLDER";
const BIND_ADDR: &str = "MASJID_BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// A variable is set but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be a socket address, got {value:?}")]
    InvalidAddress { name: &'static str, value: String },

    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} is required when {other} is set")]
    Missing {
        name: &'static str,
        other: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceConfig,
    /// On-disk cache directory; the in-memory cache is used when unset
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    /// Directory mailbox, used when no IMAP account is configured
    pub mailbox_dir: Option<PathBuf>,
    /// IMAP account holding the devotional messages
    pub imap: Option<ImapConfig>,
    /// Bound on one whole mailbox exchange
    pub mailbox_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut source = SourceConfig::new();
        if let Some(url) = get(SOURCE_URL) {
            source = source.with_base_url(url);
        }
        let timeout = parse_secs(HTTP_TIMEOUT_SECS, get(HTTP_TIMEOUT_SECS))?;
        source = source.with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let cache_ttl = parse_secs(CACHE_TTL_SECS, get(CACHE_TTL_SECS))?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL);

        let mailbox_timeout = parse_secs(MAILBOX_TIMEOUT_SECS, get(MAILBOX_TIMEOUT_SECS))?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_MAILBOX_TIMEOUT);

        let bind = get(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.parse().map_err(|_| ConfigError::InvalidAddress {
            name: BIND_ADDR,
            value: bind.clone(),
        })?;

        Ok(Self {
            source,
            cache_dir: get(CACHE_DIR).map(PathBuf::from),
            cache_ttl,
            mailbox_dir: get(MAILBOX_DIR).map(PathBuf::from),
            imap: imap_config(&get)?,
            mailbox_timeout,
            bind_addr,
        })
    }
}

/// An IMAP account needs both a user and a password; neither means none.
fn imap_config(get: impl Fn(&str) -> Option<String>) -> Result<Option<ImapConfig>, ConfigError> {
    let (user, password) = match (get(IMAP_USER), get(IMAP_PASSWORD)) {
        (None, None) => return Ok(None),
        (Some(user), Some(password)) => (user, password),
        (Some(_), None) => {
            return Err(ConfigError::Missing {
                name: IMAP_PASSWORD,
                other: IMAP_USER,
            });
        }
        (None, Some(_)) => {
            return Err(ConfigError::Missing {
                name: IMAP_USER,
                other: IMAP_PASSWORD,
            });
        }
    };

    let mut config = ImapConfig::new(user, password);
    if let Some(host) = get(IMAP_HOST) {
        config = config.with_host(host);
    }
    if let Some(port) = get(IMAP_PORT) {
        let port = port.trim().parse().map_err(|_| ConfigError::InvalidPort {
            name: IMAP_PORT,
            value: port.clone(),
        })?;
        config = config.with_port(port);
    }
    if let Some(folder) = get(IMAP_FOLDER) {
        config = config.with_folder(folder);
    }
    Ok(Some(config))
}

fn parse_secs(name: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value: v })
        })
        .transpose()
}
