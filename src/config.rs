//! Server configuration read from the environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `TASKBOARD_BIND_ADDR` | listen address | `127.0.0.1:3000` |
//! | `TASKBOARD_DATABASE_URL` | Postgres URL; in-memory store when unset | unset |
//! | `TASKBOARD_DB_POOL_SIZE` | connection pool size | `8` |
//! | `TASKBOARD_SERVICE_KEY` | shared service secret | unset |
//! | `TASKBOARD_SESSION_TOKENS` | `token=uuid` pairs, comma separated | empty |

use crate::tenancy::domain::UserId;
use std::net::SocketAddr;
use thiserror::Error;
use uuid::Uuid;

const BIND_ADDR: &str = "TASKBOARD_BIND_ADDR";
const DATABASE_URL: &str = "TASKBOARD_DATABASE_URL";
const DB_POOL_SIZE: &str = "TASKBOARD_DB_POOL_SIZE";
const SERVICE_KEY: &str = "TASKBOARD_SERVICE_KEY";
const SESSION_TOKENS: &str = "TASKBOARD_SESSION_TOKENS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_POOL_SIZE: u32 = 8;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The listen address does not parse.
    #[error("TASKBOARD_BIND_ADDR is not a socket address: {0}")]
    InvalidBindAddr(String),

    /// The pool size is not a positive integer.
    #[error("TASKBOARD_DB_POOL_SIZE must be a positive integer, got {0}")]
    InvalidPoolSize(String),

    /// A session entry is not `token=uuid`.
    #[error("TASKBOARD_SESSION_TOKENS entry `{0}` must have the form token=uuid")]
    InvalidSessionToken(String),
}

/// Settings for the board server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Postgres URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled Postgres connections.
    pub pool_size: u32,
    /// Shared secret for service calls.
    pub service_key: Option<String>,
    /// Static session tokens and their users.
    pub sessions: Vec<(String, UserId)>,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for values that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for values that do not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let raw_addr = read(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let pool_size = match read(DB_POOL_SIZE) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPoolSize(raw))?,
            None => DEFAULT_POOL_SIZE,
        };

        let sessions = read(SESSION_TOKENS)
            .map(|raw| parse_sessions(&raw))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            database_url: read(DATABASE_URL),
            pool_size,
            service_key: read(SERVICE_KEY),
            sessions,
        })
    }
}

fn parse_sessions(raw: &str) -> Result<Vec<(String, UserId)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (raw_token, user) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidSessionToken(entry.to_owned()))?;
            let user_id = Uuid::parse_str(user.trim())
                .map_err(|_| ConfigError::InvalidSessionToken(entry.to_owned()))?;
            let token = raw_token.trim();
            if token.is_empty() {
                return Err(ConfigError::InvalidSessionToken(entry.to_owned()));
            }
            Ok((token.to_owned(), UserId::from_uuid(user_id)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() -> eyre::Result<()> {
        let config = ServerConfig::from_lookup(lookup(&[]))?;
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>()?);
        assert_eq!(config.database_url, None);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.service_key, None);
        assert!(config.sessions.is_empty());
        Ok(())
    }

    #[rstest]
    fn every_variable_is_read() -> eyre::Result<()> {
        let user = Uuid::new_v4();
        let tokens = format!("alpha={user}, beta={user}");
        let config = ServerConfig::from_lookup(lookup(&[
            (BIND_ADDR, "0.0.0.0:8080"),
            (DATABASE_URL, "postgres://localhost/board"),
            (DB_POOL_SIZE, "4"),
            (SERVICE_KEY, "secret"),
            (SESSION_TOKENS, tokens.as_str()),
        ]))?;
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/board"));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.service_key.as_deref(), Some("secret"));
        assert_eq!(
            config.sessions,
            vec![
                ("alpha".to_owned(), UserId::from_uuid(user)),
                ("beta".to_owned(), UserId::from_uuid(user)),
            ]
        );
        Ok(())
    }

    #[rstest]
    fn blank_values_count_as_unset() -> eyre::Result<()> {
        let config = ServerConfig::from_lookup(lookup(&[(DATABASE_URL, "  "), (SERVICE_KEY, "")]))?;
        assert_eq!(config.database_url, None);
        assert_eq!(config.service_key, None);
        Ok(())
    }

    #[rstest]
    #[case(&[(BIND_ADDR, "not-an-address")], ConfigError::InvalidBindAddr("not-an-address".to_owned()))]
    #[case(&[(DB_POOL_SIZE, "0")], ConfigError::InvalidPoolSize("0".to_owned()))]
    #[case(&[(DB_POOL_SIZE, "many")], ConfigError::InvalidPoolSize("many".to_owned()))]
    #[case(&[(SESSION_TOKENS, "missing-separator")], ConfigError::InvalidSessionToken("missing-separator".to_owned()))]
    #[case(&[(SESSION_TOKENS, "token=not-a-uuid")], ConfigError::InvalidSessionToken("token=not-a-uuid".to_owned()))]
    fn malformed_values_are_rejected(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: ConfigError,
    ) {
        assert_eq!(ServerConfig::from_lookup(lookup(pairs)), Err(expected));
    }
}
