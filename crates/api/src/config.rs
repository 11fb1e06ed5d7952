//! Process configuration, read once from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FORMGATE_BIND` | `0.0.0.0:8080` |
//! | `DATABASE_URL` | unset: in-memory user store |
//! | `FORMGATE_SEED_FILE` | unset: built-in dev users |
//! | `FORMGATE_SESSION_IDLE_MINUTES` | `30` |
//! | `FORMGATE_SECURE_COOKIE` | `false` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Sessions expire after this long without a request.
    pub idle_timeout: Duration,
    pub secure_cookie: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
            secure_cookie: false,
        }
    }
}

/// Startup configuration. Not `Debug`: `database_url` may embed credentials.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub sessions: SessionSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let bind_addr = {
            let raw = non_empty("FORMGATE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
            raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                var: "FORMGATE_BIND",
                value: raw.clone(),
                reason: e.to_string(),
            })?
        };

        let idle_minutes = match non_empty("FORMGATE_SESSION_IDLE_MINUTES") {
            None => DEFAULT_SESSION_IDLE_MINUTES,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "FORMGATE_SESSION_IDLE_MINUTES",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    });
                }
                Ok(m) => m,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "FORMGATE_SESSION_IDLE_MINUTES",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
        };

        let secure_cookie = match non_empty("FORMGATE_SECURE_COOKIE") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                var: "FORMGATE_SECURE_COOKIE",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            database_url: non_empty("DATABASE_URL"),
            seed_file: non_empty("FORMGATE_SEED_FILE").map(PathBuf::from),
            sessions: SessionSettings {
                idle_timeout: Duration::from_secs(idle_minutes * 60),
                secure_cookie,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND.parse().unwrap());
        assert!(cfg.database_url.is_none());
        assert!(cfg.seed_file.is_none());
        assert_eq!(cfg.sessions, SessionSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("FORMGATE_BIND", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/formgate"),
            ("FORMGATE_SEED_FILE", "/etc/formgate/users.json"),
            ("FORMGATE_SESSION_IDLE_MINUTES", "5"),
            ("FORMGATE_SECURE_COOKIE", "true"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/formgate"));
        assert_eq!(cfg.seed_file, Some(PathBuf::from("/etc/formgate/users.json")));
        assert_eq!(cfg.sessions.idle_timeout, Duration::from_secs(300));
        assert!(cfg.sessions.secure_cookie);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = config(&[("DATABASE_URL", "  "), ("FORMGATE_BIND", "")]).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.bind_addr.port(), 8080);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("FORMGATE_BIND", "not-an-addr")]),
            Err(ConfigError::Invalid { var: "FORMGATE_BIND", .. })
        ));
        assert!(matches!(
            config(&[("FORMGATE_SESSION_IDLE_MINUTES", "0")]),
            Err(ConfigError::Invalid { var: "FORMGATE_SESSION_IDLE_MINUTES", .. })
        ));
        assert!(matches!(
            config(&[("FORMGATE_SECURE_COOKIE", "yes")]),
            Err(ConfigError::Invalid { var: "FORMGATE_SECURE_COOKIE", .. })
        ));
    }
}
