use std::fmt::{self, Debug, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

/// Errors raised while reading [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not set")]
    Missing { key: &'static str },
    #[error("invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime settings of the service.
#[derive(Clone)]
pub struct Config {
    pub listen: String,
    pub database_url: String,
    /// Uploaded images are written below this directory and served from `/media/`.
    pub media_root: PathBuf,
    pub page_cache_ttl: Duration,
    pub session_secret: Vec<u8>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen", &self.listen)
            .field("database_url", &self.database_url)
            .field("media_root", &self.media_root)
            .field("page_cache_ttl", &self.page_cache_ttl)
            .field("session_secret", &"..")
            .finish()
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, applying defaults for optional keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let ttl_secs: u64 = try_load(&lookup, "YATUBE_PAGE_CACHE_TTL", "20")?;
        let session_secret = lookup("YATUBE_SESSION_SECRET")
            .ok_or(ConfigError::Missing {
                key: "YATUBE_SESSION_SECRET",
            })?
            .into_bytes();
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "YATUBE_SESSION_SECRET",
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes long"),
            });
        }
        Ok(Self {
            listen: try_load(&lookup, "YATUBE_LISTEN", "0.0.0.0:5800")?,
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://yatube.db?mode=rwc")?,
            media_root: try_load(&lookup, "YATUBE_MEDIA_ROOT", "media")?,
            page_cache_ttl: Duration::from_secs(ttl_secs),
            session_secret,
        })
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tracing_test::traced_test;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    #[traced_test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("YATUBE_SESSION_SECRET", SECRET)])).unwrap();
        assert_eq!(config.listen, "0.0.0.0:5800");
        assert_eq!(config.database_url, "sqlite://yatube.db?mode=rwc");
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.page_cache_ttl, Duration::from_secs(20));
        assert!(logs_contain("YATUBE_LISTEN not set"));
        assert!(!format!("{config:?}").contains(SECRET));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("YATUBE_SESSION_SECRET", SECRET),
            ("YATUBE_LISTEN", "127.0.0.1:8000"),
            ("YATUBE_PAGE_CACHE_TTL", " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:8000");
        assert_eq!(config.page_cache_ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "YATUBE_SESSION_SECRET" }));

        let err = Config::from_lookup(lookup(&[("YATUBE_SESSION_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "YATUBE_SESSION_SECRET", .. }));

        let err = Config::from_lookup(lookup(&[
            ("YATUBE_SESSION_SECRET", SECRET),
            ("YATUBE_PAGE_CACHE_TTL", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "YATUBE_PAGE_CACHE_TTL", .. }));
    }
}
