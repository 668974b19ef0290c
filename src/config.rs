// src/config.rs
use std::{env, fmt, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_SECRET_KEY: &str = "fallbacksecret";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Settings read once at startup and passed down to whoever needs them.
///
/// | Variable              | Default                  |
/// |-----------------------|--------------------------|
/// | `OPENAI_API_KEY`      | none (requests fail)     |
/// | `SECRET_KEY`          | `fallbacksecret`         |
/// | `OPENAI_BASE_URL`     | `https://api.openai.com` |
/// | `OPENAI_TIMEOUT_SECS` | none (wait forever)      |
/// | `RELAY_ADDR`          | `127.0.0.1:5000`         |
#[derive(Clone)]
pub struct Config {
    /// Absent keys surface as an authentication failure on each request.
    pub openai_api_key: Option<String>,
    /// Not read by any request path.
    pub secret_key: String,
    pub openai_base_url: String,
    pub openai_timeout: Option<Duration>,
    pub bind_addr: SocketAddr,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_timeout", &self.openai_timeout)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same parsing as [`Config::from_env`], over any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = read("OPENAI_API_KEY");
        let secret_key = read("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());
        let openai_base_url = read("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let openai_timeout = match read("OPENAI_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "OPENAI_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => None,
        };

        let raw_addr = read("RELAY_ADDR").unwrap_or_else(|| DEFAULT_RELAY_ADDR.to_string());
        let bind_addr = raw_addr.trim().parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            var: "RELAY_ADDR",
            value: raw_addr.clone(),
        })?;

        Ok(Self {
            openai_api_key,
            secret_key,
            openai_base_url,
            openai_timeout,
            bind_addr,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.secret_key, DEFAULT_SECRET_KEY);
        assert!(config.uses_default_secret());
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.openai_timeout, None);
        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn missing_or_blank_key_still_loads() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.openai_api_key, None);

        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).unwrap();
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SECRET_KEY", "hunter2"),
            ("OPENAI_BASE_URL", "http://localhost:8080/"),
            ("OPENAI_TIMEOUT_SECS", "30"),
            ("RELAY_ADDR", "0.0.0.0:8000"),
        ]))
        .unwrap();
        assert_eq!(config.secret_key, "hunter2");
        assert!(!config.uses_default_secret());
        assert_eq!(config.openai_base_url, "http://localhost:8080");
        assert_eq!(config.openai_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn bad_timeout_and_addr_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "OPENAI_TIMEOUT_SECS", .. }));

        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("RELAY_ADDR", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "RELAY_ADDR", .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-very-secret"),
            ("SECRET_KEY", "hunter2"),
        ]))
        .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-very-secret"));
        assert!(!printed.contains("hunter2"));
    }
}
