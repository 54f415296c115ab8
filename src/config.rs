use std::path::PathBuf;

use thiserror::Error;

use crate::models::{ModelError, UserScope};

/// Application-level constants
pub const APP_NAME: &str = "DocWallet";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

const ENV_REGISTRY_URL: &str = "DOCWALLET_REGISTRY_URL";
const ENV_REQUEST_TIMEOUT_SECS: &str = "DOCWALLET_REQUEST_TIMEOUT_SECS";
const ENV_API_TOKEN: &str = "DOCWALLET_API_TOKEN";
const ENV_DATA_DIR: &str = "DOCWALLET_DATA_DIR";
const ENV_USER: &str = "DOCWALLET_USER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("Invalid user scope: {0}")]
    InvalidUser(#[from] ModelError),
}

/// Get the application data directory
/// ~/DocWallet/ on all platforms
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

/// Get the profiles directory under a data directory
pub fn profiles_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("profiles")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "docwallet=info,docwallet_lib=info"
}

/// Runtime settings, read from `DOCWALLET_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub registry_url: String,
    pub request_timeout_secs: u64,
    /// Bearer token issued by the external auth service, if any.
    pub api_token: Option<String>,
    pub data_dir: PathBuf,
    pub user_scope: UserScope,
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable source. Unset and blank
    /// variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let registry_url = get(ENV_REGISTRY_URL).unwrap_or_else(|| DEFAULT_REGISTRY_URL.into());
        if !(registry_url.starts_with("http://") || registry_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                var: ENV_REGISTRY_URL,
                reason: format!("expected an http(s) URL, got '{registry_url}'"),
            });
        }

        let request_timeout_secs = match get(ENV_REQUEST_TIMEOUT_SECS) {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_REQUEST_TIMEOUT_SECS,
                        reason: format!("expected a positive number of seconds, got '{raw}'"),
                    })
                }
            },
        };

        let data_dir = match get(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => app_data_dir()?,
        };

        let user_scope = match get(ENV_USER) {
            Some(user) => UserScope::new(user)?,
            None => UserScope::local(),
        };

        Ok(Self {
            registry_url,
            request_timeout_secs,
            api_token: get(ENV_API_TOKEN),
            data_dir,
            user_scope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<WalletConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WalletConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = config_from(&[(ENV_DATA_DIR, "/tmp/wallet")]).unwrap();
        assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.api_token, None);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/wallet"));
        assert_eq!(config.user_scope, UserScope::local());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            (ENV_REGISTRY_URL, "https://registry.example/api"),
            (ENV_REQUEST_TIMEOUT_SECS, "30"),
            (ENV_API_TOKEN, "secret"),
            (ENV_DATA_DIR, "/srv/wallet"),
            (ENV_USER, "maria@esuda.edu.br"),
        ])
        .unwrap();
        assert_eq!(config.registry_url, "https://registry.example/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/wallet"));
        assert_eq!(config.user_scope.as_str(), "maria@esuda.edu.br");
    }

    #[test]
    fn blank_values_take_defaults() {
        let config = config_from(&[
            (ENV_DATA_DIR, "/tmp/wallet"),
            (ENV_API_TOKEN, "  "),
            (ENV_USER, ""),
        ])
        .unwrap();
        assert_eq!(config.api_token, None);
        assert_eq!(config.user_scope, UserScope::local());
    }

    #[test]
    fn rejects_zero_or_garbage_timeout() {
        for raw in ["0", "-3", "soon"] {
            let err = config_from(&[(ENV_DATA_DIR, "/tmp"), (ENV_REQUEST_TIMEOUT_SECS, raw)])
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    var: ENV_REQUEST_TIMEOUT_SECS,
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_non_http_registry() {
        let err = config_from(&[(ENV_DATA_DIR, "/tmp"), (ENV_REGISTRY_URL, "ftp://x")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_REGISTRY_URL, .. }));
    }

    #[test]
    fn rejects_unsafe_user_scope() {
        let err = config_from(&[(ENV_DATA_DIR, "/tmp"), (ENV_USER, "../etc")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUser(_)));
    }

    #[test]
    fn profiles_dir_under_data_dir() {
        let profiles = profiles_dir(std::path::Path::new("/srv/wallet"));
        assert_eq!(profiles, PathBuf::from("/srv/wallet/profiles"));
    }

    #[test]
    fn app_name_is_docwallet() {
        assert_eq!(APP_NAME, "DocWallet");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
