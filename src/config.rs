//! Client configuration.
//!
//! Configuration is stored in `.helpdesk/config.yaml` and includes:
//! - Base URL of the helpdesk REST API
//! - The signed-in user's identity and access level
//! - Request timeout

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};
use crate::session::Session;
use crate::types::{AccessLevel, DEFAULT_API_URL, HELPDESK_DIR};

pub const API_URL_ENV: &str = "HELPDESK_API_URL";
pub const USER_EMAIL_ENV: &str = "HELPDESK_USER_EMAIL";
pub const ROOT_ENV: &str = "HELPDESK_ROOT";

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "request_timeout",
    "session.email",
    "session.name",
    "session.access_level",
    "session.user_id",
];

/// Root directory for client state; `HELPDESK_ROOT` overrides the default.
pub fn helpdesk_root() -> PathBuf {
    match env::var(ROOT_ENV) {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from(HELPDESK_DIR),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST API, e.g. `http://localhost:3001/api`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Signed-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        helpdesk_root().join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            HelpdeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HelpdeskError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            HelpdeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }

    /// API base URL, preferring the environment variable
    pub fn api_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            return url;
        }
        self.api_url.clone()
    }

    /// Session from config, with the e-mail optionally overridden by the environment
    pub fn session(&self) -> Result<Session> {
        let mut session = self
            .session
            .clone()
            .unwrap_or_else(|| Session::new(String::new(), AccessLevel::default()));

        if let Ok(email) = env::var(USER_EMAIL_ENV)
            && !email.is_empty()
        {
            session.email = email;
        }

        session.ensure_valid()?;
        Ok(session)
    }

    /// Per-request timeout. A hand-edited 0 is read as 1 second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }

    fn session_mut(&mut self) -> &mut Session {
        self.session
            .get_or_insert_with(|| Session::new(String::new(), AccessLevel::default()))
    }

    /// Read a value by dotted key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let session = self.session.as_ref();
        let value = match key {
            "api_url" => Some(self.api_url.clone()),
            "request_timeout" => Some(self.request_timeout.to_string()),
            "session.email" => session.map(|s| s.email.clone()),
            "session.name" => session.and_then(|s| s.name.clone()),
            "session.access_level" => session.map(|s| s.access_level.to_string()),
            "session.user_id" => session.and_then(|s| s.user_id).map(|id| id.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                url::Url::parse(value).map_err(|e| {
                    HelpdeskError::Config(format!("invalid api_url '{value}': {e}"))
                })?;
                self.api_url = value.to_string();
            }
            "request_timeout" => {
                self.request_timeout = value
                    .parse()
                    .ok()
                    .filter(|secs: &u64| *secs >= 1)
                    .ok_or_else(|| {
                        HelpdeskError::Config(format!(
                            "invalid value '{value}' for request_timeout. Expected seconds (at least 1)"
                        ))
                    })?;
            }
            "session.email" => self.session_mut().email = value.to_string(),
            "session.name" => self.session_mut().name = Some(value.to_string()),
            "session.access_level" => {
                let level: u8 = value.parse().map_err(|_| {
                    HelpdeskError::Config(format!(
                        "invalid value '{value}' for session.access_level. Expected 1-5"
                    ))
                })?;
                self.session_mut().access_level = AccessLevel::new(level)?;
            }
            "session.user_id" => {
                let id = value.parse().map_err(|_| {
                    HelpdeskError::Config(format!(
                        "invalid value '{value}' for session.user_id. Expected a number"
                    ))
                })?;
                self.session_mut().user_id = Some(id);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> HelpdeskError {
    HelpdeskError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:3001/api");
        assert!(config.session.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_set_and_get() {
        let mut config = Config::default();
        config.set("session.email", "gestor@empresa.com").unwrap();
        config.set("session.access_level", "3").unwrap();
        config.set("request_timeout", "5").unwrap();

        assert_eq!(
            config.get("session.email").unwrap().as_deref(),
            Some("gestor@empresa.com")
        );
        assert_eq!(config.get("session.access_level").unwrap().as_deref(), Some("3"));
        assert_eq!(config.get("session.name").unwrap(), None);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("session.access_level", "9").is_err());
        assert!(config.set("api_url", "not a url").is_err());
        assert!(config.set("unknown", "x").is_err());
        assert!(config.get("unknown").is_err());
    }

    #[test]
    fn test_request_timeout_must_be_positive() {
        let mut config = Config::default();
        let err = config.set("request_timeout", "0").unwrap_err();
        assert!(err.to_string().contains("at least 1"));
        assert!(config.set("request_timeout", "-3").is_err());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));

        let config: Config = serde_yaml_ng::from_str("request_timeout: 0\n").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.set("session.email", "ana@empresa.com").unwrap();
        config.set("session.name", "Ana").unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        let session = parsed.session.unwrap();
        assert_eq!(session.email, "ana@empresa.com");
        assert_eq!(session.name.as_deref(), Some("Ana"));
        assert_eq!(session.access_level, AccessLevel::USUARIO);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml_ng::from_str("session:\n  email: a@b.com\n").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, 30);
    }

    #[test]
    #[serial]
    fn test_helpdesk_root_default() {
        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe { env::remove_var(ROOT_ENV) };
        assert_eq!(Config::config_path(), PathBuf::from(".helpdesk/config.yaml"));
    }

    #[test]
    #[serial]
    fn test_helpdesk_root_with_env_var() {
        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe { env::set_var(ROOT_ENV, "/srv/helpdesk") };
        assert_eq!(Config::config_path(), PathBuf::from("/srv/helpdesk/config.yaml"));
        unsafe { env::remove_var(ROOT_ENV) };
    }

    #[test]
    #[serial]
    fn test_env_overrides_url_and_email() {
        let mut config = Config::default();
        config.set("session.email", "ana@empresa.com").unwrap();
        config.set("session.access_level", "2").unwrap();

        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe {
            env::set_var(API_URL_ENV, "http://helpdesk.interno:8080/api");
            env::set_var(USER_EMAIL_ENV, "bruno@empresa.com");
        }
        assert_eq!(config.api_url(), "http://helpdesk.interno:8080/api");
        let session = config.session().unwrap();
        assert_eq!(session.email, "bruno@empresa.com");
        assert_eq!(session.access_level, AccessLevel::ANALISTA);

        unsafe {
            env::remove_var(API_URL_ENV);
            env::remove_var(USER_EMAIL_ENV);
        }
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.session().unwrap().email, "ana@empresa.com");
    }

    #[test]
    #[serial]
    fn test_missing_session_is_a_config_error() {
        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe { env::remove_var(USER_EMAIL_ENV) };
        let err = Config::default().session().unwrap_err();
        assert!(matches!(err, HelpdeskError::Config(_)));
    }
}
