//! Configuration loader for the homework status bot: app tunables come from
//! an optional YAML file, credentials from the environment.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variables holding the three required credentials.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub app: App,
}

/// App-level settings. Every field has a default so the YAML file is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    pub endpoint: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub max_backoff_secs: u64,
    pub log_file: Option<String>,
    pub log_stdout: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string(),
            poll_interval_secs: 600,
            request_timeout_secs: 30,
            max_backoff_secs: 3600,
            log_file: Some("main.log".to_string()),
            log_stdout: true,
        }
    }
}

/// The three opaque strings the bot cannot run without. Loaded once at
/// startup and threaded by reference into the components that need them.
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Read all three credentials from the environment. Returns every
    /// missing or empty variable name at once so the caller can report each
    /// before exiting. Performs no logging itself.
    pub fn from_env() -> Result<Self, ConfigError> {
        let read = |var: &'static str| -> Option<String> {
            std::env::var(var).ok().filter(|v| !v.trim().is_empty())
        };

        let practicum_token = read(PRACTICUM_TOKEN_VAR);
        let telegram_token = read(TELEGRAM_TOKEN_VAR);
        let chat_id = read(TELEGRAM_CHAT_ID_VAR);

        let mut missing = Vec::new();
        if practicum_token.is_none() {
            missing.push(PRACTICUM_TOKEN_VAR);
        }
        if telegram_token.is_none() {
            missing.push(TELEGRAM_TOKEN_VAR);
        }
        if chat_id.is_none() {
            missing.push(TELEGRAM_CHAT_ID_VAR);
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }

        Ok(Self {
            practicum_token: practicum_token.unwrap_or_default(),
            telegram_token: telegram_token.unwrap_or_default(),
            chat_id: chat_id.unwrap_or_default(),
        })
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory;
///   a missing default file yields built-in defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let default_path = Path::new("config.yaml");
    let (path, optional) = match path {
        Some(p) => (p, false),
        None => (default_path, true),
    };
    if optional && !path.exists() {
        let cfg = Config::default();
        validate(&cfg)?;
        return Ok(cfg);
    }
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid("app.endpoint must be non-empty"));
    }
    if cfg.app.poll_interval_secs == 0 {
        return Err(ConfigError::Invalid("app.poll_interval_secs must be > 0"));
    }
    if cfg.app.request_timeout_secs == 0 {
        return Err(ConfigError::Invalid("app.request_timeout_secs must be > 0"));
    }
    if cfg.app.max_backoff_secs < cfg.app.poll_interval_secs {
        return Err(ConfigError::Invalid(
            "app.max_backoff_secs must be >= app.poll_interval_secs",
        ));
    }
    Ok(())
}

/// Returns the example YAML content shipped with the repository.
pub fn example() -> &'static str {
    r#"app:
  endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/"
  poll_interval_secs: 600
  request_timeout_secs: 30
  max_backoff_secs: 3600
  log_file: "main.log"
  log_stdout: true
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.poll_interval_secs, 600);
        assert_eq!(cfg.app.log_file.as_deref(), Some("main.log"));
    }

    #[test]
    fn defaults_apply_when_fields_omitted() {
        let cfg: Config = serde_yaml::from_str("app:\n  poll_interval_secs: 60\n").unwrap();
        assert_eq!(cfg.app.poll_interval_secs, 60);
        assert_eq!(cfg.app.request_timeout_secs, 30);
        assert!(cfg.app.endpoint.contains("practicum.yandex.ru"));
    }

    #[test]
    fn invalid_poll_interval() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.poll_interval_secs = 0;
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("poll_interval_secs")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_backoff_below_interval() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.max_backoff_secs = 10;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.app.max_backoff_secs, 3600);
    }

    #[test]
    fn load_explicit_missing_file_fails() {
        let td = tempdir().unwrap();
        let p = td.path().join("nope.yaml");
        assert!(matches!(load(Some(&p)), Err(ConfigError::Io(_))));
    }

    #[test]
    fn credentials_debug_redacts_tokens() {
        let creds = Credentials {
            practicum_token: "secret-a".into(),
            telegram_token: "secret-b".into(),
            chat_id: "42".into(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("secret-a"));
        assert!(!rendered.contains("secret-b"));
        assert!(rendered.contains("42"));
    }
}
