//! Basecamp connection configuration
//!
//! Configuration resolves from a JSON file when an explicit path is given,
//! otherwise from environment variables. Command-line overrides for the
//! project and todolist IDs apply after either source.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variables read by [`Config::from_env`].
pub const ENV_ACCOUNT_ID: &str = "BASECAMP_ACCOUNT_ID";
pub const ENV_ACCESS_TOKEN: &str = "BASECAMP_ACCESS_TOKEN";
pub const ENV_PROJECT_ID: &str = "BASECAMP_PROJECT_ID";
pub const ENV_TODOLIST_ID: &str = "BASECAMP_TODOLIST_ID";
pub const ENV_USER_AGENT: &str = "BASECAMP_USER_AGENT";

const DEFAULT_USER_AGENT: &str = "bctask (set BASECAMP_USER_AGENT)";
const DEFAULT_API_BASE_URL: &str = "https://3.basecampapi.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Missing required environment variables: {}\nPlease set them or pass --config.",
        vars.join(", ")
    )]
    MissingEnv { vars: Vec<String> },

    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Could not parse config file '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("IO error reading config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Connection settings for the Basecamp 3 API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub account_id: String,
    pub access_token: String,
    pub project_id: String,
    pub todolist_id: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All missing required variables are reported together in one error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let required = [
            ENV_ACCOUNT_ID,
            ENV_ACCESS_TOKEN,
            ENV_PROJECT_ID,
            ENV_TODOLIST_ID,
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|var| std::env::var(var).map_or(true, |v| v.is_empty()))
            .map(|var| (*var).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv { vars: missing });
        }

        Ok(Self {
            account_id: std::env::var(ENV_ACCOUNT_ID).unwrap_or_default(),
            access_token: std::env::var(ENV_ACCESS_TOKEN).unwrap_or_default(),
            project_id: std::env::var(ENV_PROJECT_ID).unwrap_or_default(),
            todolist_id: std::env::var(ENV_TODOLIST_ID).unwrap_or_default(),
            user_agent: std::env::var(ENV_USER_AGENT).unwrap_or_else(|_| default_user_agent()),
            api_base_url: default_api_base_url(),
        })
    }

    /// Load configuration from a JSON file with matching field names.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        serde_json::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Apply command-line overrides on top of the resolved configuration.
    pub fn apply_overrides(&mut self, project_id: Option<&str>, todolist_id: Option<&str>) {
        if let Some(id) = project_id {
            self.project_id = id.to_string();
        }
        if let Some(id) = todolist_id {
            self.todolist_id = id.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for var in [
            ENV_ACCOUNT_ID,
            ENV_ACCESS_TOKEN,
            ENV_PROJECT_ID,
            ENV_TODOLIST_ID,
            ENV_USER_AGENT,
        ] {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_reports_all_missing_vars() {
        clear_env();
        unsafe { std::env::set_var(ENV_ACCOUNT_ID, "12345") };

        let err = Config::from_env().unwrap_err();
        let ConfigError::MissingEnv { vars } = err else {
            panic!("expected MissingEnv, got {err:?}");
        };
        assert_eq!(vars, vec![ENV_ACCESS_TOKEN, ENV_PROJECT_ID, ENV_TODOLIST_ID]);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_complete() {
        clear_env();
        unsafe {
            std::env::set_var(ENV_ACCOUNT_ID, "12345");
            std::env::set_var(ENV_ACCESS_TOKEN, "token");
            std::env::set_var(ENV_PROJECT_ID, "99");
            std::env::set_var(ENV_TODOLIST_ID, "77");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.account_id, "12345");
        assert_eq!(config.project_id, "99");
        assert_eq!(config.todolist_id, "77");
        assert_eq!(config.api_base_url, "https://3.basecampapi.com");
        assert!(config.user_agent.starts_with("bctask"));
        clear_env();
    }

    #[test]
    fn test_from_file_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "account_id": "12345",
                "access_token": "secret",
                "project_id": "1",
                "todolist_id": "2"
            }"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.account_id, "12345");
        assert_eq!(config.api_base_url, "https://3.basecampapi.com");
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_from_file_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{broken").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config {
            account_id: "a".to_string(),
            access_token: "t".to_string(),
            project_id: "1".to_string(),
            todolist_id: "2".to_string(),
            user_agent: default_user_agent(),
            api_base_url: default_api_base_url(),
        };

        config.apply_overrides(Some("10"), None);
        assert_eq!(config.project_id, "10");
        assert_eq!(config.todolist_id, "2");

        config.apply_overrides(None, Some("20"));
        assert_eq!(config.project_id, "10");
        assert_eq!(config.todolist_id, "20");
    }
}
