use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

pub const DEVELOPMENT_API_URL: &str = "https://localhost:7073/api";
pub const PRODUCTION_API_URL: &str = "https://PersonManager.somee.com/api";

lazy_static! {
    static ref ENV_VAR: Regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap();
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_api_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_API_URL,
            Environment::Production => PRODUCTION_API_URL,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    /// Root the `/v1` and `/v2` paths are appended to
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Development backends usually run with a self-signed certificate
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEVELOPMENT_API_URL)
            .trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Directory holding the persisted token and principal
    #[serde(default = "default_session_dir")]
    pub dir: PathBuf,
}

fn default_session_dir() -> PathBuf {
    PathBuf::from(".session")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            AppError::Configuration(msg) => {
                AppError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let expanded = Self::expand_env_vars(content)?;

        let mut config: AppConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| AppError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.apply_environment_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Configuration used when no file is present
    pub fn default_config() -> Self {
        let mut config = AppConfig {
            environment: Environment::default(),
            api: ApiConfig::default(),
            session: SessionConfig::default(),
        };
        config.apply_environment_defaults();
        config
    }

    fn apply_environment_defaults(&mut self) {
        if self.api.base_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            self.api.base_url = Some(self.environment.default_api_url().to_string());
        }
    }

    /// Reject base URLs that are not absolute http(s) URLs
    pub fn validate(&self) -> AppResult<()> {
        let base_url = self.api.base_url();
        let parsed = url::Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid API base URL {}: {}", base_url, e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::Configuration(format!(
                "API base URL must use http or https: {}",
                base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut missing = None;

        let expanded = ENV_VAR.replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match (std::env::var(name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(AppError::Configuration(format!(
                "Environment variable {} not found and no default provided",
                name
            ))),
            None => Ok(expanded.into_owned()),
        }
    }
}
