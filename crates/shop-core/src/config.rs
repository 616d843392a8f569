//! Shell configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shop_auth::SessionEndpoints;
use shop_data::ClientConfig;

use crate::ShellError;

/// Environment variable overriding [`ShellConfig::api_base_url`].
pub const ENV_API_BASE_URL: &str = "SHOP_API_BASE_URL";
/// Environment variable overriding [`ShellConfig::origin`].
pub const ENV_ORIGIN: &str = "SHOP_ORIGIN";

/// Everything the shell needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Origin the shell is served from. Relative requests resolve against it.
    pub origin: String,
    /// API base URL. Unset means same-origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Timeout ceiling per request.
    pub timeout_ms: u64,
    /// Send cookies with every request.
    pub with_credentials: bool,
    /// Hard-redirect target on 401.
    pub login_path: String,
    /// Server-side logout endpoint.
    pub logout_path: String,
    /// Current-user endpoint.
    pub user_info_path: String,
    pub toast_duration_ms: u64,
    pub copy_feedback_ms: u64,
    /// Coalesce concurrent user fetches into one request.
    pub single_flight_user_fetch: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            api_base_url: None,
            timeout_ms: 30_000,
            with_credentials: true,
            login_path: "/login".to_string(),
            logout_path: "/auth/logout".to_string(),
            user_info_path: "/api/user/info".to_string(),
            toast_duration_ms: 2000,
            copy_feedback_ms: 2000,
            single_flight_user_fetch: false,
        }
    }
}

impl ShellConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ShellError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| ShellError::ConfigError(format!("{}: {}", path.display(), e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| ShellError::ConfigError(format!("{}: {}", path.display(), e)))
        }
    }

    /// Apply `SHOP_API_BASE_URL` / `SHOP_ORIGIN` from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    /// An empty base URL means same-origin.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = Some(base).filter(|b| !b.is_empty());
        }
        if let Some(origin) = lookup(ENV_ORIGIN).filter(|o| !o.is_empty()) {
            self.origin = origin;
        }
        self
    }

    /// Check the config is usable.
    pub fn validate(&self) -> Result<(), ShellError> {
        let is_http = |url: &str| url.starts_with("http://") || url.starts_with("https://");
        if !is_http(&self.origin) {
            return Err(ShellError::ConfigError(format!(
                "origin must be an http(s) URL: {}",
                self.origin
            )));
        }
        if let Some(base) = &self.api_base_url {
            if !is_http(base) && !base.starts_with('/') {
                return Err(ShellError::ConfigError(format!(
                    "api_base_url must be an http(s) URL or absolute path: {}",
                    base
                )));
            }
        }
        if self.timeout_ms == 0 {
            return Err(ShellError::ConfigError("timeout_ms must be positive".into()));
        }
        for (field, path) in [
            ("login_path", &self.login_path),
            ("logout_path", &self.logout_path),
            ("user_info_path", &self.user_info_path),
        ] {
            if !path.starts_with('/') {
                return Err(ShellError::ConfigError(format!(
                    "{} must start with '/': {}",
                    field, path
                )));
            }
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            with_credentials: self.with_credentials,
        }
    }

    pub fn session_endpoints(&self) -> SessionEndpoints {
        SessionEndpoints {
            user_info: self.user_info_path.clone(),
            logout: self.logout_path.clone(),
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}
