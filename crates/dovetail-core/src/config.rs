//! Configuration file loading and validation
//!
//! The server is configured by an optional `dovetail-mcp.yaml` file. Command
//! line flags and environment variables are layered on top by the binary
//! through the `with_*` overrides, so no component reads process state on its
//! own.

use crate::error::{Error, Result};
use crate::types::RetryPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["dovetail-mcp.yaml", "dovetail-mcp.yml"];

/// Default Dovetail API base URL
pub const DEFAULT_BASE_URL: &str = "https://dovetail.com/api/v1";

/// Complete server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DovetailConfig {
    /// Dovetail API connection settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Retry policy applied to every API request
    #[serde(default)]
    pub retry: RetryPolicy,

    /// File the configuration was loaded from, if any
    #[serde(skip)]
    pub config_path: Option<Utf8PathBuf>,
}

/// Dovetail API connection settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiSettings {
    /// Base URL of the REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token attached to every request
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!(
        "dovetail-mcp/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

impl DovetailConfig {
    /// Load configuration from the specified path or search for it
    ///
    /// An explicit path must exist. Without one, the working directory is
    /// searched and defaults are used when no file is found.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_file(p),
            None => Self::discover(Utf8Path::new(".")),
        }
    }

    /// Search `dir` for a configuration file, falling back to defaults
    pub fn discover(dir: &Utf8Path) -> Result<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::load_file(&candidate);
            }
        }

        debug!(dir = %dir, "No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn load_file(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        debug!(path = %path, "Loading configuration file");

        let mut config: DovetailConfig = if content.trim().is_empty() {
            DovetailConfig::default()
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        config.config_path = Some(path.to_owned());

        Ok(config)
    }

    /// Override the API token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.api.token = token;
        }
        self
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.api.base_url = url;
        }
        self
    }

    /// Override the retry count
    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        if let Some(n) = max_retries {
            self.retry.max_retries = n;
        }
        self
    }

    /// Check that the configuration can be used to reach the API
    pub fn validate(&self) -> Result<()> {
        match self.api.token.as_deref() {
            Some(token) if !token.trim().is_empty() => {}
            _ => return Err(Error::missing_field("api.token (DOVETAIL_API_TOKEN)")),
        }

        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::invalid_config(format!("api.base-url '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_config(format!(
                "api.base-url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::invalid_config("api.timeout-secs must be positive"));
        }

        Ok(())
    }

    /// The API token, if one is configured
    pub fn token(&self) -> Option<&str> {
        self.api.token.as_deref()
    }
}
