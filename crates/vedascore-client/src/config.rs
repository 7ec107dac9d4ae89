//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level vedascore configuration.
///
/// Note: Custom Debug impl masks the session cookie so it never ends up in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root, without a trailing `/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session cookie forwarded verbatim on every request.
    #[serde(default)]
    pub cookie: Option<String>,
    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// JSON file backing the local store.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Dashboard quiz refresh interval.
    #[serde(default = "default_quiz_refresh")]
    pub quiz_refresh_secs: u64,
    /// Analytics panel refresh interval.
    #[serde(default = "default_analytics_refresh")]
    pub analytics_refresh_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("cookie", &self.cookie.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("storage_path", &self.storage_path)
            .field("quiz_refresh_secs", &self.quiz_refresh_secs)
            .field("analytics_refresh_secs", &self.analytics_refresh_secs)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_storage_path() -> PathBuf {
    PathBuf::from("./.vedascore/local-storage.json")
}
fn default_quiz_refresh() -> u64 {
    30
}
fn default_analytics_refresh() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie: None,
            timeout_secs: default_timeout(),
            storage_path: default_storage_path(),
            quiz_refresh_secs: default_quiz_refresh(),
            analytics_refresh_secs: default_analytics_refresh(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `vedascore.toml` in the current directory
/// 2. `~/.config/vedascore/config.toml`
///
/// Environment variable overrides: `VEDASCORE_BASE_URL`, `VEDASCORE_COOKIE`.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("vedascore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    if let Ok(url) = std::env::var("VEDASCORE_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(cookie) = std::env::var("VEDASCORE_COOKIE") {
        config.cookie = Some(cookie);
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.cookie = config
        .cookie
        .as_deref()
        .map(resolve_env_vars)
        .filter(|c| !c.is_empty());

    config.validate()?;
    Ok(config)
}

/// Parse a config file body without touching the environment.
pub fn parse_config(content: &str) -> Result<ClientConfig> {
    Ok(toml::from_str::<ClientConfig>(content)?)
}

impl ClientConfig {
    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.quiz_refresh_secs == 0 || self.analytics_refresh_secs == 0 {
            anyhow::bail!("refresh intervals must be greater than zero");
        }
        Ok(())
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("vedascore"))
}

/// Starter config written by `vedascore init`.
pub const SAMPLE_CONFIG: &str = r#"# vedascore configuration

# Server root (the client appends /api/... paths)
base_url = "http://localhost:5000"

# Session cookie copied from a logged-in browser session
cookie = "session=${VEDASCORE_SESSION}"

timeout_secs = 30
storage_path = "./.vedascore/local-storage.json"

# Polling intervals for the student dashboard quiz and the analytics panel
quiz_refresh_secs = 30
analytics_refresh_secs = 60
"#;
