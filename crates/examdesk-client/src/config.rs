//! Client configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::{UnitApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Top-level examdesk configuration.
///
/// Note: Custom Debug impl masks the API token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExamdeskConfig {
    /// Root URL of the backend REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Grade used when a command needs one and none was given.
    #[serde(default)]
    pub default_grade: Option<u32>,
}

impl std::fmt::Debug for ExamdeskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamdeskConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("default_grade", &self.default_grade)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ExamdeskConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            api_token: None,
            default_grade: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through as-is, never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examdesk.toml` in the current directory
/// 2. `~/.config/examdesk/config.toml`
///
/// Environment variable overrides: `EXAMDESK_BASE_URL`, `EXAMDESK_API_TOKEN`.
pub fn load_config() -> Result<ExamdeskConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamdeskConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examdesk.toml");
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
            toml::from_str::<ExamdeskConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamdeskConfig::default(),
    };

    if let Ok(url) = std::env::var("EXAMDESK_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(token) = std::env::var("EXAMDESK_API_TOKEN") {
        config.api_token = Some(token);
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.api_token = config
        .api_token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examdesk"))
}

/// Create an HTTP client from the configuration.
pub fn create_client(config: &ExamdeskConfig) -> Result<UnitApiClient> {
    UnitApiClient::new(
        &config.base_url,
        config.api_token.clone(),
        config.timeout_secs,
    )
    .with_context(|| format!("failed to create client for {}", config.base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EXAMDESK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EXAMDESK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EXAMDESK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_vars"), "no_vars");
        std::env::remove_var("_EXAMDESK_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_expanded_again() {
        std::env::set_var("_EXAMDESK_SELF_REF", "${_EXAMDESK_SELF_REF}");
        std::env::set_var("_EXAMDESK_NESTED", "x${_EXAMDESK_SELF_REF}y");
        assert_eq!(
            resolve_env_vars("${_EXAMDESK_SELF_REF}"),
            "${_EXAMDESK_SELF_REF}"
        );
        assert_eq!(
            resolve_env_vars("a${_EXAMDESK_NESTED}b"),
            "ax${_EXAMDESK_SELF_REF}yb"
        );
        assert_eq!(resolve_env_vars("open ${never closed"), "open ${never closed");
        std::env::remove_var("_EXAMDESK_SELF_REF");
        std::env::remove_var("_EXAMDESK_NESTED");
    }

    #[test]
    fn default_config() {
        let config = ExamdeskConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let config: ExamdeskConfig = toml::from_str(
            r#"
base_url = "https://exam.school.example"
default_grade = 2
"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://exam.school.example");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_grade, Some(2));
    }

    #[test]
    fn load_explicit_file_resolves_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examdesk.toml");
        std::fs::write(
            &path,
            "base_url = \"http://10.0.0.5:9000\"\napi_token = \"${_EXAMDESK_TOKEN_FOR_TEST}\"\n",
        )
        .unwrap();

        std::env::set_var("_EXAMDESK_TOKEN_FOR_TEST", "abc123");
        let config = load_config_from(Some(&path)).unwrap();
        std::env::remove_var("_EXAMDESK_TOKEN_FOR_TEST");

        assert_eq!(config.api_token.as_deref(), Some("abc123"));
        assert!(format!("{config:?}").contains("***"));
        assert!(!format!("{config:?}").contains("abc123"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn factory_rejects_bad_url() {
        let config = ExamdeskConfig {
            base_url: "::not-a-url::".into(),
            ..Default::default()
        };
        assert!(create_client(&config).is_err());
    }
}
