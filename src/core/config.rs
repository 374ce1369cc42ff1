use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::dates::DateRange;
use crate::core::providers::fetch::validate_endpoint;
use crate::core::providers::Provider;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";

pub const OPENAI_ADMIN_KEY: &str = "OPENAI_ADMIN_KEY";
pub const OPENAI_ORG_ID: &str = "OPENAI_ORG_ID";
pub const OPENAI_PROJECT_ID: &str = "OPENAI_PROJECT_ID";
pub const ANTHROPIC_ADMIN_KEY: &str = "ANTHROPIC_ADMIN_KEY";
const OPENAI_API_BASE_VAR: &str = "OPENAI_API_BASE";
const ANTHROPIC_API_BASE_VAR: &str = "ANTHROPIC_API_BASE";

/// Project id shown in Claude reports; the cost report API has no projects.
pub const CLAUDE_PROJECT_PLACEHOLDER: &str = "default";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Unknown provider: '{0}' (expected 'openai' or 'claude')")]
    UnknownProvider(String),
    #[error("{name}: endpoint must use HTTPS, got: {url}")]
    InsecureEndpoint { name: String, url: String },
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub org_id: String,
    pub project_id: String,
    pub range: DateRange,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub range: DateRange,
    pub base_url: String,
}

/// Credentials and identifiers for one report run, keyed by provider.
#[derive(Debug, Clone)]
pub enum ReportConfig {
    OpenAi(OpenAiConfig),
    Claude(ClaudeConfig),
}

impl ReportConfig {
    /// Build a config from the process environment.
    pub fn from_env(provider: Provider, range: DateRange) -> Result<Self, ConfigError> {
        Self::from_lookup(provider, range, |name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Missing and empty variables are both reported as [`ConfigError::MissingEnv`].
    pub fn from_lookup<F>(provider: Provider, range: DateRange, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };
        let base_url = |name: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(url) => {
                    validate_endpoint(&url, name)?;
                    Ok(url.trim_end_matches('/').to_string())
                }
                None => Ok(default.to_string()),
            }
        };

        match provider {
            Provider::OpenAi => Ok(Self::OpenAi(OpenAiConfig {
                api_key: required(OPENAI_ADMIN_KEY)?,
                org_id: required(OPENAI_ORG_ID)?,
                project_id: required(OPENAI_PROJECT_ID)?,
                range,
                base_url: base_url(OPENAI_API_BASE_VAR, OPENAI_API_BASE)?,
            })),
            Provider::Claude => Ok(Self::Claude(ClaudeConfig {
                api_key: required(ANTHROPIC_ADMIN_KEY)?,
                range,
                base_url: base_url(ANTHROPIC_API_BASE_VAR, ANTHROPIC_API_BASE)?,
            })),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::OpenAi(_) => Provider::OpenAi,
            Self::Claude(_) => Provider::Claude,
        }
    }

    pub fn range(&self) -> &DateRange {
        match self {
            Self::OpenAi(c) => &c.range,
            Self::Claude(c) => &c.range,
        }
    }

    /// Project id echoed into reports.
    pub fn project_id(&self) -> &str {
        match self {
            Self::OpenAi(c) => &c.project_id,
            Self::Claude(_) => CLAUDE_PROJECT_PLACEHOLDER,
        }
    }

    /// Organization id shown in Markdown and JSON reports.
    pub fn org_id(&self) -> &str {
        match self {
            Self::OpenAi(c) => &c.org_id,
            Self::Claude(_) => "N/A",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    pub post_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_provider: default_provider(),
            post_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("costreport").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if Provider::from_id(&self.settings.default_provider).is_none() {
            issues.push(format!(
                "Invalid default_provider: '{}' (must be 'openai' or 'claude')",
                self.settings.default_provider
            ));
        }
        if let Some(url) = &self.settings.post_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                issues.push(format!("Invalid post_url: '{}' (must be an http(s) URL)", url));
            }
        }
        if self.settings.timeout_secs == 0 {
            issues.push("Invalid timeout_secs: must be greater than 0".to_string());
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn range() -> DateRange {
        DateRange::parse("2024-01-01", "2024-01-31").unwrap()
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn openai_config_reads_all_variables() {
        let lookup = lookup_from(&[
            (OPENAI_ADMIN_KEY, "sk-admin-test"),
            (OPENAI_ORG_ID, "org-123"),
            (OPENAI_PROJECT_ID, "proj_abc"),
        ]);
        let config = ReportConfig::from_lookup(Provider::OpenAi, range(), lookup).unwrap();
        match &config {
            ReportConfig::OpenAi(c) => {
                assert_eq!(c.api_key, "sk-admin-test");
                assert_eq!(c.org_id, "org-123");
                assert_eq!(c.project_id, "proj_abc");
                assert_eq!(c.base_url, OPENAI_API_BASE);
            }
            ReportConfig::Claude(_) => panic!("expected OpenAI config"),
        }
        assert_eq!(config.project_id(), "proj_abc");
        assert_eq!(config.org_id(), "org-123");
        assert_eq!(config.provider(), Provider::OpenAi);
    }

    #[test]
    fn openai_config_reports_first_missing_variable() {
        let lookup = lookup_from(&[(OPENAI_ADMIN_KEY, "sk-admin-test")]);
        let err = ReportConfig::from_lookup(Provider::OpenAi, range(), lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(OPENAI_ORG_ID)));
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        let lookup = lookup_from(&[(ANTHROPIC_ADMIN_KEY, "  ")]);
        let err = ReportConfig::from_lookup(Provider::Claude, range(), lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(ANTHROPIC_ADMIN_KEY)));
    }

    #[test]
    fn claude_config_uses_placeholder_project() {
        let lookup = lookup_from(&[(ANTHROPIC_ADMIN_KEY, "sk-ant-admin-test")]);
        let config = ReportConfig::from_lookup(Provider::Claude, range(), lookup).unwrap();
        assert_eq!(config.provider(), Provider::Claude);
        assert_eq!(config.project_id(), "default");
        assert_eq!(config.range().start_date(), "2024-01-01");
    }

    #[test]
    fn base_url_override_must_be_https() {
        let lookup = lookup_from(&[
            (ANTHROPIC_ADMIN_KEY, "sk-ant-admin-test"),
            (ANTHROPIC_API_BASE_VAR, "http://evil.example.com"),
        ]);
        let err = ReportConfig::from_lookup(Provider::Claude, range(), lookup).unwrap_err();
        assert!(err.to_string().contains("must use HTTPS"));
    }

    #[test]
    fn base_url_override_trims_trailing_slash() {
        let lookup = lookup_from(&[
            (ANTHROPIC_ADMIN_KEY, "sk-ant-admin-test"),
            (ANTHROPIC_API_BASE_VAR, "https://proxy.example.com/v1/"),
        ]);
        match ReportConfig::from_lookup(Provider::Claude, range(), lookup).unwrap() {
            ReportConfig::Claude(c) => assert_eq!(c.base_url, "https://proxy.example.com/v1"),
            ReportConfig::OpenAi(_) => panic!("expected Claude config"),
        }
    }

    #[test]
    fn default_settings_are_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_settings_values() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, PathBuf::from("reports"));
        assert_eq!(settings.default_provider, "openai");
        assert!(settings.post_url.is_none());
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn validate_catches_invalid_provider() {
        let mut config = AppConfig::default();
        config.settings.default_provider = "gemini".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_provider")));
    }

    #[test]
    fn validate_catches_invalid_post_url() {
        let mut config = AppConfig::default();
        config.settings.post_url = Some("ftp://example.com".to_string());
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("post_url")));
    }

    #[test]
    fn parse_settings_toml() {
        let toml = r#"
[settings]
output_dir = "/var/reports"
default_provider = "claude"
post_url = "https://hooks.example.com/billing"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.output_dir, PathBuf::from("/var/reports"));
        assert_eq!(config.settings.default_provider, "claude");
        assert_eq!(
            config.settings.post_url.as_deref(),
            Some("https://hooks.example.com/billing")
        );
        assert_eq!(config.settings.timeout_secs, 30);
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.default_provider, "openai");
        assert_eq!(config.settings.output_dir, PathBuf::from("reports"));
    }
}
