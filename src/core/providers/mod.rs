pub mod claude;
pub mod fetch;
pub mod openai;

use serde::{Deserialize, Serialize};

use crate::core::config::ReportConfig;
use crate::core::models::cost::CostBucket;
use crate::core::providers::fetch::{fetch_all_pages, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
}

impl Provider {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "claude" | "anthropic" => Some(Self::Claude),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Claude => "Claude",
        }
    }

    pub fn report_title(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI API Usage Report",
            Self::Claude => "Claude API Usage Report",
        }
    }

    pub fn all() -> &'static [Provider] {
        &[Provider::OpenAi, Provider::Claude]
    }

    /// Environment variables a run against this provider needs.
    pub fn required_env(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_ADMIN_KEY", "OPENAI_ORG_ID", "OPENAI_PROJECT_ID"],
            Self::Claude => &["ANTHROPIC_ADMIN_KEY"],
        }
    }

    pub fn console_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://platform.openai.com/settings/organization/admin-keys",
            Self::Claude => "https://console.anthropic.com/settings/admin-keys",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Fetch every cost bucket for the configured provider and period.
pub async fn fetch_buckets(
    config: &ReportConfig,
    client: &reqwest::Client,
) -> Result<Vec<CostBucket>, FetchError> {
    match config {
        ReportConfig::OpenAi(c) => {
            fetch_all_pages(&openai::OpenAiFetcher::new(c.clone(), client.clone())).await
        }
        ReportConfig::Claude(c) => {
            fetch_all_pages(&claude::ClaudeFetcher::new(c.clone(), client.clone())).await
        }
    }
}
