use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::config::OpenAiConfig;
use crate::core::dates::to_unix_seconds;
use crate::core::models::cost::{Amount, CostBucket, CostResult};
use crate::core::providers::fetch::{next_cursor, read_page, CostSource, FetchError, Page};

const COSTS_PATH: &str = "/organization/costs";
const PAGE_LIMIT: u32 = 180;

#[derive(Deserialize)]
struct OpenAiCostResult {
    amount: Amount,
    line_item: Option<String>,
    project_id: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiBucket {
    start_time: i64,
    end_time: i64,
    #[serde(default)]
    results: Vec<OpenAiCostResult>,
}

fn convert_bucket(bucket: OpenAiBucket) -> CostBucket {
    CostBucket {
        start_time: bucket.start_time,
        end_time: bucket.end_time,
        results: bucket
            .results
            .into_iter()
            .map(|r| CostResult::new(r.amount, r.line_item, r.project_id))
            .collect(),
    }
}

/// Organization costs endpoint, filtered to one project and grouped by line item.
#[derive(Debug, Clone)]
pub struct OpenAiFetcher {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiFetcher {
    pub fn new(config: OpenAiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn query(&self, page: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("start_time", to_unix_seconds(&self.config.range.start).to_string()),
            ("end_time", to_unix_seconds(&self.config.range.end).to_string()),
            ("project_ids[]", self.config.project_id.clone()),
            ("group_by[]", "line_item".to_string()),
            ("bucket_width", "1d".to_string()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

#[async_trait]
impl CostSource for OpenAiFetcher {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    #[instrument(skip(self), fields(provider = "openai"))]
    async fn fetch_page(&self, page: Option<&str>) -> Result<(Vec<CostBucket>, Option<String>), FetchError> {
        let url = format!("{}{}", self.config.base_url, COSTS_PATH);
        debug!(url = %url, "Making OpenAI API request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Organization", &self.config.org_id)
            .header("Accept", "application/json")
            .query(&self.query(page))
            .send()
            .await?;

        let page: Page<OpenAiBucket> = read_page(response, self.name()).await?;
        let next = next_cursor(&page);
        let buckets = page.data.into_iter().map(convert_bucket).collect();
        Ok((buckets, next))
    }
}
