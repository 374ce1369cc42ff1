use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::config::ClaudeConfig;
use crate::core::dates::to_rfc3339;
use crate::core::models::cost::{deserialize_amount, Amount, CostBucket, CostResult, UNKNOWN_LINE_ITEM};
use crate::core::providers::fetch::{next_cursor, read_page, CostSource, FetchError, Page};

const COST_REPORT_PATH: &str = "/organizations/cost_report";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PAGE_LIMIT: u32 = 31;

#[derive(Deserialize)]
struct ClaudeCostResultRaw {
    /// Cost in cents, usually sent as a decimal string.
    #[serde(deserialize_with = "deserialize_amount")]
    amount: f64,
    currency: Option<String>,
    description: Option<String>,
    model: Option<String>,
    cost_type: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeBucketRaw {
    starting_at: String,
    ending_at: String,
    #[serde(default)]
    results: Vec<ClaudeCostResultRaw>,
}

fn parse_timestamp(text: &str) -> Result<i64, FetchError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.timestamp())
        .map_err(|_| FetchError::InvalidTimestamp(text.to_string()))
}

/// Label priority: description, then "model cost_type" (skipping blanks), then "unknown".
fn line_item_label(description: Option<String>, model: Option<&str>, cost_type: Option<&str>) -> String {
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        return description;
    }
    let joined = [model, cost_type]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        UNKNOWN_LINE_ITEM.to_string()
    } else {
        joined
    }
}

fn normalize_result(raw: ClaudeCostResultRaw) -> CostResult {
    let line_item = line_item_label(raw.description, raw.model.as_deref(), raw.cost_type.as_deref());
    let amount = Amount {
        value: raw.amount / 100.0,
        currency: raw.currency.unwrap_or_else(|| "USD".to_string()),
    };
    CostResult::new(amount, Some(line_item), None)
}

fn normalize_bucket(raw: ClaudeBucketRaw) -> Result<CostBucket, FetchError> {
    Ok(CostBucket {
        start_time: parse_timestamp(&raw.starting_at)?,
        end_time: parse_timestamp(&raw.ending_at)?,
        results: raw.results.into_iter().map(normalize_result).collect(),
    })
}

/// Organization cost report, grouped by description.
#[derive(Debug, Clone)]
pub struct ClaudeFetcher {
    config: ClaudeConfig,
    client: reqwest::Client,
}

impl ClaudeFetcher {
    pub fn new(config: ClaudeConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn query(&self, page: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("starting_at", to_rfc3339(&self.config.range.start)),
            ("ending_at", to_rfc3339(&self.config.range.end)),
            ("bucket_width", "1d".to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("group_by[]", "description".to_string()),
        ];
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

#[async_trait]
impl CostSource for ClaudeFetcher {
    fn name(&self) -> &'static str {
        "Claude"
    }

    #[instrument(skip(self), fields(provider = "claude"))]
    async fn fetch_page(&self, page: Option<&str>) -> Result<(Vec<CostBucket>, Option<String>), FetchError> {
        let url = format!("{}{}", self.config.base_url, COST_REPORT_PATH);
        debug!(url = %url, "Making Anthropic API request");

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Accept", "application/json")
            .query(&self.query(page))
            .send()
            .await?;

        let page: Page<ClaudeBucketRaw> = read_page(response, self.name()).await?;
        let next = next_cursor(&page);
        let buckets = page
            .data
            .into_iter()
            .map(normalize_bucket)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((buckets, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dates::DateRange;
    use crate::core::providers::fetch::fetch_all_pages;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(base_url: String) -> ClaudeFetcher {
        let config = ClaudeConfig {
            api_key: "sk-ant-admin-test".into(),
            range: DateRange::parse("2024-01-01", "2024-01-03").unwrap(),
            base_url,
        };
        ClaudeFetcher::new(config, reqwest::Client::new())
    }

    fn raw_result(amount: &str, description: Option<&str>, model: Option<&str>, cost_type: Option<&str>) -> ClaudeCostResultRaw {
        let value = json!({
            "amount": amount,
            "currency": "USD",
            "description": description,
            "model": model,
            "cost_type": cost_type,
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn amount_in_cents_becomes_dollars() {
        let result = normalize_result(raw_result("123.45", Some("Claude Opus"), None, None));
        assert!((result.amount.value - 1.2345).abs() < 1e-12);
        assert_eq!(result.amount.currency, "USD");
        assert!(result.project_id.is_none());
    }

    #[test]
    fn numeric_amount_is_tolerated() {
        let raw: ClaudeCostResultRaw = serde_json::from_value(json!({ "amount": 250 })).unwrap();
        let result = normalize_result(raw);
        assert!((result.amount.value - 2.5).abs() < 1e-12);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let parsed = serde_json::from_value::<ClaudeCostResultRaw>(json!({ "amount": "twelve" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn description_wins() {
        let result = normalize_result(raw_result("1", Some("Claude 3 Opus Usage"), Some("claude-3-opus"), Some("tokens")));
        assert_eq!(result.line_item, "Claude 3 Opus Usage");
    }

    #[test]
    fn model_and_cost_type_are_joined() {
        let result = normalize_result(raw_result("1", None, Some("claude-3-opus"), Some("tokens")));
        assert_eq!(result.line_item, "claude-3-opus tokens");
    }

    #[test]
    fn single_field_fallbacks() {
        assert_eq!(line_item_label(None, Some("claude-3-opus"), None), "claude-3-opus");
        assert_eq!(line_item_label(None, None, Some("web_search")), "web_search");
        assert_eq!(line_item_label(None, Some(""), Some("tokens")), "tokens");
    }

    #[test]
    fn all_fields_missing_is_unknown() {
        let result = normalize_result(raw_result("1", None, None, None));
        assert_eq!(result.line_item, "unknown");
    }

    #[test]
    fn bucket_timestamps_become_unix_seconds() {
        let raw: ClaudeBucketRaw = serde_json::from_value(json!({
            "starting_at": "2024-01-01T00:00:00Z",
            "ending_at": "2024-01-02T00:00:00Z",
            "results": []
        }))
        .unwrap();
        let bucket = normalize_bucket(raw).unwrap();
        assert_eq!(bucket.start_time, 1_704_067_200);
        assert_eq!(bucket.end_time, 1_704_153_600);
        assert!(bucket.results.is_empty());
    }

    #[test]
    fn bad_bucket_timestamp_is_an_error() {
        let raw: ClaudeBucketRaw = serde_json::from_value(json!({
            "starting_at": "yesterday",
            "ending_at": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        assert!(matches!(normalize_bucket(raw), Err(FetchError::InvalidTimestamp(_))));
    }

    #[test]
    fn query_uses_rfc3339_boundaries() {
        let fetcher = fetcher("https://api.anthropic.com/v1".into());
        let params = fetcher.query(None);
        assert!(params.contains(&("starting_at", "2024-01-01T00:00:00Z".to_string())));
        assert!(params.contains(&("ending_at", "2024-01-03T00:00:00Z".to_string())));
        assert!(params.contains(&("limit", "31".to_string())));
        assert!(params.contains(&("group_by[]", "description".to_string())));
        assert!(fetcher.query(Some("tok")).contains(&("page", "tok".to_string())));
    }

    #[tokio::test]
    async fn fetch_follows_next_page_and_normalizes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/organizations/cost_report"))
            .and(header("x-api-key", "sk-ant-admin-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(query_param("bucket_width", "1d"))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "starting_at": "2024-01-01T00:00:00Z",
                    "ending_at": "2024-01-02T00:00:00Z",
                    "results": [{ "amount": "300", "currency": "USD", "description": "Claude Sonnet" }]
                }],
                "has_more": true,
                "next_page": "cursor_abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/organizations/cost_report"))
            .and(query_param("page", "cursor_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "starting_at": "2024-01-02T00:00:00Z",
                    "ending_at": "2024-01-03T00:00:00Z",
                    "results": [{ "amount": "50.5", "currency": "USD", "description": null, "model": "claude-3-haiku", "cost_type": "tokens" }]
                }],
                "has_more": false,
                "next_page": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let buckets = fetch_all_pages(&fetcher(server.uri())).await.unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start_time, 1_704_067_200);
        assert_eq!(buckets[0].results[0].line_item, "Claude Sonnet");
        assert!((buckets[0].results[0].amount.value - 3.0).abs() < 1e-12);
        assert_eq!(buckets[1].results[0].line_item, "claude-3-haiku tokens");
        assert!((buckets[1].results[0].amount.value - 0.505).abs() < 1e-12);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn api_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations/cost_report"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "type": "error",
                "error": { "type": "permission_error", "message": "admin key required" }
            })))
            .mount(&server)
            .await;

        let err = fetch_all_pages(&fetcher(server.uri())).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 403"));
        assert!(err.to_string().contains("admin key required"));
    }
}
