use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::ConfigError;
use crate::core::models::cost::CostBucket;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} API returned HTTP {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{0} rejected the admin API key (HTTP 401)")]
    Unauthorized(&'static str),
    #[error("Failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid bucket timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// One page of a vendor's paginated cost listing.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    pub next_page: Option<String>,
}

/// A paginated cost endpoint that yields canonical buckets one page at a time.
#[async_trait]
pub trait CostSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch one page; `page` is the cursor returned by the previous page.
    async fn fetch_page(&self, page: Option<&str>) -> Result<(Vec<CostBucket>, Option<String>), FetchError>;
}

/// Follow `next_page` cursors until the source reports no more pages.
///
/// Pages are requested one after another. Any failure discards the pages
/// already collected.
pub async fn fetch_all_pages<S: CostSource + ?Sized>(source: &S) -> Result<Vec<CostBucket>, FetchError> {
    let mut buckets = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let (page_buckets, next) = source.fetch_page(cursor.as_deref()).await?;
        pages += 1;
        debug!(
            provider = source.name(),
            page = pages,
            buckets = page_buckets.len(),
            "Fetched cost page"
        );
        buckets.extend(page_buckets);

        match next {
            Some(token) => cursor = Some(token),
            None => break,
        }
    }

    info!(provider = source.name(), pages, buckets = buckets.len(), "Fetched cost buckets");
    Ok(buckets)
}

/// Next cursor for a decoded page: `Some` only while the vendor reports more data.
pub fn next_cursor<T>(page: &Page<T>) -> Option<String> {
    if page.has_more {
        page.next_page.clone()
    } else {
        None
    }
}

/// Turn a vendor response into a decoded page or a typed error.
pub async fn read_page<T>(
    response: reqwest::Response,
    provider: &'static str,
) -> Result<Page<T>, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(FetchError::Unauthorized(provider));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Api {
            provider,
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| FetchError::Decode { provider, source })
}

/// Both vendors wrap failures as `{"error": {"message": ...}}`; fall back to the raw body.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.to_string())
}

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Base URL overrides must pass this before any credentials are sent to them.
pub fn validate_endpoint(url: &str, name: &str) -> Result<(), ConfigError> {
    if !url.starts_with("https://") {
        return Err(ConfigError::InsecureEndpoint {
            name: name.to_string(),
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Shared HTTP client with a per-request timeout.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("costreport/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}
