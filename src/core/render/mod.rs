pub mod csv;
pub mod json;
pub mod markdown;

use crate::core::models::report::AggregatedCosts;
use crate::core::providers::Provider;

/// All three report formats for one run.
#[derive(Debug, Clone)]
pub struct RenderedReports {
    pub markdown: String,
    pub csv: String,
    pub json: String,
}

pub fn render_all(
    aggregated: &AggregatedCosts,
    org_id: &str,
    provider: Provider,
) -> Result<RenderedReports, serde_json::Error> {
    Ok(RenderedReports {
        markdown: markdown::render(aggregated, org_id, provider),
        csv: csv::render(aggregated),
        json: json::render(aggregated, org_id, provider)?,
    })
}
