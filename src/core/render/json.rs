use serde::Serialize;

use crate::core::formatter::round_percent;
use crate::core::models::report::{AggregatedCosts, DailyCost};
use crate::core::providers::Provider;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPeriod {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub provider: Provider,
    pub project_id: String,
    pub organization_id: String,
    pub billing_period: BillingPeriod,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_cost: f64,
    pub billing_days: usize,
    pub average_daily_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemShare {
    pub line_item: String,
    pub cost: f64,
    /// Nearest whole percentage of the total.
    pub percentage: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: String,
    pub total: f64,
}

/// Structured form of the JSON report, also used as the webhook body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub costs_by_line_item: Vec<LineItemShare>,
    pub daily_breakdown: Vec<DailyCost>,
    pub daily_totals: Vec<DailyTotal>,
}

pub fn report(aggregated: &AggregatedCosts, org_id: &str, provider: Provider) -> JsonReport {
    JsonReport {
        metadata: ReportMetadata {
            provider,
            project_id: aggregated.project_id.clone(),
            organization_id: org_id.to_string(),
            billing_period: BillingPeriod {
                start_date: aggregated.start_date.clone(),
                end_date: aggregated.end_date.clone(),
            },
        },
        summary: ReportSummary {
            total_cost: aggregated.total_cost,
            billing_days: aggregated.billing_days,
            average_daily_cost: aggregated.average_daily_cost,
        },
        costs_by_line_item: aggregated
            .line_items_by_cost()
            .into_iter()
            .map(|(line_item, cost)| LineItemShare {
                line_item: line_item.to_string(),
                cost,
                percentage: round_percent(aggregated.percentage_of_total(cost)),
            })
            .collect(),
        daily_breakdown: aggregated.daily_costs.clone(),
        daily_totals: aggregated
            .totals_by_date()
            .into_iter()
            .map(|(date, total)| DailyTotal {
                date: date.to_string(),
                total,
            })
            .collect(),
    }
}

/// Pretty-printed JSON report.
pub fn render(
    aggregated: &AggregatedCosts,
    org_id: &str,
    provider: Provider,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&report(aggregated, org_id, provider))
}
