use chrono::{DateTime, Utc};

use crate::core::formatter::{
    format_billing_period, format_percent, format_timestamp, format_usd, format_usd_total,
};
use crate::core::models::report::AggregatedCosts;
use crate::core::providers::Provider;

/// Render the Markdown report, stamped with the current time.
pub fn render(aggregated: &AggregatedCosts, org_id: &str, provider: Provider) -> String {
    render_at(aggregated, org_id, provider, Utc::now())
}

/// Render the Markdown report with an explicit generation time.
///
/// Layout:
/// ```text
/// # OpenAI API Usage Report
///
/// - **Billing Period:** January 1 - January 31, 2024
/// - **Project ID:** proj_abc
/// - **Organization ID:** org-123
/// - **Generated:** 2024-02-01T08:00:00Z
///
/// ## Summary
/// ...
/// ```
pub fn render_at(
    aggregated: &AggregatedCosts,
    org_id: &str,
    provider: Provider,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", provider.report_title()));
    lines.push(String::new());
    lines.push(format!(
        "- **Billing Period:** {}",
        format_billing_period(&aggregated.start_date, &aggregated.end_date)
    ));
    lines.push(format!("- **Project ID:** {}", aggregated.project_id));
    lines.push(format!("- **Organization ID:** {}", org_id));
    lines.push(format!("- **Generated:** {}", format_timestamp(&generated_at)));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push(format!("- **Total Cost:** {}", format_usd_total(aggregated.total_cost)));
    lines.push(format!("- **Billing Days:** {}", aggregated.billing_days));
    lines.push(format!(
        "- **Average Daily Cost:** {}",
        format_usd_total(aggregated.average_daily_cost)
    ));
    lines.push(String::new());

    if !aggregated.has_line_items() {
        lines.push("No usage data for this period.".to_string());
        return finish(lines);
    }

    lines.push("## Cost by Model/Service".to_string());
    lines.push(String::new());
    lines.push("| Model/Service | Cost | Percentage |".to_string());
    lines.push("|---------------|------|------------|".to_string());
    for (line_item, cost) in aggregated.line_items_by_cost() {
        lines.push(format!(
            "| {} | {} | {} |",
            escape_cell(line_item),
            format_usd(cost),
            format_percent(aggregated.percentage_of_total(cost))
        ));
    }
    lines.push(String::new());

    lines.push("## Daily Usage Breakdown".to_string());
    lines.push(String::new());
    lines.push("| Date | Model/Service | Cost |".to_string());
    lines.push("|------|---------------|------|".to_string());
    for record in &aggregated.daily_costs {
        lines.push(format!(
            "| {} | {} | {} |",
            record.date,
            escape_cell(&record.line_item),
            format_usd(record.cost)
        ));
    }
    lines.push(String::new());

    lines.push("## Total by Day".to_string());
    lines.push(String::new());
    lines.push("| Date | Total Cost |".to_string());
    lines.push("|------|------------|".to_string());
    for (date, total) in aggregated.totals_by_date() {
        lines.push(format!("| {} | {} |", date, format_usd(total)));
    }

    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

// Pipes would split a table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
