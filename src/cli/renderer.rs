use colored::{control, Colorize};

use costreport::core::formatter::{format_billing_period, format_percent, format_usd};
use costreport::core::models::report::AggregatedCosts;
use costreport::core::providers::Provider;
use costreport::core::sink::ReportPaths;

/// Number of line items listed in the terminal summary.
const TOP_ITEMS: usize = 3;

/// Render the end-of-run summary printed to stdout.
///
/// Layout:
/// ```text
///  OpenAI (January 1 - January 31, 2024)
///   Total     $5.00
///   Days      1 ($5.00/day)
///   Top       gpt-4            $3.00  60.0%
///             gpt-3.5          $2.00  40.0%
///   Markdown  reports/openai/openai-costs-2024-01-01-to-2024-01-31.md
///   CSV       reports/openai/openai-costs-2024-01-01-to-2024-01-31.csv
///   JSON      reports/openai/openai-costs-2024-01-01-to-2024-01-31.json
/// ```
pub fn render_summary(
    provider: Provider,
    aggregated: &AggregatedCosts,
    paths: &ReportPaths,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    let header = format!(
        " {} ({})",
        provider.display_name(),
        format_billing_period(&aggregated.start_date, &aggregated.end_date)
    );
    lines.push(header.bold().to_string());

    lines.push(format!(
        "  {}     {}",
        "Total".cyan(),
        format_usd(aggregated.total_cost).green()
    ));
    lines.push(format!(
        "  {}      {} ({}/day)",
        "Days".cyan(),
        aggregated.billing_days,
        format_usd(aggregated.average_daily_cost)
    ));

    let items = aggregated.line_items_by_cost();
    if items.is_empty() {
        lines.push(format!("  {}       {}", "Top".cyan(), "no usage".dimmed()));
    }
    for (i, (line_item, cost)) in items.iter().take(TOP_ITEMS).enumerate() {
        let label = if i == 0 { "Top".cyan().to_string() } else { "   ".to_string() };
        lines.push(format!(
            "  {}       {:<16} {:>8}  {}",
            label,
            line_item,
            format_usd(*cost),
            format_percent(aggregated.percentage_of_total(*cost)).dimmed()
        ));
    }

    for (label, path) in [
        ("Markdown", &paths.markdown),
        ("CSV     ", &paths.csv),
        ("JSON    ", &paths.json),
    ] {
        lines.push(format!("  {}  {}", label.cyan(), path.display()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use costreport::core::models::report::DailyCost;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn costs() -> AggregatedCosts {
        let mut by_item = BTreeMap::new();
        by_item.insert("gpt-4".to_string(), 3.0);
        by_item.insert("gpt-3.5".to_string(), 2.0);
        AggregatedCosts {
            total_cost: 5.0,
            start_date: "2024-01-01".into(),
            end_date: "2024-01-31".into(),
            project_id: "proj_abc".into(),
            daily_costs: vec![DailyCost {
                date: "2024-01-01".into(),
                line_item: "gpt-4".into(),
                cost: 3.0,
            }],
            costs_by_line_item: by_item,
            billing_days: 1,
            average_daily_cost: 5.0,
        }
    }

    fn paths() -> ReportPaths {
        ReportPaths {
            markdown: PathBuf::from("reports/openai/a.md"),
            csv: PathBuf::from("reports/openai/a.csv"),
            json: PathBuf::from("reports/openai/a.json"),
        }
    }

    #[test]
    fn summary_contains_totals_and_paths() {
        let output = render_summary(Provider::OpenAi, &costs(), &paths(), false);
        assert!(output.contains("OpenAI (January 1 - January 31, 2024)"));
        assert!(output.contains("$5.00"));
        assert!(output.contains("1 ($5.00/day)"));
        assert!(output.contains("gpt-4"));
        assert!(output.contains("60.0%"));
        assert!(output.contains("reports/openai/a.csv"));
    }

    #[test]
    fn summary_without_usage() {
        let mut empty = costs();
        empty.costs_by_line_item.clear();
        let output = render_summary(Provider::Claude, &empty, &paths(), false);
        assert!(output.contains("no usage"));
    }

    #[test]
    fn render_no_ansi_when_color_false() {
        let output = render_summary(Provider::OpenAi, &costs(), &paths(), false);
        assert!(!output.contains('\x1b'), "output should not contain ANSI codes");
    }
}
