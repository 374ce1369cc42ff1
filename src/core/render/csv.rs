use crate::core::formatter::escape_csv_field;
use crate::core::models::report::{AggregatedCosts, DailyCost};

const HEADER: &str = "date,line_item,cost_usd,project_id";

/// Render daily records as CSV, sorted by date and then line item.
pub fn render(aggregated: &AggregatedCosts) -> String {
    let mut rows: Vec<&DailyCost> = aggregated.daily_costs.iter().collect();
    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.line_item.cmp(&b.line_item))
    });

    let project_id = escape_csv_field(&aggregated.project_id);
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(&format!(
            "{},{},{:.2},{}\n",
            row.date,
            escape_csv_field(&row.line_item),
            row.cost,
            project_id
        ));
    }
    csv
}
