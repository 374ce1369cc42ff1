use std::collections::BTreeMap;

use crate::core::dates::utc_date_of;
use crate::core::models::cost::CostBucket;
use crate::core::models::report::{AggregatedCosts, DailyCost};

/// Fold fetched buckets into one report summary.
///
/// `daily_costs` keeps bucket-then-result order. `billing_days` counts
/// buckets, so a bucket without results still counts as a day.
pub fn aggregate(
    buckets: &[CostBucket],
    start_date: &str,
    end_date: &str,
    project_id: &str,
) -> AggregatedCosts {
    let mut total_cost = 0.0;
    let mut costs_by_line_item: BTreeMap<String, f64> = BTreeMap::new();
    let mut daily_costs: Vec<DailyCost> = Vec::new();

    for bucket in buckets {
        let date = utc_date_of(bucket.start_time);
        for result in &bucket.results {
            let cost = result.amount.value;
            total_cost += cost;
            *costs_by_line_item
                .entry(result.line_item.clone())
                .or_insert(0.0) += cost;
            daily_costs.push(DailyCost {
                date: date.clone(),
                line_item: result.line_item.clone(),
                cost,
            });
        }
    }

    let billing_days = buckets.len();
    let average_daily_cost = if billing_days == 0 {
        0.0
    } else {
        total_cost / billing_days as f64
    };

    AggregatedCosts {
        total_cost,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        project_id: project_id.to_string(),
        daily_costs,
        costs_by_line_item,
        billing_days,
        average_daily_cost,
    }
}
