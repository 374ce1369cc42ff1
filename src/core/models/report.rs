use serde::Serialize;
use std::collections::BTreeMap;

/// One cost record per fetched result, dated by its bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCost {
    pub date: String,
    pub line_item: String,
    pub cost: f64,
}

/// Summary of one report run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCosts {
    pub total_cost: f64,
    pub start_date: String,
    pub end_date: String,
    pub project_id: String,
    pub daily_costs: Vec<DailyCost>,
    pub costs_by_line_item: BTreeMap<String, f64>,
    /// Number of buckets, not distinct calendar dates.
    pub billing_days: usize,
    pub average_daily_cost: f64,
}

impl AggregatedCosts {
    pub fn has_line_items(&self) -> bool {
        !self.costs_by_line_item.is_empty()
    }

    /// Line items ordered by descending cost; ties keep map order.
    pub fn line_items_by_cost(&self) -> Vec<(&str, f64)> {
        let mut items: Vec<(&str, f64)> = self
            .costs_by_line_item
            .iter()
            .map(|(name, cost)| (name.as_str(), *cost))
            .collect();
        items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        items
    }

    /// Daily records summed per date, ascending by date string.
    pub fn totals_by_date(&self) -> Vec<(&str, f64)> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for record in &self.daily_costs {
            *totals.entry(record.date.as_str()).or_insert(0.0) += record.cost;
        }
        totals.into_iter().collect()
    }

    /// Share of the total in percent, `0.0` when the total is zero.
    pub fn percentage_of_total(&self, cost: f64) -> f64 {
        if self.total_cost == 0.0 {
            0.0
        } else {
            cost / self.total_cost * 100.0
        }
    }
}
