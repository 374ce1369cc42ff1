use serde::{Deserialize, Deserializer, Serialize};

pub const UNKNOWN_LINE_ITEM: &str = "unknown";

/// A numeric value that the vendor may send as a JSON number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Coerce a number or numeric string to a finite `f64`.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) if value.is_finite() => Ok(value),
        NumberOrString::Number(value) => Err(serde::de::Error::custom(format!(
            "amount is not finite: {}",
            value
        ))),
        NumberOrString::Text(text) => parse_amount(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("amount is not a number: '{}'", text))
        }),
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// Cost in major currency units (dollars).
    #[serde(deserialize_with = "deserialize_amount")]
    pub value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Amount {
    pub fn usd(value: f64) -> Self {
        Self {
            value,
            currency: default_currency(),
        }
    }
}

/// One priced line item within a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    pub amount: Amount,
    /// Display label for the model, service or category. Never empty.
    pub line_item: String,
    pub project_id: Option<String>,
}

impl CostResult {
    pub fn new(amount: Amount, line_item: Option<String>, project_id: Option<String>) -> Self {
        Self {
            amount,
            line_item: line_item
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_LINE_ITEM.to_string()),
            project_id,
        }
    }
}

/// One time-bounded window of cost data, in unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBucket {
    pub start_time: i64,
    pub end_time: i64,
    pub results: Vec<CostResult>,
}
