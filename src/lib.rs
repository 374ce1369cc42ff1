//! Billing reports for the OpenAI and Anthropic cost APIs.
//!
//! A run fetches every cost bucket for a date range, folds them into an
//! [`AggregatedCosts`](core::models::report::AggregatedCosts) summary and
//! renders it as Markdown, CSV and JSON.
//!
//! ```rust,ignore
//! use costreport::core::{aggregate::aggregate, config::ReportConfig, dates::DateRange};
//! use costreport::core::providers::{fetch::build_client, fetch_buckets, Provider};
//! use costreport::core::render::render_all;
//!
//! let range = DateRange::parse("2024-01-01", "2024-02-01")?;
//! let config = ReportConfig::from_env(Provider::Claude, range.clone())?;
//! let buckets = fetch_buckets(&config, &build_client(30)?).await?;
//! let costs = aggregate(&buckets, &range.start_date(), &range.end_date(), config.project_id());
//! let reports = render_all(&costs, config.org_id(), config.provider())?;
//! ```

pub mod core;
