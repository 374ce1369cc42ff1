use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::output::OutputOptions;
use crate::cli::renderer;
use costreport::core::aggregate::aggregate;
use costreport::core::config::{AppConfig, ConfigError, ReportConfig};
use costreport::core::dates::DateRange;
use costreport::core::providers::fetch::build_client;
use costreport::core::providers::{fetch_buckets, Provider};
use costreport::core::render::render_all;
use costreport::core::sink::{post_json, write_reports};

/// Arguments of one report run, as given on the command line.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub start_date: String,
    pub end_date: String,
    pub provider: Option<String>,
    pub post_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

pub async fn run(args: ReportArgs, opts: &OutputOptions) -> Result<()> {
    let app_config = AppConfig::load().context("Failed to load settings")?;
    for issue in app_config.validate() {
        warn!(issue = %issue, "Ignoring invalid setting");
    }
    let settings = app_config.settings;

    let provider_id = args
        .provider
        .unwrap_or_else(|| settings.default_provider.clone());
    let provider =
        Provider::from_id(&provider_id).ok_or(ConfigError::UnknownProvider(provider_id))?;

    let range = DateRange::parse(&args.start_date, &args.end_date)?;
    let config = ReportConfig::from_env(provider, range.clone())?;

    let client = build_client(settings.timeout_secs.max(1))?;
    info!(
        provider = %provider,
        start = %range.start_date(),
        end = %range.end_date(),
        "Fetching costs"
    );
    let buckets = fetch_buckets(&config, &client)
        .await
        .with_context(|| format!("Failed to fetch {} costs", provider.display_name()))?;

    let aggregated = aggregate(
        &buckets,
        &range.start_date(),
        &range.end_date(),
        config.project_id(),
    );
    let reports =
        render_all(&aggregated, config.org_id(), provider).context("Failed to render reports")?;

    let output_dir = args.output_dir.unwrap_or(settings.output_dir);
    let paths = write_reports(&output_dir, provider, &range, &reports)?;

    println!(
        "{}",
        renderer::render_summary(provider, &aggregated, &paths, opts.use_color)
    );

    if let Some(url) = args.post_url.or(settings.post_url) {
        match post_json(&client, &url, &reports.json).await {
            Ok(()) => {
                if opts.verbose {
                    eprintln!("Posted JSON report to {}", url);
                }
            }
            Err(e) => {
                warn!(error = %e, "Webhook POST failed");
                eprintln!("Warning: {}", e);
            }
        }
    }

    Ok(())
}
