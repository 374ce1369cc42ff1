use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::dates::DateRange;
use crate::core::providers::Provider;
use crate::core::render::RenderedReports;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to POST report to {url}: {source}")]
    Post {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Report endpoint {url} answered HTTP {status}")]
    PostStatus { url: String, status: u16 },
}

/// Paths of the files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// `<provider>-costs-<start>-to-<end>.<ext>`
pub fn report_file_name(provider: Provider, range: &DateRange, extension: &str) -> String {
    format!(
        "{}-costs-{}-to-{}.{}",
        provider.id(),
        range.start_date(),
        range.end_date(),
        extension
    )
}

fn write_file(path: &Path, content: &str) -> Result<(), SinkError> {
    std::fs::write(path, content).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote report file");
    Ok(())
}

/// Write all three formats under `<output_dir>/<provider>/`.
pub fn write_reports(
    output_dir: &Path,
    provider: Provider,
    range: &DateRange,
    reports: &RenderedReports,
) -> Result<ReportPaths, SinkError> {
    let dir = output_dir.join(provider.id());
    std::fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
        path: dir.clone(),
        source,
    })?;

    let paths = ReportPaths {
        markdown: dir.join(report_file_name(provider, range, "md")),
        csv: dir.join(report_file_name(provider, range, "csv")),
        json: dir.join(report_file_name(provider, range, "json")),
    };

    write_file(&paths.markdown, &reports.markdown)?;
    write_file(&paths.csv, &reports.csv)?;
    write_file(&paths.json, &reports.json)?;

    info!(dir = %dir.display(), "Reports written");
    Ok(paths)
}

/// Send the JSON report body to a webhook URL.
pub async fn post_json(client: &reqwest::Client, url: &str, body: &str) -> Result<(), SinkError> {
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .map_err(|source| SinkError::Post {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SinkError::PostStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    info!(url, status = status.as_u16(), "Posted JSON report");
    Ok(())
}
