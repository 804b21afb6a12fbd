use crate::actions::Action;
use crate::errors::AppError;
use crate::report::Report;
use crate::state::{AppState, ReadySignal};
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum ReportSource {
    File(PathBuf),
    Url(String),
}

pub async fn fetch_report(source: &ReportSource) -> Result<Report, AppError> {
    let bytes = match source {
        ReportSource::File(path) => fs::read(path).await?,
        ReportSource::Url(url) => reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec(),
    };
    Ok(Report::from_json_slice(&bytes)?)
}

/// A failed load leaves the dashboard with an empty report.
pub async fn load_report(source: &ReportSource) -> Report {
    match fetch_report(source).await {
        Ok(report) => report,
        Err(err) => {
            error!("failed to load report from {source:?}: {}", err.message);
            Report::default()
        }
    }
}

/// Loads the report once, commits it, then releases waiting chart readers.
pub async fn ingest(state: AppState, source: ReportSource, ready: ReadySignal) {
    let report = load_report(&source).await;
    info!(countries = report.len(), "report loaded");
    state.dispatch(Action::GotReport(report)).await;
    ready.mark_ready();
}
