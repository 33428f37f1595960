//! Intake command
//!
//! One request is one capture session: load the user's defaults, run the
//! batch, apply grid edits and commit when asked and nothing blocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::{ProfileStore, SqliteReportSink, SqliteRoster};
use crate::error::Result;
use crate::intake::{
    BatchOutcome, CaptureSession, CellEdit, CommitReport, DefaultsProvider, DraftReport,
    EditOutcome, IntakeRow,
};

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
    /// Whose stored profile supplies the session defaults
    pub user: String,
    pub rows: Vec<IntakeRow>,
    #[serde(default)]
    pub edits: Vec<CellEdit>,
    /// Defaults to today
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub report_type: Option<String>,
    /// Overrides the profile's batch size for this request
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub commit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeResponse {
    pub report_date: NaiveDate,
    pub report_type: String,
    pub outcome: BatchOutcome,
    /// One entry per submitted edit, in order
    pub edits: Vec<EditOutcome>,
    /// Accepted rows with edits applied
    pub reports: Vec<DraftReport>,
    /// True when rejected call signs keep the batch from being committed
    pub blocked: bool,
    pub commit: Option<CommitReport>,
}

// ============================================================================
// Intake Command
// ============================================================================

pub async fn run_intake(
    pool: &SqlitePool,
    config: &AppConfig,
    request: IntakeRequest,
    today: NaiveDate,
) -> Result<IntakeResponse> {
    let report_date = request.report_date.unwrap_or(today);
    let report_type = request
        .report_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&config.default_report_type)
        .to_string();

    log::info!(
        "Intake for {}: {} rows, {} edits ({} {})",
        request.user,
        request.rows.len(),
        request.edits.len(),
        report_type,
        report_date
    );

    let mut defaults = ProfileStore::new(pool.clone())
        .session_defaults(&request.user, report_date, &report_type)
        .await?;
    if let Some(batch_size) = request.batch_size {
        defaults.batch_size = batch_size;
    }

    let roster = SqliteRoster::new(pool.clone());
    let mut session = CaptureSession::new(defaults)?;
    let outcome = session.intake(&request.rows, &roster).await?.clone();

    let edits: Vec<EditOutcome> = request.edits.into_iter().map(|e| session.edit(e)).collect();
    let reports = session.grid().reconcile();
    let blocked = !outcome.is_clean();

    let commit = if !request.commit {
        None
    } else if blocked {
        log::warn!("Commit skipped: batch has rejected call signs");
        None
    } else if reports.is_empty() {
        log::info!("Commit skipped: no rows to save");
        None
    } else {
        Some(session.commit(&SqliteReportSink::new(pool.clone())).await?)
    };

    Ok(IntakeResponse {
        report_date,
        report_type,
        outcome,
        edits,
        reports,
        blocked,
        commit,
    })
}
