// Committed reports
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::intake::{DraftReport, ReportMeta, ReportSink};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Writes each committed draft as one row of `reports`
#[derive(Debug, Clone)]
pub struct SqliteReportSink {
    pool: SqlitePool,
}

impl SqliteReportSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReportSink for SqliteReportSink {
    async fn persist(&self, report: &DraftReport, meta: &ReportMeta) -> Result<String> {
        let uuid = uuid::Uuid::new_v4().to_string();
        let hf = report.system_extra.as_ref();

        sqlx::query(
            r#"INSERT INTO reports (
                   uuid, call_sign, operator_name, state, city, zone, system,
                   signal_report, frequency, mode, power, is_listener_relay,
                   report_date, report_type, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))"#,
        )
        .bind(&uuid)
        .bind(&report.call_sign)
        .bind(&report.operator_name)
        .bind(&report.state)
        .bind(&report.city)
        .bind(&report.zone)
        .bind(&report.system)
        .bind(i64::from(report.signal_report))
        .bind(hf.map(|p| p.frequency.as_str()))
        .bind(hf.map(|p| p.mode.as_str()))
        .bind(hf.map(|p| p.power.as_str()))
        .bind(report.source_flags.is_listener_relay)
        .bind(meta.report_date.format(DATE_FORMAT).to_string())
        .bind(&meta.report_type)
        .execute(&self.pool)
        .await?;

        Ok(uuid)
    }
}

/// Per-day totals of committed reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub date: String,
    pub total: i64,
    /// Keyed by zone; listener relays are counted under ""
    pub by_zone: BTreeMap<String, i64>,
    pub by_system: BTreeMap<String, i64>,
    pub listener_reports: i64,
}

async fn count_by(pool: &SqlitePool, column: &str, date: &str) -> Result<BTreeMap<String, i64>> {
    let query = format!(
        "SELECT {col} AS grp, COUNT(*) AS count FROM reports WHERE report_date = ? GROUP BY {col}",
        col = column
    );
    let rows = sqlx::query(&query).bind(date).fetch_all(pool).await?;

    let mut counts = BTreeMap::new();
    for row in rows {
        counts.insert(row.try_get::<String, _>("grp")?, row.try_get::<i64, _>("count")?);
    }
    Ok(counts)
}

/// Summarize everything committed for one report date
pub async fn summarize_reports(pool: &SqlitePool, date: NaiveDate) -> Result<ReportSummary> {
    let date = date.format(DATE_FORMAT).to_string();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE report_date = ?")
        .bind(&date)
        .fetch_one(pool)
        .await?;
    let listener_reports: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reports WHERE report_date = ? AND is_listener_relay = 1",
    )
    .bind(&date)
    .fetch_one(pool)
    .await?;

    let by_zone = count_by(pool, "zone", &date).await?;
    let by_system = count_by(pool, "system", &date).await?;

    log::debug!("Summary for {}: {} reports", date, total);

    Ok(ReportSummary {
        date,
        total,
        by_zone,
        by_system,
        listener_reports,
    })
}
