//! Capture session
//!
//! Holds everything derived during one intake: the defaults it started with,
//! the last batch outcome, the review grid and which rows were already
//! committed. Nothing here is global; callers own the session and pass it
//! around explicitly.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::callsign;
use crate::error::{IntakeError, Result};
use crate::roster::{self, RosterStore};

use super::review::{CellEdit, DiscardReason, EditOutcome, ReviewGrid};
use super::{
    derive, process_batch, BatchOutcome, DraftReport, IntakeRow, ReportMeta, ReportSink,
    SessionDefaults,
};

/// Result of persisting one row
#[derive(Debug, Clone, Serialize)]
pub struct RowCommit {
    pub row: usize,
    pub call_sign: String,
    /// Identifier assigned by the sink
    pub id: Option<String>,
    pub error: Option<String>,
}

impl RowCommit {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-row results of one commit attempt
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitReport {
    pub rows: Vec<RowCommit>,
    /// True once every row of the batch is committed and the session reset
    pub completed: bool,
}

impl CommitReport {
    pub fn committed(&self) -> usize {
        self.rows.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.rows.len() - self.committed()
    }
}

#[derive(Debug, Clone)]
pub struct CaptureSession {
    defaults: SessionDefaults,
    outcome: Option<BatchOutcome>,
    grid: ReviewGrid,
    committed: BTreeSet<usize>,
}

impl CaptureSession {
    pub fn new(defaults: SessionDefaults) -> Result<Self> {
        defaults.validate()?;
        Ok(Self {
            defaults,
            outcome: None,
            grid: ReviewGrid::default(),
            committed: BTreeSet::new(),
        })
    }

    pub fn defaults(&self) -> &SessionDefaults {
        &self.defaults
    }

    pub fn outcome(&self) -> Option<&BatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn grid(&self) -> &ReviewGrid {
        &self.grid
    }

    pub fn is_committed(&self, row: usize) -> bool {
        self.committed.contains(&row)
    }

    /// Run a new batch. All state from a previous batch, edits included,
    /// is replaced.
    pub async fn intake<S: RosterStore>(
        &mut self,
        rows: &[IntakeRow],
        roster: &S,
    ) -> Result<&BatchOutcome> {
        let outcome = process_batch(rows, &self.defaults, roster).await?;
        self.grid = ReviewGrid::new(outcome.accepted.clone(), self.defaults.hf_params.clone());
        self.committed.clear();
        Ok(self.outcome.insert(outcome))
    }

    /// Apply one grid edit. Rows that are already committed are frozen.
    pub fn edit(&mut self, edit: CellEdit) -> EditOutcome {
        if self.committed.contains(&edit.row) {
            log::debug!("Edit for committed row {} ignored", edit.row);
            return EditOutcome::Discarded(DiscardReason::Committed);
        }
        self.grid.apply_edit(edit)
    }

    /// Re-derive one accepted row for a corrected call sign or system.
    ///
    /// The replacement must itself be a valid, complete call sign; otherwise
    /// the row is left alone and the call sign comes back in a
    /// `BatchBlocked` error.
    pub async fn rederive_row<S: RosterStore>(
        &mut self,
        row: usize,
        call_sign: &str,
        system: Option<&str>,
        roster: &S,
    ) -> Result<&DraftReport> {
        if row >= self.grid.len() || self.committed.contains(&row) {
            return Err(IntakeError::UnknownRow(row));
        }

        let classification = callsign::classify(call_sign);
        if !classification.is_valid || !classification.is_complete {
            let mut blocked = BTreeSet::new();
            blocked.insert(classification.normalized.clone());
            return Err(if classification.is_valid {
                IntakeError::BatchBlocked { invalid: BTreeSet::new(), incomplete: blocked }
            } else {
                IntakeError::BatchBlocked { invalid: blocked, incomplete: BTreeSet::new() }
            });
        }

        let entry = roster::resolve(roster, &classification).await?;
        let draft = derive(&classification, entry.as_ref(), &self.defaults, system);
        if let Some(outcome) = self.outcome.as_mut() {
            outcome.accepted[row] = draft.clone();
        }
        self.grid.rederive_row(row, draft);
        self.grid
            .baseline(row)
            .ok_or(IntakeError::UnknownRow(row))
    }

    /// Throw away the current batch and every edit made to it
    pub fn discard(&mut self) {
        if self.outcome.is_some() {
            log::info!("Discarding batch of {} rows", self.grid.len());
        }
        self.outcome = None;
        self.grid.clear();
        self.committed.clear();
    }

    /// Persist every reconciled row that is not committed yet.
    ///
    /// Refuses to run while the batch has rejected call signs. Rows are
    /// independent: a failing row is reported and the rest still go through.
    /// When every row is committed the session resets for the next batch.
    pub async fn commit<K: ReportSink>(&mut self, sink: &K) -> Result<CommitReport> {
        let outcome = self.outcome.as_ref().ok_or(IntakeError::NothingToCommit)?;
        if let Some(blocked) = outcome.blocking_error() {
            return Err(blocked);
        }
        if self.grid.is_empty() {
            return Err(IntakeError::NothingToCommit);
        }

        let meta = ReportMeta::from(&self.defaults);
        let mut report = CommitReport::default();
        for row in 0..self.grid.len() {
            if self.committed.contains(&row) {
                continue;
            }
            let Some(draft) = self.grid.reconciled_row(row) else {
                continue;
            };
            match sink.persist(&draft, &meta).await {
                Ok(id) => {
                    log::debug!("Row {} ({}) committed as {}", row, draft.call_sign, id);
                    self.grid.mark_committed(row);
                    self.committed.insert(row);
                    report.rows.push(RowCommit {
                        row,
                        call_sign: draft.call_sign,
                        id: Some(id),
                        error: None,
                    });
                }
                Err(e) => {
                    log::warn!("Row {} ({}) failed to commit: {}", row, draft.call_sign, e);
                    report.rows.push(RowCommit {
                        row,
                        call_sign: draft.call_sign,
                        id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        log::info!("Commit: {} saved, {} failed", report.committed(), report.failed());

        if self.committed.len() == self.grid.len() {
            report.completed = true;
            self.discard();
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::intake::review::Field;
    use crate::intake::testing::{defaults, roster};

    /// Sink that records rows and fails for selected call signs
    #[derive(Default)]
    struct RecordingSink {
        fail: Vec<String>,
        saved: Mutex<Vec<DraftReport>>,
    }

    impl ReportSink for RecordingSink {
        async fn persist(&self, report: &DraftReport, _meta: &ReportMeta) -> Result<String> {
            if self.fail.contains(&report.call_sign) {
                return Err(IntakeError::Persist(format!("{} rejected", report.call_sign)));
            }
            let mut saved = self.saved.lock().unwrap();
            saved.push(report.clone());
            Ok(format!("id-{}", saved.len()))
        }
    }

    fn rows(calls: &[&str]) -> Vec<IntakeRow> {
        calls.iter().map(|c| IntakeRow::from(*c)).collect()
    }

    #[tokio::test]
    async fn test_commit_blocked_by_rejections() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC", "XE1"]), &roster()).await.unwrap();

        let sink = RecordingSink::default();
        let result = session.commit(&sink).await;
        assert!(matches!(result, Err(IntakeError::BatchBlocked { .. })));
        assert!(sink.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_without_batch() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        let result = session.commit(&RecordingSink::default()).await;
        assert!(matches!(result, Err(IntakeError::NothingToCommit)));
    }

    #[tokio::test]
    async fn test_commit_applies_edits_and_resets() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC", "SWR"]), &roster()).await.unwrap();
        session.edit(CellEdit::new(0, Field::SignalReport, "57"));
        session.edit(CellEdit::new(1, Field::Zone, "XE1"));

        let sink = RecordingSink::default();
        let report = session.commit(&sink).await.unwrap();
        assert!(report.completed);
        assert_eq!(report.committed(), 2);

        let saved = sink.saved.lock().unwrap();
        assert_eq!(saved[0].signal_report, 57);
        assert_eq!(saved[1].zone, "");
        assert!(session.outcome().is_none());
        assert!(session.grid().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_is_per_row() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC", "K5AB", "XE3ZZZ"]), &roster()).await.unwrap();

        let failing = RecordingSink {
            fail: vec!["K5AB".to_string()],
            ..Default::default()
        };
        let report = session.commit(&failing).await.unwrap();
        assert!(!report.completed);
        assert_eq!(report.committed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(session.is_committed(0));
        assert!(!session.is_committed(1));
        assert!(session.is_committed(2));

        // retry only sends the failed row
        let sink = RecordingSink::default();
        let report = session.commit(&sink).await.unwrap();
        assert!(report.completed);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].call_sign, "K5AB");
        assert_eq!(sink.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_committed_rows_reject_edits() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC", "K5AB"]), &roster()).await.unwrap();

        let failing = RecordingSink {
            fail: vec!["K5AB".to_string()],
            ..Default::default()
        };
        session.commit(&failing).await.unwrap();
        assert!(session.is_committed(0));

        let outcome = session.edit(CellEdit::new(0, Field::City, "Zapopan"));
        assert_eq!(outcome, EditOutcome::Discarded(DiscardReason::Committed));
        assert!(!session.grid().is_edited(0, Field::City));

        // the failed row is still editable and the edit reaches the sink
        let outcome = session.edit(CellEdit::new(1, Field::City, "Laredo"));
        assert_eq!(outcome, EditOutcome::Applied);

        let sink = RecordingSink::default();
        let report = session.commit(&sink).await.unwrap();
        assert!(report.completed);
        let saved = sink.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].call_sign, "K5AB");
        assert_eq!(saved[0].city, "Laredo");
    }

    #[tokio::test]
    async fn test_discard_clears_stale_edits() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC"]), &roster()).await.unwrap();
        session.edit(CellEdit::new(0, Field::City, "Zapopan"));
        session.discard();
        assert!(session.outcome().is_none());

        session.intake(&rows(&["XE3ZZZ"]), &roster()).await.unwrap();
        assert!(!session.grid().is_edited(0, Field::City));
        assert_eq!(session.grid().reconcile()[0].city, "Guadalajara");
    }

    #[tokio::test]
    async fn test_new_intake_replaces_previous_edits() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC"]), &roster()).await.unwrap();
        session.edit(CellEdit::new(0, Field::OperatorName, "Otra"));

        session.intake(&rows(&["XE2MBE"]), &roster()).await.unwrap();
        assert_eq!(session.grid().reconcile()[0].operator_name, "Mario Bernal");
    }

    #[tokio::test]
    async fn test_rederive_row() {
        let mut session = CaptureSession::new(defaults()).unwrap();
        session.intake(&rows(&["XE1ABC", "K5AB"]), &roster()).await.unwrap();
        session.edit(CellEdit::new(0, Field::City, "Zapopan"));

        let draft = session.rederive_row(1, "xe2mbe", None, &roster()).await.unwrap();
        assert_eq!(draft.zone, "XE2");
        assert_eq!(session.outcome().unwrap().accepted[1].call_sign, "XE2MBE");
        assert!(session.grid().is_edited(0, Field::City));

        let result = session.rederive_row(1, "XE9", None, &roster()).await;
        assert!(matches!(result, Err(IntakeError::BatchBlocked { .. })));
        assert_eq!(session.grid().baseline(1).unwrap().call_sign, "XE2MBE");

        let result = session.rederive_row(5, "XE1ABC", None, &roster()).await;
        assert!(matches!(result, Err(IntakeError::UnknownRow(5))));
    }

    #[test]
    fn test_session_rejects_bad_defaults() {
        let bad = SessionDefaults {
            batch_size: 42,
            ..defaults()
        };
        assert!(CaptureSession::new(bad).is_err());
    }
}
