//! Report intake
//!
//! Turns a multi-row submission of call signs into draft reports ready for
//! review and commit.
//!
//! ## Module Organization
//! - `derive` - per-row default derivation (roster, listener relay, fallbacks)
//! - `batch` - classify/derive a whole submission and partition it
//! - `review` - per-cell edits over the accepted drafts
//! - `session` - one capture session: intake, edits, discard, commit

pub mod batch;
pub mod derive;
pub mod review;
pub mod session;

use std::collections::BTreeSet;
use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{IntakeError, Result};
use crate::roster::Contact;

pub use batch::process_batch;
pub use derive::derive;
pub use review::{CellEdit, DiscardReason, EditOutcome, Field, ReviewGrid};
pub use session::{CaptureSession, CommitReport, RowCommit};

/// Default signal report for a new draft
pub const DEFAULT_SIGNAL_REPORT: u8 = 59;

/// Valid signal report range
pub const SIGNAL_REPORT_RANGE: std::ops::RangeInclusive<u8> = 1..=99;

/// Most rows a single intake pass accepts
pub const MAX_BATCH_SIZE: usize = 10;

// ============================================================================
// Data Types
// ============================================================================

/// Frequency/mode/power recorded for HF reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HfParams {
    pub frequency: String,
    pub mode: String,
    pub power: String,
}

/// Defaults for one capture session, usually loaded from the user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    pub report_date: NaiveDate,
    pub report_type: String,
    pub preferred_system: String,
    #[serde(default)]
    pub hf_params: Option<HfParams>,
    /// SWL location, used for listener reports and unknown operators
    #[serde(default)]
    pub listener_state: Option<String>,
    #[serde(default)]
    pub listener_city: Option<String>,
    pub batch_size: usize,
}

impl SessionDefaults {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(IntakeError::InvalidDefaults(format!(
                "batch size {} outside 1..={}",
                self.batch_size, MAX_BATCH_SIZE
            )));
        }
        if self.preferred_system.trim().is_empty() {
            return Err(IntakeError::InvalidDefaults("no preferred system".to_string()));
        }
        Ok(())
    }

    pub fn listener_state(&self) -> &str {
        self.listener_state.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn listener_city(&self) -> &str {
        self.listener_city.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFlags {
    /// Row came from the SWR listener token: no zone, location from session
    pub is_listener_relay: bool,
}

/// One row of a report before it is committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftReport {
    pub call_sign: String,
    pub operator_name: String,
    pub state: String,
    pub city: String,
    pub zone: String,
    pub system: String,
    pub signal_report: u8,
    pub system_extra: Option<HfParams>,
    pub source_flags: SourceFlags,
    #[serde(default)]
    pub contact: Option<Contact>,
}

impl DraftReport {
    /// Re-assert the invariants that no derivation or edit may break
    pub(crate) fn enforce_invariants(&mut self, hf_params: Option<&HfParams>) {
        if self.source_flags.is_listener_relay {
            self.zone.clear();
        }
        if crate::reference::zones::is_hf(&self.system) {
            if self.system_extra.is_none() {
                self.system_extra = hf_params.cloned();
            }
        } else {
            self.system_extra = None;
        }
    }
}

/// One submitted row: the raw call sign and an optional system override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRow {
    pub call_sign: String,
    #[serde(default)]
    pub system: Option<String>,
}

impl IntakeRow {
    pub fn new(call_sign: impl Into<String>) -> Self {
        Self {
            call_sign: call_sign.into(),
            system: None,
        }
    }

    pub fn with_system(call_sign: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            call_sign: call_sign.into(),
            system: Some(system.into()),
        }
    }
}

impl From<&str> for IntakeRow {
    fn from(call_sign: &str) -> Self {
        IntakeRow::new(call_sign)
    }
}

/// Partition of one submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub accepted: Vec<DraftReport>,
    pub rejected_invalid: BTreeSet<String>,
    pub rejected_incomplete: BTreeSet<String>,
}

impl BatchOutcome {
    /// True when nothing blocks the batch from being committed
    pub fn is_clean(&self) -> bool {
        self.rejected_invalid.is_empty() && self.rejected_incomplete.is_empty()
    }

    /// Error describing what blocks the commit, if anything
    pub fn blocking_error(&self) -> Option<IntakeError> {
        if self.is_clean() {
            return None;
        }
        Some(IntakeError::BatchBlocked {
            invalid: self.rejected_invalid.clone(),
            incomplete: self.rejected_incomplete.clone(),
        })
    }
}

/// Session metadata persisted with every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_date: NaiveDate,
    pub report_type: String,
}

impl From<&SessionDefaults> for ReportMeta {
    fn from(defaults: &SessionDefaults) -> Self {
        Self {
            report_date: defaults.report_date,
            report_type: defaults.report_type.clone(),
        }
    }
}

/// Where committed reports go. Returns the identifier assigned to the row.
pub trait ReportSink {
    fn persist(
        &self,
        report: &DraftReport,
        meta: &ReportMeta,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Supplies session defaults from a stored user profile
pub trait DefaultsProvider {
    fn session_defaults(
        &self,
        user: &str,
        report_date: NaiveDate,
        report_type: &str,
    ) -> impl Future<Output = Result<SessionDefaults>> + Send;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::roster::{MemoryRoster, RosterEntry};

    pub fn defaults() -> SessionDefaults {
        SessionDefaults {
            report_date: NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
            report_type: "Boletín".to_string(),
            preferred_system: "ASL".to_string(),
            hf_params: None,
            listener_state: Some("Jalisco".to_string()),
            listener_city: Some("Guadalajara".to_string()),
            batch_size: 4,
        }
    }

    pub fn hf_defaults() -> SessionDefaults {
        SessionDefaults {
            preferred_system: "HF".to_string(),
            hf_params: Some(HfParams {
                frequency: "7.082".to_string(),
                mode: "LSB".to_string(),
                power: "100W".to_string(),
            }),
            ..defaults()
        }
    }

    pub fn roster() -> MemoryRoster {
        [
            RosterEntry {
                call_sign: "XE1ABC".to_string(),
                full_name: Some("Ana".to_string()),
                paternal_surname: Some("López".to_string()),
                maternal_surname: Some("Ruiz".to_string()),
                state: Some("Puebla".to_string()),
                municipality: Some("Cholula".to_string()),
                zone: Some("XE1".to_string()),
                ..Default::default()
            },
            RosterEntry {
                call_sign: "XE2MBE".to_string(),
                full_name: Some("Mario Bernal".to_string()),
                state: Some("Nuevo León".to_string()),
                municipality: None,
                zone: Some(String::new()),
                ..Default::default()
            },
        ]
        .into_iter()
        .collect()
    }
}
