// Review grid: per-cell edits layered over derived drafts
//
// The grid keeps the last derived (or committed) draft of every row as its
// baseline and stores user edits per (row, field). An edit that matches the
// baseline is dropped, so "edited" always means "differs from what was
// derived". Re-deriving a row only touches that row's baseline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reference::states::canonical_state_name;

use super::derive::canonical_system;
use super::{DraftReport, HfParams, SIGNAL_REPORT_RANGE};

/// Editable column of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    OperatorName,
    State,
    City,
    Zone,
    // System sorts before the HF columns so a switch to HF is seen first
    System,
    SignalReport,
    Frequency,
    Mode,
    Power,
}

/// One edit coming from the grid UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEdit {
    pub row: usize,
    pub field: Field,
    pub value: String,
}

impl CellEdit {
    pub fn new(row: usize, field: Field, value: impl Into<String>) -> Self {
        Self {
            row,
            field,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    UnknownRow,
    /// Zone on a listener-relay row
    ProtectedField,
    InvalidValue,
    /// Row was already saved; edits can no longer reach the sink
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    /// The cell now differs from its derived value
    Applied,
    /// The value equals the derived value; any previous edit was dropped
    Unchanged,
    Discarded(DiscardReason),
}

#[derive(Debug, Clone, Default)]
pub struct ReviewGrid {
    baseline: Vec<DraftReport>,
    edits: BTreeMap<(usize, Field), String>,
    hf_params: Option<HfParams>,
}

/// Display value of one cell
fn cell_value(draft: &DraftReport, field: Field) -> String {
    let extra = draft.system_extra.as_ref();
    match field {
        Field::OperatorName => draft.operator_name.clone(),
        Field::State => draft.state.clone(),
        Field::City => draft.city.clone(),
        Field::Zone => draft.zone.clone(),
        Field::System => draft.system.clone(),
        Field::SignalReport => draft.signal_report.to_string(),
        Field::Frequency => extra.map(|p| p.frequency.clone()).unwrap_or_default(),
        Field::Mode => extra.map(|p| p.mode.clone()).unwrap_or_default(),
        Field::Power => extra.map(|p| p.power.clone()).unwrap_or_default(),
    }
}

/// Normalize an edited value; None if it can never be stored
fn normalize_value(field: Field, value: &str) -> Option<String> {
    let value = value.trim();
    match field {
        Field::State => Some(canonical_state_name(value)),
        Field::Zone => Some(value.to_uppercase()),
        Field::System => Some(canonical_system(value)),
        Field::Mode => Some(value.to_uppercase()),
        Field::SignalReport => value
            .parse::<u8>()
            .ok()
            .filter(|r| SIGNAL_REPORT_RANGE.contains(r))
            .map(|r| r.to_string()),
        _ => Some(value.to_string()),
    }
}

impl ReviewGrid {
    /// Start reviewing a freshly derived batch
    pub fn new(accepted: Vec<DraftReport>, hf_params: Option<HfParams>) -> Self {
        Self {
            baseline: accepted,
            edits: BTreeMap::new(),
            hf_params,
        }
    }

    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    /// Derived (or last committed) draft for a row
    pub fn baseline(&self, row: usize) -> Option<&DraftReport> {
        self.baseline.get(row)
    }

    /// Value currently shown in a cell: the edit if any, else the baseline
    pub fn current_value(&self, row: usize, field: Field) -> Option<String> {
        let draft = self.baseline.get(row)?;
        Some(
            self.edits
                .get(&(row, field))
                .cloned()
                .unwrap_or_else(|| cell_value(draft, field)),
        )
    }

    pub fn is_edited(&self, row: usize, field: Field) -> bool {
        self.edits.contains_key(&(row, field))
    }

    /// Cells that currently differ from their baseline
    pub fn edited_cells(&self) -> impl Iterator<Item = (usize, Field)> + '_ {
        self.edits.keys().copied()
    }

    pub fn apply_edit(&mut self, edit: CellEdit) -> EditOutcome {
        let Some(draft) = self.baseline.get(edit.row) else {
            log::debug!("Edit for unknown row {} ignored", edit.row);
            return EditOutcome::Discarded(DiscardReason::UnknownRow);
        };

        if edit.field == Field::Zone && draft.source_flags.is_listener_relay {
            log::debug!("Zone edit on listener row {} discarded", edit.row);
            self.edits.remove(&(edit.row, Field::Zone));
            return EditOutcome::Discarded(DiscardReason::ProtectedField);
        }

        let Some(value) = normalize_value(edit.field, &edit.value) else {
            log::debug!("Rejected value {:?} for {:?} on row {}", edit.value, edit.field, edit.row);
            return EditOutcome::Discarded(DiscardReason::InvalidValue);
        };

        let key = (edit.row, edit.field);
        if value == cell_value(draft, edit.field) {
            self.edits.remove(&key);
            EditOutcome::Unchanged
        } else {
            self.edits.insert(key, value);
            EditOutcome::Applied
        }
    }

    pub fn apply_edits<I>(&mut self, edits: I) -> Vec<EditOutcome>
    where
        I: IntoIterator<Item = CellEdit>,
    {
        edits.into_iter().map(|edit| self.apply_edit(edit)).collect()
    }

    /// Replace one row's baseline after it was re-derived. Edits on other
    /// rows are untouched; edits on this row survive unless they now match
    /// the new baseline or became protected.
    pub fn rederive_row(&mut self, row: usize, draft: DraftReport) -> bool {
        let Some(slot) = self.baseline.get_mut(row) else {
            return false;
        };
        *slot = draft;
        let draft = &self.baseline[row];
        self.edits.retain(|&(r, field), value| {
            if r != row {
                return true;
            }
            if field == Field::Zone && draft.source_flags.is_listener_relay {
                return false;
            }
            *value != cell_value(draft, field)
        });
        true
    }

    /// Record a committed row: its reconciled value becomes the baseline and
    /// its edits are cleared.
    pub fn mark_committed(&mut self, row: usize) {
        if let Some(reconciled) = self.reconciled_row(row) {
            self.baseline[row] = reconciled;
            self.edits.retain(|&(r, _), _| r != row);
        }
    }

    /// One row with its edits applied
    pub fn reconciled_row(&self, row: usize) -> Option<DraftReport> {
        let mut draft = self.baseline.get(row)?.clone();
        let cells = (row, Field::OperatorName)..=(row, Field::Power);
        for (&(_, field), value) in self.edits.range(cells) {
            self.apply_value(&mut draft, field, value);
        }
        draft.enforce_invariants(self.hf_params.as_ref());
        Some(draft)
    }

    /// All rows with edits applied, in batch order
    pub fn reconcile(&self) -> Vec<DraftReport> {
        (0..self.baseline.len())
            .filter_map(|row| self.reconciled_row(row))
            .collect()
    }

    /// Drop every row and every edit
    pub fn clear(&mut self) {
        self.baseline.clear();
        self.edits.clear();
    }

    fn apply_value(&self, draft: &mut DraftReport, field: Field, value: &str) {
        match field {
            Field::OperatorName => draft.operator_name = value.to_string(),
            Field::State => draft.state = value.to_string(),
            Field::City => draft.city = value.to_string(),
            Field::Zone => draft.zone = value.to_string(),
            Field::System => draft.system = value.to_string(),
            Field::SignalReport => {
                if let Ok(report) = value.parse() {
                    draft.signal_report = report;
                }
            }
            Field::Frequency | Field::Mode | Field::Power => {
                let extra = draft
                    .system_extra
                    .get_or_insert_with(|| self.hf_params.clone().unwrap_or_default());
                match field {
                    Field::Frequency => extra.frequency = value.to_string(),
                    Field::Mode => extra.mode = value.to_string(),
                    _ => extra.power = value.to_string(),
                }
            }
        }
    }
}
