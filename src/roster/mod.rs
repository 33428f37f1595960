// Roster of licensed operators
//
// The roster is owned by the membership side of the application; intake only
// reads it. A missing entry is an unregistered operator, not an error.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::callsign::{self, CallSignClassification};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Registered operator ("radioexperimentador")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub call_sign: String,
    pub full_name: Option<String>,
    pub paternal_surname: Option<String>,
    pub maternal_surname: Option<String>,
    pub state: Option<String>,
    pub municipality: Option<String>,
    pub neighborhood: Option<String>,
    pub postal_code: Option<String>,
    /// Authoritative zone when the roster assigns one; may be empty
    pub zone: Option<String>,
    pub contact: Option<Contact>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RosterEntry {
    /// Name as shown on a report: given names followed by both surnames.
    /// Surnames already present in `full_name` are not repeated.
    pub fn display_name(&self) -> String {
        let mut name = non_empty(&self.full_name).unwrap_or_default().to_string();
        for surname in [&self.paternal_surname, &self.maternal_surname] {
            if let Some(surname) = non_empty(surname) {
                if name.to_uppercase().contains(&surname.to_uppercase()) {
                    continue;
                }
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(surname);
            }
        }
        name
    }

    pub fn state(&self) -> Option<&str> {
        non_empty(&self.state)
    }

    pub fn municipality(&self) -> Option<&str> {
        non_empty(&self.municipality)
    }

    pub fn zone(&self) -> Option<&str> {
        non_empty(&self.zone)
    }
}

/// Lookup of roster entries by normalized call sign
pub trait RosterStore {
    /// `normalized` is already trimmed and uppercased
    fn lookup_by_call_sign(
        &self,
        normalized: &str,
    ) -> impl Future<Output = Result<Option<RosterEntry>>> + Send;
}

/// Resolve a classified call sign against the roster.
///
/// Invalid calls and the listener token are never looked up. When the entry
/// exists but carries no zone, the zone is taken from the call sign's
/// regular-series digit (XE2MBE -> XE2); otherwise it stays blank for the
/// derivation step to fill.
pub async fn resolve<S: RosterStore>(
    store: &S,
    classification: &CallSignClassification,
) -> Result<Option<RosterEntry>> {
    if !classification.is_valid || classification.is_listener() {
        return Ok(None);
    }

    let Some(mut entry) = store.lookup_by_call_sign(&classification.normalized).await? else {
        log::debug!("{} is not in the roster", classification.normalized);
        return Ok(None);
    };

    backfill_zone(&mut entry, classification);
    Ok(Some(entry))
}

/// Fill a blank roster zone from the regular-series digit of the call sign
pub fn backfill_zone(entry: &mut RosterEntry, classification: &CallSignClassification) {
    if entry.zone().is_some() {
        return;
    }
    entry.zone = callsign::zone_from_call_sign(&entry.call_sign)
        .or_else(|| callsign::zone_from_call_sign(&classification.normalized))
        .map(str::to_string);
    if let Some(zone) = &entry.zone {
        log::debug!("Back-filled zone {} for {}", zone, entry.call_sign);
    }
}

/// In-memory roster snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryRoster {
    entries: HashMap<String, RosterEntry>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, keyed by its normalized call sign
    pub fn insert(&mut self, mut entry: RosterEntry) {
        entry.call_sign = callsign::normalize(&entry.call_sign);
        self.entries.insert(entry.call_sign.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RosterEntry> for MemoryRoster {
    fn from_iter<I: IntoIterator<Item = RosterEntry>>(iter: I) -> Self {
        let mut roster = MemoryRoster::new();
        for entry in iter {
            roster.insert(entry);
        }
        roster
    }
}

impl RosterStore for MemoryRoster {
    async fn lookup_by_call_sign(&self, normalized: &str) -> Result<Option<RosterEntry>> {
        Ok(self.entries.get(&callsign::normalize(normalized)).cloned())
    }
}
