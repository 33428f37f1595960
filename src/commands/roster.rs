//! Roster commands
//!
//! This module handles:
//! - import_roster_file: load a JSON array of roster entries into the database
//! - lookup_call_signs: classify call signs and resolve them against the roster

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::callsign::{self, CallSignClassification};
use crate::db::SqliteRoster;
use crate::error::Result;
use crate::roster::{self, RosterEntry};

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub read: usize,
    pub written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallSignInfo {
    pub classification: CallSignClassification,
    pub entry: Option<RosterEntry>,
}

pub async fn import_roster_file(pool: &SqlitePool, path: &Path) -> Result<ImportSummary> {
    log::info!("Importing roster from {}", path.display());

    let content = tokio::fs::read_to_string(path).await?;
    let entries: Vec<RosterEntry> = serde_json::from_str(&content)?;
    let written = SqliteRoster::new(pool.clone()).import(&entries).await?;

    Ok(ImportSummary {
        read: entries.len(),
        written,
    })
}

/// Classify every call and resolve the usable ones with one roster query
pub async fn lookup_call_signs(pool: &SqlitePool, calls: &[String]) -> Result<Vec<CallSignInfo>> {
    let classifications: Vec<CallSignClassification> =
        calls.iter().map(|call| callsign::classify(call)).collect();

    let wanted: Vec<String> = classifications
        .iter()
        .filter(|c| c.is_valid && !c.is_listener())
        .map(|c| c.normalized.clone())
        .collect();
    let found: HashMap<String, RosterEntry> = SqliteRoster::new(pool.clone())
        .lookup_many(&wanted)
        .await?
        .into_iter()
        .map(|entry| (callsign::normalize(&entry.call_sign), entry))
        .collect();

    Ok(classifications
        .into_iter()
        .map(|classification| {
            let entry = if classification.is_valid && !classification.is_listener() {
                found.get(&classification.normalized).cloned().map(|mut entry| {
                    roster::backfill_zone(&mut entry, &classification);
                    entry
                })
            } else {
                None
            };
            CallSignInfo {
                classification,
                entry,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsign::ZoneCategory;
    use crate::db::init_memory_db;
    use crate::error::IntakeError;

    #[tokio::test]
    async fn test_import_and_lookup() {
        let pool = init_memory_db().await.unwrap();
        let path = std::env::temp_dir().join(format!("roster-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[
                {"call_sign": "xe2mbe", "full_name": "Mario Bernal",
                 "state": "Nuevo León", "zone": ""},
                {"call_sign": "  "}
            ]"#,
        )
        .unwrap();

        let summary = import_roster_file(&pool, &path).await.unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(summary.read, 2);
        assert_eq!(summary.written, 1);

        let calls = ["XE2MBE", "XE9", "xe2mbe", "SWR", "XE1ZZZ"].map(String::from);
        let results = lookup_call_signs(&pool, &calls).await.unwrap();
        assert_eq!(results.len(), 5);
        let known = results[0].entry.as_ref().unwrap();
        assert_eq!(known.zone.as_deref(), Some("XE2"));
        assert_eq!(results[1].classification.zone_category, ZoneCategory::Invalid);
        assert!(results[1].entry.is_none());
        assert_eq!(results[2].entry, results[0].entry);
        assert!(results[3].entry.is_none());
        assert!(results[4].entry.is_none());
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_file() {
        let pool = init_memory_db().await.unwrap();
        let path = std::env::temp_dir().join(format!("roster-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "not json").unwrap();

        let result = import_roster_file(&pool, &path).await;
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(IntakeError::Json(_))));

        let missing = import_roster_file(&pool, Path::new("/nonexistent/roster.json")).await;
        assert!(matches!(missing, Err(IntakeError::Io(_))));
    }
}
