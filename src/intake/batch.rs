// Batch intake: classify and derive every row of one submission
//
// Rows are independent; they are processed in submission order so that
// `accepted` keeps the order the operator typed them in. Nothing here
// touches the report sink.

use crate::callsign;
use crate::error::{IntakeError, Result};
use crate::roster::{self, RosterStore};

use super::{derive, BatchOutcome, IntakeRow, SessionDefaults};

/// Classify, resolve and derive every non-blank row.
///
/// Invalid and incomplete call signs are collected, not raised. Only a
/// failing roster store or unusable session defaults produce an error.
pub async fn process_batch<S: RosterStore>(
    rows: &[IntakeRow],
    defaults: &SessionDefaults,
    roster: &S,
) -> Result<BatchOutcome> {
    defaults.validate()?;
    if rows.len() > defaults.batch_size {
        return Err(IntakeError::InvalidDefaults(format!(
            "{} rows submitted for a batch of {}",
            rows.len(),
            defaults.batch_size
        )));
    }

    let mut outcome = BatchOutcome::default();
    for row in rows {
        if row.call_sign.trim().is_empty() {
            continue;
        }

        let classification = callsign::classify(&row.call_sign);
        if !classification.is_valid {
            outcome.rejected_invalid.insert(classification.normalized);
            continue;
        }
        if !classification.is_complete {
            outcome.rejected_incomplete.insert(classification.normalized);
            continue;
        }

        let entry = roster::resolve(roster, &classification).await?;
        let draft = derive(&classification, entry.as_ref(), defaults, row.system.as_deref());
        outcome.accepted.push(draft);
    }

    log::info!(
        "Batch processed: {} accepted, {} invalid, {} incomplete",
        outcome.accepted.len(),
        outcome.rejected_invalid.len(),
        outcome.rejected_incomplete.len()
    );
    if !outcome.is_clean() {
        log::warn!(
            "Batch blocked by invalid {:?} / incomplete {:?}",
            outcome.rejected_invalid,
            outcome.rejected_incomplete
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::testing::{defaults, roster};
    use crate::roster::RosterEntry;

    fn rows(calls: &[&str]) -> Vec<IntakeRow> {
        calls.iter().map(|c| IntakeRow::from(*c)).collect()
    }

    #[tokio::test]
    async fn test_mixed_batch() {
        let submitted = rows(&["XE1ABC", "", "INVALID1", "SWR"]);
        let outcome = process_batch(&submitted, &defaults(), &roster()).await.unwrap();

        let calls: Vec<&str> = outcome.accepted.iter().map(|d| d.call_sign.as_str()).collect();
        assert_eq!(calls, vec!["XE1ABC", "SWR"]);
        assert_eq!(outcome.rejected_invalid.len(), 1);
        assert!(outcome.rejected_invalid.contains("INVALID1"));
        assert!(outcome.rejected_incomplete.is_empty());

        assert_eq!(outcome.accepted[0].operator_name, "Ana López Ruiz");
        assert!(outcome.accepted[1].source_flags.is_listener_relay);
        assert_eq!(outcome.accepted[1].zone, "");
    }

    #[tokio::test]
    async fn test_roster_zone_backfill() {
        let outcome = process_batch(&rows(&["xe2mbe"]), &defaults(), &roster()).await.unwrap();
        let draft = &outcome.accepted[0];
        assert_eq!(draft.zone, "XE2");
        assert_eq!(draft.state, "Nuevo León");
        assert_eq!(draft.city, "Guadalajara");
        assert_eq!(draft.operator_name, "Mario Bernal");
    }

    #[tokio::test]
    async fn test_unknown_foreign_station() {
        let outcome = process_batch(&rows(&["K5AB"]), &defaults(), &roster()).await.unwrap();
        assert_eq!(outcome.accepted[0].state, "Extranjero");
        assert_eq!(outcome.accepted[0].zone, "EXT");
    }

    #[tokio::test]
    async fn test_every_row_lands_in_one_bucket() {
        let input = ["XE1", "XE9", "DL1ABC", "  ", "XE3QRS", "swr", "A", "XE2"];
        let defaults = SessionDefaults {
            batch_size: 10,
            ..defaults()
        };
        let outcome = process_batch(&rows(&input), &defaults, &roster()).await.unwrap();

        for raw in input.iter().filter(|c| !c.trim().is_empty()) {
            let call = raw.trim().to_uppercase();
            let hits = outcome.accepted.iter().filter(|d| d.call_sign == call).count()
                + usize::from(outcome.rejected_invalid.contains(&call))
                + usize::from(outcome.rejected_incomplete.contains(&call));
            assert_eq!(hits, 1, "{}", call);
        }
        assert_eq!(outcome.accepted.len(), 3);
        assert_eq!(
            outcome.rejected_incomplete.iter().cloned().collect::<Vec<_>>(),
            vec!["XE1".to_string(), "XE2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_batch_is_deterministic() {
        let input = rows(&["XE1ABC", "K5AB", "SWR", "XE9"]);
        let first = process_batch(&input, &defaults(), &roster()).await.unwrap();
        let second = process_batch(&input, &defaults(), &roster()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_row_system_override() {
        let input = vec![IntakeRow::with_system("XE1ABC", "echolink"), IntakeRow::new("XE3ZZZ")];
        let outcome = process_batch(&input, &defaults(), &roster()).await.unwrap();
        assert_eq!(outcome.accepted[0].system, "Echolink");
        assert_eq!(outcome.accepted[1].system, "ASL");
    }

    #[tokio::test]
    async fn test_invalid_defaults_rejected() {
        let bad = SessionDefaults {
            batch_size: 0,
            ..defaults()
        };
        let result = process_batch(&rows(&["XE1ABC"]), &bad, &roster()).await;
        assert!(matches!(result, Err(IntakeError::InvalidDefaults(_))));

        let oversized = rows(&["XE1ABC", "XE1ABC", "XE1ABC", "XE1ABC", "XE1ABC"]);
        let result = process_batch(&oversized, &defaults(), &roster()).await;
        assert!(matches!(result, Err(IntakeError::InvalidDefaults(_))));
    }

    struct FailingRoster;

    impl RosterStore for FailingRoster {
        async fn lookup_by_call_sign(&self, _normalized: &str) -> Result<Option<RosterEntry>> {
            Err(IntakeError::Database(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_roster_failure_propagates() {
        let result = process_batch(&rows(&["XE1ABC"]), &defaults(), &FailingRoster).await;
        assert!(matches!(result, Err(IntakeError::Database(_))));

        // rejected rows never reach the roster
        let outcome = process_batch(&rows(&["XE9", "SWR"]), &defaults(), &FailingRoster)
            .await
            .unwrap();
        assert_eq!(outcome.accepted.len(), 1);
    }
}
