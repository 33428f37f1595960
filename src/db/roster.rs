// Operator roster stored in SQLite
//
// Intake only needs `lookup_by_call_sign`; the upsert/deactivate helpers
// back the roster import command and the tests.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::callsign;
use crate::error::Result;
use crate::roster::{Contact, RosterEntry, RosterStore};

const SELECT_OPERATOR: &str = r#"
    SELECT call_sign, full_name, paternal_surname, maternal_surname,
           state, municipality, neighborhood, postal_code, zone, phone, email
    FROM operators
"#;

#[derive(Debug, Clone)]
pub struct SqliteRoster {
    pool: SqlitePool,
}

fn entry_from_row(row: &SqliteRow) -> Result<RosterEntry> {
    let phone: Option<String> = row.try_get("phone")?;
    let email: Option<String> = row.try_get("email")?;
    let contact = if phone.is_some() || email.is_some() {
        Some(Contact { phone, email })
    } else {
        None
    };

    Ok(RosterEntry {
        call_sign: row.try_get("call_sign")?,
        full_name: row.try_get("full_name")?,
        paternal_surname: row.try_get("paternal_surname")?,
        maternal_surname: row.try_get("maternal_surname")?,
        state: row.try_get("state")?,
        municipality: row.try_get("municipality")?,
        neighborhood: row.try_get("neighborhood")?,
        postal_code: row.try_get("postal_code")?,
        zone: row.try_get("zone")?,
        contact,
    })
}

impl SqliteRoster {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update an operator, reactivating it if it was deactivated
    pub async fn upsert_entry(&self, entry: &RosterEntry) -> Result<()> {
        let call = callsign::normalize(&entry.call_sign);
        let contact = entry.contact.clone().unwrap_or_default();

        sqlx::query(
            r#"INSERT INTO operators (
                   call_sign, full_name, paternal_surname, maternal_surname,
                   state, municipality, neighborhood, postal_code, zone,
                   phone, email, active, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, datetime('now'))
               ON CONFLICT(call_sign) DO UPDATE SET
                   full_name = excluded.full_name,
                   paternal_surname = excluded.paternal_surname,
                   maternal_surname = excluded.maternal_surname,
                   state = excluded.state,
                   municipality = excluded.municipality,
                   neighborhood = excluded.neighborhood,
                   postal_code = excluded.postal_code,
                   zone = excluded.zone,
                   phone = excluded.phone,
                   email = excluded.email,
                   active = 1,
                   updated_at = datetime('now')"#,
        )
        .bind(&call)
        .bind(&entry.full_name)
        .bind(&entry.paternal_surname)
        .bind(&entry.maternal_surname)
        .bind(&entry.state)
        .bind(&entry.municipality)
        .bind(&entry.neighborhood)
        .bind(&entry.postal_code)
        .bind(&entry.zone)
        .bind(&contact.phone)
        .bind(&contact.email)
        .execute(&self.pool)
        .await?;

        log::debug!("Roster entry {} saved", call);
        Ok(())
    }

    /// Upsert many entries; returns how many were written
    pub async fn import(&self, entries: &[RosterEntry]) -> Result<usize> {
        let mut written = 0;
        for entry in entries {
            if callsign::normalize(&entry.call_sign).is_empty() {
                log::warn!("Skipping roster entry without call sign");
                continue;
            }
            self.upsert_entry(entry).await?;
            written += 1;
        }
        log::info!("Roster import: {} entries written", written);
        Ok(written)
    }

    /// Hide an operator from lookups without deleting its history
    pub async fn deactivate(&self, call: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE operators SET active = 0, updated_at = datetime('now') WHERE call_sign = ?",
        )
        .bind(callsign::normalize(call))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Batch lookup of several call signs; unknown calls are simply absent
    pub async fn lookup_many(&self, calls: &[String]) -> Result<Vec<RosterEntry>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = calls.iter().map(|_| "?").collect();
        let query = format!(
            "{} WHERE active = 1 AND call_sign IN ({}) ORDER BY call_sign",
            SELECT_OPERATOR,
            placeholders.join(", ")
        );

        let mut q = sqlx::query(&query);
        for call in calls {
            q = q.bind(callsign::normalize(call));
        }

        q.fetch_all(&self.pool)
            .await?
            .iter()
            .map(entry_from_row)
            .collect()
    }
}

impl RosterStore for SqliteRoster {
    async fn lookup_by_call_sign(&self, normalized: &str) -> Result<Option<RosterEntry>> {
        let query = format!("{} WHERE active = 1 AND call_sign = ?", SELECT_OPERATOR);
        let row = sqlx::query(&query)
            .bind(normalized)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(entry_from_row).transpose()
    }
}
