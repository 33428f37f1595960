// Key/value settings and per-user intake profiles
//
// Profiles are stored as `profile.<user>.<field>` rows of the settings table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::error::{IntakeError, Result};
use crate::intake::{DefaultsProvider, HfParams, SessionDefaults, MAX_BATCH_SIZE};

const PROFILE_FIELDS: [&str; 7] = [
    "preferred_system",
    "listener_state",
    "listener_city",
    "hf_frequency",
    "hf_mode",
    "hf_power",
    "batch_size",
];

pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    log::debug!(
        "Setting {} = {}",
        key,
        if key.contains("phone") || key.contains("email") {
            "***"
        } else {
            value
        }
    );

    sqlx::query(
        r#"INSERT INTO settings (key, value, updated_at)
           VALUES (?, ?, datetime('now'))
           ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = datetime('now')"#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_setting(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Stored intake preferences of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub preferred_system: String,
    #[serde(default)]
    pub listener_state: Option<String>,
    #[serde(default)]
    pub listener_city: Option<String>,
    #[serde(default)]
    pub hf_params: Option<HfParams>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

impl UserProfile {
    pub fn into_defaults(self, report_date: NaiveDate, report_type: &str) -> SessionDefaults {
        SessionDefaults {
            report_date,
            report_type: report_type.to_string(),
            preferred_system: self.preferred_system,
            hf_params: self.hf_params,
            listener_state: self.listener_state,
            listener_city: self.listener_city,
            batch_size: self.batch_size,
        }
    }
}

fn profile_key(user: &str, field: &str) -> String {
    format!("profile.{}.{}", user.trim().to_lowercase(), field)
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    pool: SqlitePool,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write every profile field; optional fields that are unset are removed
    pub async fn save_profile(&self, user: &str, profile: &UserProfile) -> Result<()> {
        if user.trim().is_empty() {
            return Err(IntakeError::Config("profile needs a user name".to_string()));
        }
        if profile.batch_size == 0 || profile.batch_size > MAX_BATCH_SIZE {
            return Err(IntakeError::InvalidDefaults(format!(
                "batch size {} outside 1..={}",
                profile.batch_size, MAX_BATCH_SIZE
            )));
        }

        let hf = profile.hf_params.as_ref();
        let batch_size = profile.batch_size.to_string();
        let values: [Option<&str>; 7] = [
            Some(profile.preferred_system.as_str()),
            profile.listener_state.as_deref(),
            profile.listener_city.as_deref(),
            hf.map(|p| p.frequency.as_str()),
            hf.map(|p| p.mode.as_str()),
            hf.map(|p| p.power.as_str()),
            Some(batch_size.as_str()),
        ];

        for (field, value) in PROFILE_FIELDS.iter().zip(values) {
            let key = profile_key(user, field);
            match value {
                Some(value) => set_setting(&self.pool, &key, value).await?,
                None => delete_setting(&self.pool, &key).await?,
            }
        }

        log::info!("Saved intake profile for {}", user);
        Ok(())
    }

    pub async fn load_profile(&self, user: &str) -> Result<UserProfile> {
        let prefix = profile_key(user, "");
        let rows = sqlx::query("SELECT key, value FROM settings WHERE key LIKE ? || '%'")
            .bind(&prefix)
            .fetch_all(&self.pool)
            .await?;

        let mut fields = std::collections::HashMap::new();
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            if let Some(field) = key.strip_prefix(&prefix) {
                fields.insert(field.to_string(), value);
            }
        }

        let preferred_system = fields
            .remove("preferred_system")
            .ok_or_else(|| IntakeError::ProfileNotFound(user.to_string()))?;

        let batch_size = match fields.remove("batch_size") {
            Some(raw) => raw.parse().map_err(|_| {
                IntakeError::InvalidDefaults(format!("stored batch size '{}' is not a number", raw))
            })?,
            None => default_batch_size(),
        };

        let hf_params = match fields.remove("hf_frequency") {
            Some(frequency) => Some(HfParams {
                frequency,
                mode: fields.remove("hf_mode").unwrap_or_default(),
                power: fields.remove("hf_power").unwrap_or_default(),
            }),
            None => None,
        };

        Ok(UserProfile {
            preferred_system,
            listener_state: fields.remove("listener_state"),
            listener_city: fields.remove("listener_city"),
            hf_params,
            batch_size,
        })
    }
}

impl DefaultsProvider for ProfileStore {
    async fn session_defaults(
        &self,
        user: &str,
        report_date: NaiveDate,
        report_type: &str,
    ) -> Result<SessionDefaults> {
        let defaults = self.load_profile(user).await?.into_defaults(report_date, report_type);
        defaults.validate()?;
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_db;

    fn profile() -> UserProfile {
        UserProfile {
            preferred_system: "HF".to_string(),
            listener_state: Some("Jalisco".to_string()),
            listener_city: Some("Guadalajara".to_string()),
            hf_params: Some(HfParams {
                frequency: "7.082".to_string(),
                mode: "LSB".to_string(),
                power: "100W".to_string(),
            }),
            batch_size: 5,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    }

    #[tokio::test]
    async fn test_setting_upsert() {
        let pool = init_memory_db().await.unwrap();
        assert_eq!(get_setting(&pool, "theme").await.unwrap(), None);

        set_setting(&pool, "theme", "dark").await.unwrap();
        set_setting(&pool, "theme", "light").await.unwrap();
        assert_eq!(get_setting(&pool, "theme").await.unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_profile_roundtrip_into_defaults() {
        let store = ProfileStore::new(init_memory_db().await.unwrap());
        store.save_profile("Operador1", &profile()).await.unwrap();

        let defaults = store.session_defaults("operador1", date(), "Boletín").await.unwrap();
        assert_eq!(defaults.preferred_system, "HF");
        assert_eq!(defaults.listener_state(), "Jalisco");
        assert_eq!(defaults.batch_size, 5);
        assert_eq!(defaults.hf_params.unwrap().mode, "LSB");
        assert_eq!(defaults.report_type, "Boletín");
    }

    #[tokio::test]
    async fn test_resave_clears_optional_fields() {
        let store = ProfileStore::new(init_memory_db().await.unwrap());
        store.save_profile("op", &profile()).await.unwrap();

        let asl = UserProfile {
            preferred_system: "ASL".to_string(),
            hf_params: None,
            listener_city: None,
            ..profile()
        };
        store.save_profile("op", &asl).await.unwrap();

        let loaded = store.load_profile("op").await.unwrap();
        assert_eq!(loaded, asl);
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let store = ProfileStore::new(init_memory_db().await.unwrap());
        let result = store.session_defaults("nadie", date(), "Boletín").await;
        assert!(matches!(result, Err(IntakeError::ProfileNotFound(ref u)) if u == "nadie"));
    }

    #[tokio::test]
    async fn test_profiles_do_not_leak_between_users() {
        let store = ProfileStore::new(init_memory_db().await.unwrap());
        store.save_profile("op", &profile()).await.unwrap();
        assert!(store.load_profile("op2").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_bad_batch_size() {
        let pool = init_memory_db().await.unwrap();
        let store = ProfileStore::new(pool.clone());
        let oversized = UserProfile {
            batch_size: 11,
            ..profile()
        };
        let result = store.save_profile("op", &oversized).await;
        assert!(matches!(result, Err(IntakeError::InvalidDefaults(_))));

        set_setting(&pool, "profile.op.preferred_system", "ASL").await.unwrap();
        set_setting(&pool, "profile.op.batch_size", "many").await.unwrap();
        assert!(store.load_profile("op").await.is_err());
    }
}
