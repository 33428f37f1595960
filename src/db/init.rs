// Database initialization and migration handling
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

use crate::config::AppConfig;
use crate::db::migrations::MIGRATIONS;
use crate::error::Result;

/// Open (or create) the database file and bring the schema up to date
pub async fn init_db(config: &AppConfig) -> Result<SqlitePool> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db_url = format!("sqlite:{}?mode=rwc", config.db_path.display());

    log::info!("Initializing database at: {}", config.db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better performance
    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;

    run_migrations(&pool).await?;

    log::info!("Database initialization complete");

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
pub async fn init_memory_db() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Split a migration into executable statements, dropping comment lines
fn statements(migration: &str) -> Vec<String> {
    migration
        .split(';')
        .map(|statement| {
            statement
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Run all pending migrations
async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    for (name, migration) in MIGRATIONS {
        let applied: bool = sqlx::query("SELECT COUNT(*) as count FROM _migrations WHERE name = ?")
            .bind(*name)
            .fetch_one(pool)
            .await
            .map(|row| row.get::<i64, _>("count") > 0)?;
        if applied {
            continue;
        }

        log::info!("Applying {}...", name);
        let mut tx = pool.begin().await?;
        for statement in statements(migration) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO _migrations (name, applied_at) VALUES (?, datetime('now'))")
            .bind(*name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        log::info!("{} applied successfully", name);
    }

    Ok(())
}

/// Row counts for startup diagnostics
pub async fn get_db_stats(pool: &SqlitePool) -> Result<DbStats> {
    let operator_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operators WHERE active = 1")
        .fetch_one(pool)
        .await?;
    let report_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(pool)
        .await?;

    Ok(DbStats {
        operator_count,
        report_count,
    })
}

#[derive(Debug, serde::Serialize)]
pub struct DbStats {
    pub operator_count: i64,
    pub report_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::MIGRATION_001;

    #[test]
    fn test_statements_strip_comments() {
        let parsed = statements(MIGRATION_001);
        assert!(parsed.iter().all(|s| !s.starts_with("--")));
        assert!(parsed.iter().any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS operators")));
        assert!(parsed.iter().any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS settings")));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = init_memory_db().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);

        let stats = get_db_stats(&pool).await.unwrap();
        assert_eq!(stats.operator_count, 0);
        assert_eq!(stats.report_count, 0);
    }

    #[tokio::test]
    async fn test_init_db_creates_file() {
        let dir = std::env::temp_dir().join(format!("reportes-test-{}", uuid::Uuid::new_v4()));
        let config = AppConfig {
            db_path: dir.join("reportes.db"),
            ..AppConfig::default()
        };
        let pool = init_db(&config).await.unwrap();
        assert!(config.db_path.exists());
        pool.close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
