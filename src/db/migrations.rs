/// SQL migration for the initial schema
///
/// Design principles:
/// - The roster is read by intake and written by the membership side
/// - One row per committed report; HF parameters inline, NULL otherwise
/// - Dates stored as ISO-8601 text (YYYY-MM-DD)
pub const MIGRATION_001: &str = r#"
-- =============================================================================
-- Operators - roster of licensed stations
-- =============================================================================
CREATE TABLE IF NOT EXISTS operators (
    call_sign         TEXT PRIMARY KEY COLLATE NOCASE,
    full_name         TEXT,
    paternal_surname  TEXT,
    maternal_surname  TEXT,

    -- LOCATION
    state             TEXT,
    municipality      TEXT,
    neighborhood      TEXT,
    postal_code       TEXT,
    zone              TEXT,                 -- XE1/XE2/XE3/EXT, may be empty

    -- CONTACT
    phone             TEXT,
    email             TEXT,

    active            INTEGER NOT NULL DEFAULT 1,
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_operators_state ON operators(state);

-- =============================================================================
-- Reports - one row per station heard in a net/bulletin
-- =============================================================================
CREATE TABLE IF NOT EXISTS reports (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid              TEXT NOT NULL UNIQUE,

    call_sign         TEXT NOT NULL,
    operator_name     TEXT NOT NULL DEFAULT '',
    state             TEXT NOT NULL DEFAULT '',
    city              TEXT NOT NULL DEFAULT '',
    zone              TEXT NOT NULL DEFAULT '',     -- empty for SWR relays
    system            TEXT NOT NULL,
    signal_report     INTEGER NOT NULL DEFAULT 59,

    -- HF ONLY
    frequency         TEXT,
    mode              TEXT,
    power             TEXT,

    is_listener_relay INTEGER NOT NULL DEFAULT 0,

    -- SESSION
    report_date       TEXT NOT NULL,
    report_type       TEXT NOT NULL,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_date ON reports(report_date DESC);
CREATE INDEX IF NOT EXISTS idx_reports_call ON reports(call_sign);
CREATE INDEX IF NOT EXISTS idx_reports_zone ON reports(report_date, zone);

-- =============================================================================
-- Settings - key/value store (user profile preferences)
-- =============================================================================
CREATE TABLE IF NOT EXISTS settings (
    key               TEXT PRIMARY KEY,
    value             TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
"#;

/// Ordered list of migrations, applied once each
pub const MIGRATIONS: &[(&str, &str)] = &[("migration_001", MIGRATION_001)];
