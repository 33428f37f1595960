pub mod init;
pub mod migrations;
pub mod reports;
pub mod roster;
pub mod settings;

pub use init::{get_db_stats, init_db, init_memory_db, DbStats};
pub use reports::{summarize_reports, ReportSummary, SqliteReportSink};
pub use roster::SqliteRoster;
pub use settings::{get_setting, set_setting, ProfileStore, UserProfile};
