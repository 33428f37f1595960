//! Command handlers
//!
//! Entry points used by the `reportes` binary. Each handler takes its full
//! context (pool, config, request) and returns a serializable response.
//!
//! ## Module Organization
//! - `intake` - run one capture session from a JSON request
//! - `roster` - roster import and call-sign lookup

pub mod intake;
pub mod roster;

pub use intake::{run_intake, IntakeRequest, IntakeResponse};
pub use roster::{import_roster_file, lookup_call_signs, CallSignInfo, ImportSummary};
