// Reportes library
// Re-export modules for use in main.rs

pub mod callsign;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod reference;
pub mod roster;

pub use error::{IntakeError, Result};
