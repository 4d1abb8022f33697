//! VNAV CLI - Command line tools for the vertical path engine.
//!
//! This crate provides:
//! - vnav-profile: builds a vertical profile for a lateral plan scenario and
//!   prints it as a table or JSON

pub mod config;
pub mod profile;
pub mod scenarios;

pub use config::Config;
pub use profile::{render_table, run_scenario, ProfileReport, ProfileRow};
pub use scenarios::{builtin_scenario, Scenario, BUILTIN_SCENARIOS};
