//! Configuration loading and management for the HR engine.
//!
//! This module loads payroll settings and the leave type catalog seed from
//! YAML files.
//!
//! # Example
//!
//! ```no_run
//! use hrm_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Seeding {} leave types", config.leave_types().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, EngineSettings, LeaveTypesConfig, PayrollSettings, WorkingDaysPolicy};
