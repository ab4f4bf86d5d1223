//! Configuration types for the HR engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::models::NewLeaveType;

/// Where the payroll engine takes the working-day count from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingDaysPolicy {
    /// Use the working-day count reported by the attendance aggregator.
    #[default]
    Reported,
    /// Use the number of calendar days in the pay period.
    Calendar,
}

/// Payroll settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// Source of the proration denominator.
    pub working_days: WorkingDaysPolicy,
    /// Whether a payslip is issued right after a payroll is processed.
    pub auto_generate_payslip: bool,
    /// Prefix of every payslip code.
    pub payslip_code_prefix: String,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            working_days: WorkingDaysPolicy::Reported,
            auto_generate_payslip: true,
            payslip_code_prefix: "PS".to_string(),
        }
    }
}

/// Engine settings from `engine.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Payroll settings.
    pub payroll: PayrollSettings,
}

/// Leave type catalog file structure (`leave_types.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveTypesConfig {
    /// Catalog entries to seed.
    pub leave_types: Vec<NewLeaveType>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Engine settings.
    settings: EngineSettings,
    /// Leave types to seed the catalog with.
    leave_types: Vec<NewLeaveType>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: EngineSettings, leave_types: Vec<NewLeaveType>) -> Self {
        Self {
            settings,
            leave_types,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the leave type seeds.
    pub fn leave_types(&self) -> &[NewLeaveType] {
        &self.leave_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_engine_settings_use_defaults() {
        let settings: EngineSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert!(settings.payroll.auto_generate_payslip);
        assert_eq!(settings.payroll.payslip_code_prefix, "PS");
        assert_eq!(settings.payroll.working_days, WorkingDaysPolicy::Reported);
    }

    #[test]
    fn test_partial_payroll_settings() {
        let yaml = r#"
payroll:
  working_days: calendar
"#;
        let settings: EngineSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.payroll.working_days, WorkingDaysPolicy::Calendar);
        assert!(settings.payroll.auto_generate_payslip);
    }

    #[test]
    fn test_unknown_working_days_policy_is_rejected() {
        let yaml = r#"
payroll:
  working_days: business
"#;
        assert!(serde_yaml::from_str::<EngineSettings>(yaml).is_err());
    }
}
