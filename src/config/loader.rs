//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::NewLeaveType;

use super::types::{EngineConfig, EngineSettings, LeaveTypesConfig, PayrollSettings};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml       # Payroll settings
/// └── leave_types.yaml  # Leave type catalog seed
/// ```
///
/// # Example
///
/// ```no_run
/// use hrm_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Payslip prefix: {}", loader.payroll().payslip_code_prefix);
/// for leave_type in loader.leave_types() {
///     println!("{} ({})", leave_type.name, leave_type.code);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - Two leave types share a code or name (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;

        let leave_types_path = path.join("leave_types.yaml");
        let leave_types = Self::load_yaml::<LeaveTypesConfig>(&leave_types_path)?.leave_types;
        Self::check_unique_leave_types(&leave_types, &leave_types_path)?;

        tracing::debug!(
            path = %path.display(),
            leave_types = leave_types.len(),
            "Loaded engine configuration"
        );

        Ok(Self {
            config: EngineConfig::new(settings, leave_types),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn check_unique_leave_types(leave_types: &[NewLeaveType], path: &Path) -> EngineResult<()> {
        for (i, leave_type) in leave_types.iter().enumerate() {
            let duplicate = leave_types[..i]
                .iter()
                .find(|other| other.code == leave_type.code || other.name == leave_type.name);
            if let Some(other) = duplicate {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!(
                        "leave types '{}' ({}) and '{}' ({}) share a name or code",
                        other.name, other.code, leave_type.name, leave_type.code
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the payroll settings.
    pub fn payroll(&self) -> &PayrollSettings {
        &self.config.settings().payroll
    }

    /// Returns the leave type seeds.
    pub fn leave_types(&self) -> &[NewLeaveType] {
        self.config.leave_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkingDaysPolicy;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    fn write_config_dir(name: &str, engine: Option<&str>, leave_types: Option<&str>) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hrm_engine_config_{}_{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        if let Some(engine) = engine {
            fs::write(dir.join("engine.yaml"), engine).unwrap();
        }
        if let Some(leave_types) = leave_types {
            fs::write(dir.join("leave_types.yaml"), leave_types).unwrap();
        }
        dir
    }

    const LEAVE_TYPES: &str = r#"
leave_types:
  - name: Casual Leave
    code: CL
    category: PAID
    max_days_per_year: 10
    carry_forward_days: 0
  - name: Sick Leave
    code: SL
    category: SICK
    max_days_per_year: 14
"#;

    #[test]
    fn test_load_valid_directory() {
        let dir = write_config_dir(
            "valid",
            Some("payroll:\n  working_days: calendar\n  payslip_code_prefix: SLIP\n"),
            Some(LEAVE_TYPES),
        );
        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.payroll().working_days, WorkingDaysPolicy::Calendar);
        assert_eq!(loader.payroll().payslip_code_prefix, "SLIP");
        assert_eq!(loader.leave_types().len(), 2);
        assert_eq!(loader.leave_types()[1].code, "SL");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_engine_file() {
        let dir = write_config_dir("missing", None, Some(LEAVE_TYPES));
        let err = ConfigLoader::load(&dir).unwrap_err();
        assert!(matches!(err, EngineError::ConfigNotFound { ref path } if path.ends_with("engine.yaml")));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = write_config_dir("invalid", Some("{}"), Some("leave_types: [ {"));
        let err = ConfigLoader::load(&dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, EngineError::ConfigParseError { .. }));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_duplicate_leave_type_codes_rejected() {
        let leave_types = r#"
leave_types:
  - name: Casual Leave
    code: CL
    category: PAID
    max_days_per_year: 10
  - name: Compensatory Leave
    code: CL
    category: SPECIAL
    max_days_per_year: 5
"#;
        let dir = write_config_dir("duplicate", Some("{}"), Some(leave_types));
        let err = ConfigLoader::load(&dir).unwrap_err();
        assert!(err.to_string().contains("share a name or code"));
        fs::remove_dir_all(dir).unwrap();
    }
}
