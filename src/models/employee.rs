//! Employee directory and attendance records.
//!
//! The engine does not own employees. These types describe what it reads
//! from the external directory and the attendance aggregator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employment status as reported by the employee directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    /// Currently employed.
    Active,
    /// On extended leave or suspended.
    Inactive,
    /// No longer employed.
    Terminated,
}

/// An employee as seen through the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// Human-readable business identifier (e.g., "EMP001").
    pub employee_code: String,
    /// The department the employee belongs to.
    pub department_id: Option<Uuid>,
    /// The employee's line manager.
    pub manager_id: Option<Uuid>,
    /// Employment status.
    pub status: EmployeeStatus,
}

impl EmployeeRecord {
    /// Returns true if the employee is currently employed.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrm_engine::models::{EmployeeRecord, EmployeeStatus};
    /// use uuid::Uuid;
    ///
    /// let employee = EmployeeRecord {
    ///     id: Uuid::new_v4(),
    ///     employee_code: "EMP001".to_string(),
    ///     department_id: None,
    ///     manager_id: None,
    ///     status: EmployeeStatus::Active,
    /// };
    /// assert!(employee.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Aggregated attendance for one employee over one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Days marked present or late.
    pub present_days: u32,
    /// Days the employee was expected to work.
    pub working_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_employee(status: EmployeeStatus) -> EmployeeRecord {
        EmployeeRecord {
            id: Uuid::new_v4(),
            employee_code: "EMP001".to_string(),
            department_id: None,
            manager_id: None,
            status,
        }
    }

    #[test]
    fn test_is_active_only_for_active_status() {
        assert!(create_employee(EmployeeStatus::Active).is_active());
        assert!(!create_employee(EmployeeStatus::Inactive).is_active());
        assert!(!create_employee(EmployeeStatus::Terminated).is_active());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EmployeeStatus::Terminated).unwrap(),
            "\"TERMINATED\""
        );
        assert!(serde_json::from_str::<EmployeeStatus>("\"RETIRED\"").is_err());
    }

    #[test]
    fn test_deserialize_attendance_summary() {
        let json = r#"{ "present_days": 28, "working_days": 30 }"#;
        let summary: AttendanceSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.present_days, 28);
        assert_eq!(summary.working_days, 30);
    }
}
