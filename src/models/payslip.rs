//! Payslip model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;
use crate::error::{EngineError, EngineResult};

/// Lifecycle of a payslip document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayslipStatus {
    /// Issued.
    Generated,
    /// Fetched by the employee.
    Downloaded,
    /// Retired from the active list.
    Archived,
}

impl PayslipStatus {
    /// The persisted form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayslipStatus::Generated => "GENERATED",
            PayslipStatus::Downloaded => "DOWNLOADED",
            PayslipStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for PayslipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayslipStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERATED" => Ok(PayslipStatus::Generated),
            "DOWNLOADED" => Ok(PayslipStatus::Downloaded),
            "ARCHIVED" => Ok(PayslipStatus::Archived),
            other => Err(EngineError::validation(
                "status",
                format!("unknown payslip status '{}'", other),
            )),
        }
    }
}

/// Builds the deterministic payslip code for a period and employee.
///
/// # Example
///
/// ```
/// use hrm_engine::models::{payslip_code, PayPeriod};
///
/// let period = PayPeriod::new(2024, 3).unwrap();
/// assert_eq!(payslip_code("PS", period, "EMP001"), "PS-202403-EMP001");
/// ```
pub fn payslip_code(prefix: &str, pay_period: PayPeriod, employee_code: &str) -> String {
    format!("{}-{}-{}", prefix, pay_period.compact(), employee_code)
}

/// The payslip issued for exactly one payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier.
    pub id: Uuid,
    /// The payroll this payslip documents.
    pub payroll_id: Uuid,
    /// Deterministic human-readable code.
    pub payslip_code: String,
    /// Date of issue.
    pub issue_date: NaiveDate,
    /// Whether the document has been rendered.
    pub is_generated: bool,
    /// Current status.
    pub status: PayslipStatus,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl Payslip {
    /// Moves the status forward. Statuses never move backwards and
    /// repeating the current status is rejected.
    pub fn advance(&mut self, next: PayslipStatus) -> EngineResult<()> {
        if next <= self.status {
            return Err(EngineError::InvalidTransition {
                entity: "payslip",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
