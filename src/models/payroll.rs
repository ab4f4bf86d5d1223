//! Payroll model and its status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;
use crate::error::{EngineError, EngineResult};

/// Status of a payroll record.
///
/// Advances `Pending → Processed → Paid`; `Cancelled` is reachable from any
/// non-terminal status. `Paid` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollStatus {
    /// Created but not yet computed.
    Pending,
    /// Computed and ready for payment.
    Processed,
    /// Paid out.
    Paid,
    /// Voided.
    Cancelled,
}

impl PayrollStatus {
    /// The persisted form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Pending => "PENDING",
            PayrollStatus::Processed => "PROCESSED",
            PayrollStatus::Paid => "PAID",
            PayrollStatus::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayrollStatus::Paid | PayrollStatus::Cancelled)
    }

    /// Returns true if the state machine allows moving to `next`.
    ///
    /// # Example
    ///
    /// ```
    /// use hrm_engine::models::PayrollStatus;
    ///
    /// assert!(PayrollStatus::Processed.can_transition_to(PayrollStatus::Paid));
    /// assert!(PayrollStatus::Pending.can_transition_to(PayrollStatus::Cancelled));
    /// assert!(!PayrollStatus::Pending.can_transition_to(PayrollStatus::Paid));
    /// assert!(!PayrollStatus::Paid.can_transition_to(PayrollStatus::Cancelled));
    /// ```
    pub fn can_transition_to(&self, next: PayrollStatus) -> bool {
        match (self, next) {
            (PayrollStatus::Pending, PayrollStatus::Processed)
            | (PayrollStatus::Processed, PayrollStatus::Paid) => true,
            (current, PayrollStatus::Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Returns true if a payslip may be issued for a payroll in this status.
    pub fn allows_payslip(&self) -> bool {
        matches!(self, PayrollStatus::Processed | PayrollStatus::Paid)
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayrollStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PayrollStatus::Pending),
            "PROCESSED" => Ok(PayrollStatus::Processed),
            "PAID" => Ok(PayrollStatus::Paid),
            "CANCELLED" => Ok(PayrollStatus::Cancelled),
            other => Err(EngineError::validation(
                "status",
                format!("unknown payroll status '{}'", other),
            )),
        }
    }
}

/// The unique key of a payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayrollKey {
    /// The employee paid.
    pub employee_id: Uuid,
    /// The pay period.
    pub pay_period: PayPeriod,
}

impl PayrollKey {
    /// Creates a payroll key.
    pub fn new(employee_id: Uuid, pay_period: PayPeriod) -> Self {
        Self {
            employee_id,
            pay_period,
        }
    }
}

/// Caller-supplied amounts that are not part of the salary structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollAdjustments {
    /// Overtime earned in the period.
    #[serde(default)]
    pub overtime_pay: Decimal,
    /// Bonus paid in the period.
    #[serde(default)]
    pub bonus: Decimal,
    /// Income tax withheld.
    #[serde(default)]
    pub tax_deduction: Decimal,
    /// Other deductions, before the absence deduction is added.
    #[serde(default)]
    pub other_deductions: Decimal,
}

impl PayrollAdjustments {
    /// Rejects negative amounts.
    pub fn validate(&self) -> EngineResult<()> {
        let fields = [
            ("overtime_pay", self.overtime_pay),
            ("bonus", self.bonus),
            ("tax_deduction", self.tax_deduction),
            ("other_deductions", self.other_deductions),
        ];
        for (field, amount) in fields {
            if amount < Decimal::ZERO {
                return Err(EngineError::validation(
                    field,
                    format!("must not be negative, got {}", amount),
                ));
            }
        }
        Ok(())
    }
}

/// One employee's payroll for one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payroll {
    /// Unique identifier.
    pub id: Uuid,
    /// The employee paid.
    pub employee_id: Uuid,
    /// The pay period.
    pub pay_period: PayPeriod,
    /// Basic salary for the period.
    pub basic_salary: Decimal,
    /// Sum of all allowances.
    pub total_allowances: Decimal,
    /// Overtime earned.
    pub overtime_pay: Decimal,
    /// Bonus paid.
    pub bonus: Decimal,
    /// Income tax withheld.
    pub tax_deduction: Decimal,
    /// Other deductions, including the absence deduction.
    pub other_deductions: Decimal,
    /// Working days in the period.
    pub working_days: u32,
    /// Days present or late.
    pub present_days: u32,
    /// Basic + allowances + overtime + bonus.
    pub gross_salary: Decimal,
    /// Gross less tax and other deductions.
    pub net_salary: Decimal,
    /// Current status.
    pub status: PayrollStatus,
    /// When the payroll was computed.
    pub processed_at: DateTime<Utc>,
}

impl Payroll {
    /// The key this payroll is stored under.
    pub fn key(&self) -> PayrollKey {
        PayrollKey::new(self.employee_id, self.pay_period)
    }

    /// Moves to `next`, failing with `InvalidTransition` if the state
    /// machine does not allow it.
    pub fn transition(&mut self, next: PayrollStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                entity: "payroll",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}
