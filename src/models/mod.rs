//! Core data models for the HR engine.
//!
//! This module contains every record the leave ledger, the leave workflow
//! and the payroll engine read or write. Entities reference each other by
//! identifier only.

mod audit;
mod employee;
mod leave_application;
mod leave_balance;
mod leave_type;
mod money;
mod pay_period;
mod payroll;
mod payslip;
mod salary_structure;

pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use employee::{AttendanceSummary, EmployeeRecord, EmployeeStatus};
pub use leave_application::{
    LeaveApplication, LeaveApplicationUpdate, LeaveStatus, NewLeaveApplication,
};
pub use leave_balance::{BalanceKey, LeaveBalance};
pub(crate) use money::{checked_difference, checked_sum};
pub use leave_type::{LeaveCategory, LeaveType, LeaveTypeUpdate, NewLeaveType};
pub use pay_period::PayPeriod;
pub use payroll::{Payroll, PayrollAdjustments, PayrollKey, PayrollStatus};
pub use payslip::{Payslip, PayslipStatus, payslip_code};
pub use salary_structure::{SalaryComponents, SalaryStructure};
