//! Calculation logic for the HR engine.
//!
//! This module contains the pure calculations behind the leave ledger and
//! the payroll engine: inclusive leave-day counting, date range overlap,
//! year-end carry-forward, allowance totals, absence deductions and the
//! gross/net payroll totals.

mod absence_deduction;
mod allowances;
mod carry_forward;
mod leave_days;
mod payroll_totals;

pub use absence_deduction::{
    AbsenceDeductionResult, MONEY_DECIMAL_PLACES, calculate_absence_deduction,
};
pub use allowances::{AllowanceTotalResult, calculate_total_allowances};
pub use carry_forward::calculate_carry_forward;
pub use leave_days::{calculate_leave_days, date_ranges_overlap};
pub use payroll_totals::{PayrollCalculation, calculate_payroll};
