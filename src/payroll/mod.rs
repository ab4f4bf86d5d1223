//! Payroll computation.
//!
//! The salary store holds compensation structures, the engine turns them and
//! an attendance summary into one payroll per employee and pay period, and
//! the payslip generator documents each processed payroll.

mod engine;
mod payslip;
mod salary;

pub use engine::{PayrollEngine, ProcessedPayroll};
pub use payslip::PayslipGenerator;
pub use salary::SalaryStructureStore;
