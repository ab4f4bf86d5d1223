//! Persistence layer for the HR engine.
//!
//! [`MemoryStore`] keeps one [`Table`] per logical table. Uniqueness rules
//! are enforced by the tables themselves when a row is inserted:
//!
//! | table                | unique key                              |
//! |----------------------|-----------------------------------------|
//! | `leave_types`        | id, code, name                          |
//! | `leave_balances`     | (employee, leave type, year)            |
//! | `leave_applications` | id                                      |
//! | `salary_structures`  | employee                                |
//! | `payrolls`           | (employee, pay period), id              |
//! | `payslips`           | payroll, id, payslip code               |

mod table;

pub use table::{DuplicateKey, KeyedLocks, Row, Table, lock};

use uuid::Uuid;

use crate::models::{
    BalanceKey, LeaveApplication, LeaveBalance, LeaveType, Payroll, PayrollKey, Payslip,
    SalaryStructure,
};

/// All engine state, held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    pub(crate) leave_types: Table<Uuid, LeaveType>,
    pub(crate) leave_type_codes: Table<String, Uuid>,
    pub(crate) leave_type_names: Table<String, Uuid>,
    pub(crate) leave_balances: Table<BalanceKey, LeaveBalance>,
    pub(crate) leave_applications: Table<Uuid, LeaveApplication>,
    pub(crate) salary_structures: Table<Uuid, SalaryStructure>,
    pub(crate) payrolls: Table<PayrollKey, Payroll>,
    pub(crate) payroll_ids: Table<Uuid, PayrollKey>,
    /// Keyed by payroll id.
    pub(crate) payslips: Table<Uuid, Payslip>,
    /// Payslip id to payroll id.
    pub(crate) payslip_ids: Table<Uuid, Uuid>,
    /// Payslip code to payroll id.
    pub(crate) payslip_codes: Table<String, Uuid>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            leave_types: Table::new("leave_types"),
            leave_type_codes: Table::new("leave_types.code"),
            leave_type_names: Table::new("leave_types.name"),
            leave_balances: Table::new("leave_balances"),
            leave_applications: Table::new("leave_applications"),
            salary_structures: Table::new("salary_structures"),
            payrolls: Table::new("payrolls"),
            payroll_ids: Table::new("payrolls.id"),
            payslips: Table::new("payslips"),
            payslip_ids: Table::new("payslips.id"),
            payslip_codes: Table::new("payslips.code"),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
