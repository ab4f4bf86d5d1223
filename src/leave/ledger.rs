//! Leave balance ledger.
//!
//! The single source of truth for how many days an employee may still take.
//! Every debit and credit runs under the balance's row lock, so the
//! availability check and the mutation are one atomic step.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::calculate_carry_forward;
use crate::error::{EngineError, EngineResult};
use crate::external::EmployeeDirectory;
use crate::leave::LeaveTypeCatalog;
use crate::models::{BalanceKey, LeaveBalance};
use crate::store::{MemoryStore, lock};

/// Outcome of a yearly initialization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializationReport {
    /// The year initialized.
    pub year: i32,
    /// Balances created by this run.
    pub created: usize,
    /// (employee, leave type) pairs that already had a balance.
    pub skipped: usize,
}

/// Per-employee, per-leave-type, per-year balances.
pub struct LeaveBalanceLedger {
    store: Arc<MemoryStore>,
    catalog: Arc<LeaveTypeCatalog>,
    directory: Arc<dyn EmployeeDirectory>,
}

impl LeaveBalanceLedger {
    /// Creates a ledger.
    pub fn new(
        store: Arc<MemoryStore>,
        catalog: Arc<LeaveTypeCatalog>,
        directory: Arc<dyn EmployeeDirectory>,
    ) -> Self {
        Self {
            store,
            catalog,
            directory,
        }
    }

    /// Returns one balance.
    pub fn get_balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> EngineResult<LeaveBalance> {
        let key = BalanceKey::new(employee_id, leave_type_id, year);
        self.store
            .leave_balances
            .get(&key)
            .ok_or_else(|| balance_not_found(&key))
    }

    /// Every balance an employee holds for `year`, ordered by leave type id.
    pub fn employee_balances(&self, employee_id: Uuid, year: i32) -> Vec<LeaveBalance> {
        let mut balances = self
            .store
            .leave_balances
            .filter(|b| b.employee_id() == employee_id && b.year() == year);
        balances.sort_by_key(|b| b.leave_type_id());
        balances
    }

    /// Opens a balance for every active employee and active leave type that
    /// lacks one for `year`.
    ///
    /// Existing balances are left untouched, so running this twice is
    /// harmless. Carry-forward is taken from the previous year's remaining
    /// days, capped by the leave type policy.
    pub fn initialize_year(&self, year: i32) -> InitializationReport {
        let _references = self.catalog.hold_references();
        let employees = self.directory.active_employees();
        let leave_types = self.catalog.list_active();
        let mut report = InitializationReport {
            year,
            ..Default::default()
        };

        for employee in &employees {
            for leave_type in &leave_types {
                let key = BalanceKey::new(employee.id, leave_type.id, year);
                if self.store.leave_balances.contains(&key) {
                    report.skipped += 1;
                    continue;
                }

                let carry_forward = self.carry_forward_into(&key, leave_type.carry_forward_days);
                let balance = LeaveBalance::open(
                    employee.id,
                    leave_type.id,
                    year,
                    leave_type.max_days_per_year,
                    carry_forward,
                );
                // a concurrent run may have created it since the check
                if self.store.leave_balances.insert_if_absent(key, balance) {
                    report.created += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }

        info!(
            year,
            employees = employees.len(),
            leave_types = leave_types.len(),
            created = report.created,
            skipped = report.skipped,
            "Leave balances initialized"
        );
        report
    }

    /// Opens a single balance, e.g. for an employee who joined mid-year.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the employee or leave type does not exist
    /// - `Conflict` if the balance already exists
    pub fn open_balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        total_days: u32,
    ) -> EngineResult<LeaveBalance> {
        if self.directory.get_employee(employee_id).is_none() {
            return Err(EngineError::not_found("employee", employee_id));
        }
        let _references = self.catalog.hold_references();
        let leave_type = self.catalog.get(leave_type_id)?;

        let key = BalanceKey::new(employee_id, leave_type_id, year);
        let carry_forward = self.carry_forward_into(&key, leave_type.carry_forward_days);
        let balance = LeaveBalance::open(employee_id, leave_type_id, year, total_days, carry_forward);
        self.store
            .leave_balances
            .insert_unique(key, balance.clone())?;

        info!(
            employee_id = %employee_id,
            leave_type = %leave_type.code,
            year,
            total_days,
            carry_forward_days = carry_forward,
            "Leave balance opened"
        );
        Ok(balance)
    }

    /// Consumes `days` from a balance.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the balance does not exist
    /// - `InsufficientBalance` if fewer than `days` remain
    pub fn debit(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        days: u32,
    ) -> EngineResult<LeaveBalance> {
        let key = BalanceKey::new(employee_id, leave_type_id, year);
        let row = self
            .store
            .leave_balances
            .row(&key)
            .ok_or_else(|| balance_not_found(&key))?;
        let mut balance = lock(&row);

        if let Err(err) = balance.debit(days) {
            warn!(
                employee_id = %employee_id,
                leave_type_id = %leave_type_id,
                year,
                days,
                remaining_days = balance.remaining_days(),
                error = %err,
                "Leave debit rejected"
            );
            return Err(err);
        }

        debug!(
            employee_id = %employee_id,
            leave_type_id = %leave_type_id,
            year,
            days,
            remaining_days = balance.remaining_days(),
            "Leave balance debited"
        );
        Ok(balance.clone())
    }

    /// Returns `days` to a balance.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the balance does not exist
    /// - `Validation` if more days would be returned than were used
    pub fn credit(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        days: u32,
    ) -> EngineResult<LeaveBalance> {
        let key = BalanceKey::new(employee_id, leave_type_id, year);
        let row = self
            .store
            .leave_balances
            .row(&key)
            .ok_or_else(|| balance_not_found(&key))?;
        let mut balance = lock(&row);
        balance.credit(days)?;

        debug!(
            employee_id = %employee_id,
            leave_type_id = %leave_type_id,
            year,
            days,
            remaining_days = balance.remaining_days(),
            "Leave balance credited"
        );
        Ok(balance.clone())
    }

    fn carry_forward_into(&self, key: &BalanceKey, cap: u32) -> u32 {
        let previous = key.year.checked_sub(1).and_then(|previous_year| {
            let previous_key = BalanceKey::new(key.employee_id, key.leave_type_id, previous_year);
            self.store.leave_balances.get(&previous_key)
        });
        calculate_carry_forward(previous.as_ref(), cap)
    }
}

fn balance_not_found(key: &BalanceKey) -> EngineError {
    EngineError::not_found(
        "leave balance",
        format!("{}/{}/{}", key.employee_id, key.leave_type_id, key.year),
    )
}
