//! Payslip generation.
//!
//! A payslip documents exactly one payroll. Its code is derived from the pay
//! period and the employee's business identifier, so a second attempt for
//! the same payroll collides instead of producing a different code.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::external::EmployeeDirectory;
use crate::models::{Payroll, Payslip, PayslipStatus, payslip_code};
use crate::store::{MemoryStore, Row, lock};

/// Issues and tracks payslips.
pub struct PayslipGenerator {
    store: Arc<MemoryStore>,
    directory: Arc<dyn EmployeeDirectory>,
    code_prefix: String,
}

impl PayslipGenerator {
    /// Creates a generator whose codes start with `code_prefix`.
    pub fn new(
        store: Arc<MemoryStore>,
        directory: Arc<dyn EmployeeDirectory>,
        code_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            directory,
            code_prefix: code_prefix.into(),
        }
    }

    /// Issues the payslip for a payroll.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the payroll or its employee does not exist
    /// - `InvalidTransition` if the payroll is neither processed nor paid
    /// - `DuplicatePayslip` if the payroll already has a payslip
    /// - `Conflict` if another payroll already holds the derived code
    pub fn generate(&self, payroll_id: Uuid) -> EngineResult<Payslip> {
        let row = self.payroll_row(payroll_id)?;
        // held until the payslip is stored so the status cannot change under us
        let payroll = lock(&row);
        if !payroll.status.allows_payslip() {
            return Err(EngineError::InvalidTransition {
                entity: "payslip",
                from: payroll.status.to_string(),
                to: PayslipStatus::Generated.to_string(),
            });
        }
        let employee = self
            .directory
            .get_employee(payroll.employee_id)
            .ok_or_else(|| EngineError::not_found("employee", payroll.employee_id))?;

        let now = Utc::now();
        let payslip = Payslip {
            id: Uuid::new_v4(),
            payroll_id,
            payslip_code: payslip_code(&self.code_prefix, payroll.pay_period, &employee.employee_code),
            issue_date: now.date_naive(),
            is_generated: true,
            status: PayslipStatus::Generated,
            updated_at: now,
        };

        self.store
            .payslips
            .insert_unique(payroll_id, payslip.clone())
            .map_err(|_| EngineError::DuplicatePayslip { payroll_id })?;
        if let Err(duplicate) = self
            .store
            .payslip_codes
            .insert_unique(payslip.payslip_code.clone(), payroll_id)
        {
            self.store.payslips.remove(&payroll_id);
            warn!(
                payroll_id = %payroll_id,
                payslip_code = %payslip.payslip_code,
                "Payslip code already issued to another payroll"
            );
            return Err(duplicate.into());
        }
        self.store.payslip_ids.insert_unique(payslip.id, payroll_id)?;

        info!(
            payslip_id = %payslip.id,
            payroll_id = %payroll_id,
            payslip_code = %payslip.payslip_code,
            "Payslip generated"
        );
        Ok(payslip)
    }

    /// Looks up a payslip by id.
    pub fn get(&self, payslip_id: Uuid) -> EngineResult<Payslip> {
        self.store
            .payslip_ids
            .get(&payslip_id)
            .and_then(|payroll_id| self.store.payslips.get(&payroll_id))
            .ok_or_else(|| EngineError::not_found("payslip", payslip_id))
    }

    /// The payslip issued for a payroll.
    pub fn for_payroll(&self, payroll_id: Uuid) -> EngineResult<Payslip> {
        self.store
            .payslips
            .get(&payroll_id)
            .ok_or_else(|| EngineError::not_found("payslip", format!("payroll {}", payroll_id)))
    }

    /// Records that the employee downloaded the payslip.
    pub fn mark_downloaded(&self, payslip_id: Uuid) -> EngineResult<Payslip> {
        self.advance(payslip_id, PayslipStatus::Downloaded)
    }

    /// Archives the payslip.
    pub fn archive(&self, payslip_id: Uuid) -> EngineResult<Payslip> {
        self.advance(payslip_id, PayslipStatus::Archived)
    }

    fn advance(&self, payslip_id: Uuid, next: PayslipStatus) -> EngineResult<Payslip> {
        let row = self
            .store
            .payslip_ids
            .get(&payslip_id)
            .and_then(|payroll_id| self.store.payslips.row(&payroll_id))
            .ok_or_else(|| EngineError::not_found("payslip", payslip_id))?;
        let mut payslip = lock(&row);
        payslip.advance(next)?;

        info!(payslip_id = %payslip_id, status = %next, "Payslip status changed");
        Ok(payslip.clone())
    }

    fn payroll_row(&self, payroll_id: Uuid) -> EngineResult<Row<Payroll>> {
        self.store
            .payroll_ids
            .get(&payroll_id)
            .and_then(|key| self.store.payrolls.row(&key))
            .ok_or_else(|| EngineError::not_found("payroll", payroll_id))
    }
}
