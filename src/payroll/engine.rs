//! Payroll engine.
//!
//! Derives one payroll per employee and pay period from the salary structure
//! and the attendance summary. The `(employee, pay period)` uniqueness is
//! enforced by the payroll table on insert, so concurrent runs for the same
//! pair produce exactly one payroll.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::calculate_payroll;
use crate::config::{PayrollSettings, WorkingDaysPolicy};
use crate::error::{EngineError, EngineResult};
use crate::external::{AttendanceAggregator, EmployeeDirectory};
use crate::models::{
    AttendanceSummary, AuditTrace, PayPeriod, Payroll, PayrollAdjustments, PayrollKey,
    PayrollStatus, Payslip,
};
use crate::payroll::{PayslipGenerator, SalaryStructureStore};
use crate::store::{MemoryStore, lock};

/// A committed payroll with the audit trail of its computation.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedPayroll {
    /// The stored payroll.
    pub payroll: Payroll,
    /// Every rule applied while computing it.
    pub audit_trace: AuditTrace,
    /// Outcome of the follow-up payslip step, `None` when automatic
    /// generation is switched off. A failure here never undoes the payroll.
    #[serde(skip)]
    pub payslip: Option<EngineResult<Payslip>>,
}

/// Computes and stores payrolls.
pub struct PayrollEngine {
    store: Arc<MemoryStore>,
    salaries: Arc<SalaryStructureStore>,
    payslips: Arc<PayslipGenerator>,
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceAggregator>,
    settings: PayrollSettings,
}

impl PayrollEngine {
    /// Creates a payroll engine.
    pub fn new(
        store: Arc<MemoryStore>,
        salaries: Arc<SalaryStructureStore>,
        payslips: Arc<PayslipGenerator>,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceAggregator>,
        settings: PayrollSettings,
    ) -> Self {
        Self {
            store,
            salaries,
            payslips,
            directory,
            attendance,
            settings,
        }
    }

    /// Processes one employee's payroll with no adjustments.
    pub fn process(&self, employee_id: Uuid, pay_period: PayPeriod) -> EngineResult<ProcessedPayroll> {
        self.process_with(employee_id, pay_period, PayrollAdjustments::default())
    }

    /// Processes one employee's payroll.
    ///
    /// The payroll is stored as `PROCESSED`. If automatic payslips are
    /// enabled one is issued afterwards; its outcome is reported in
    /// [`ProcessedPayroll::payslip`].
    ///
    /// # Errors
    ///
    /// - `DuplicatePayroll` if the employee already has a payroll for the
    ///   period
    /// - `NotFound` if the employee, salary structure or attendance summary
    ///   is missing
    /// - `Validation` if an adjustment is negative, there are no working
    ///   days or a total overflows
    pub fn process_with(
        &self,
        employee_id: Uuid,
        pay_period: PayPeriod,
        adjustments: PayrollAdjustments,
    ) -> EngineResult<ProcessedPayroll> {
        let key = PayrollKey::new(employee_id, pay_period);
        // early exit only; the insert below is what enforces uniqueness
        if self.store.payrolls.contains(&key) {
            return Err(duplicate(&key));
        }

        if self.directory.get_employee(employee_id).is_none() {
            return Err(EngineError::not_found("employee", employee_id));
        }
        let structure = self.salaries.get(employee_id)?;
        let attendance = self.attendance_for(employee_id, pay_period)?;
        let calculation = calculate_payroll(structure.components(), attendance, &adjustments)?;

        for warning in &calculation.audit_trace.warnings {
            warn!(
                employee_id = %employee_id,
                pay_period = %pay_period,
                code = %warning.code,
                "{}",
                warning.message
            );
        }
        debug!(
            employee_id = %employee_id,
            pay_period = %pay_period,
            steps = calculation.audit_trace.steps.len(),
            duration_us = calculation.audit_trace.duration_us,
            "Payroll computed"
        );

        let payroll = Payroll {
            id: Uuid::new_v4(),
            employee_id,
            pay_period,
            basic_salary: calculation.basic_salary,
            total_allowances: calculation.total_allowances,
            overtime_pay: calculation.overtime_pay,
            bonus: calculation.bonus,
            tax_deduction: calculation.tax_deduction,
            other_deductions: calculation.other_deductions,
            working_days: calculation.working_days,
            present_days: calculation.present_days,
            gross_salary: calculation.gross_salary,
            net_salary: calculation.net_salary,
            status: PayrollStatus::Processed,
            processed_at: Utc::now(),
        };

        if self
            .store
            .payrolls
            .insert_unique(key, payroll.clone())
            .is_err()
        {
            warn!(employee_id = %employee_id, pay_period = %pay_period, "Duplicate payroll rejected");
            return Err(duplicate(&key));
        }
        self.store.payroll_ids.insert_unique(payroll.id, key)?;

        info!(
            payroll_id = %payroll.id,
            employee_id = %employee_id,
            pay_period = %pay_period,
            gross_salary = %payroll.gross_salary,
            net_salary = %payroll.net_salary,
            "Payroll processed"
        );

        // post-commit: no payroll lock is held here
        let payslip = self
            .settings
            .auto_generate_payslip
            .then(|| self.payslips.generate(payroll.id));
        if let Some(Err(err)) = &payslip {
            warn!(
                payroll_id = %payroll.id,
                error = %err,
                "Payslip generation failed; payroll kept"
            );
        }

        Ok(ProcessedPayroll {
            payroll,
            audit_trace: calculation.audit_trace,
            payslip,
        })
    }

    /// Processes each employee independently. One employee's failure does
    /// not stop the others; every outcome is returned in input order.
    pub fn process_bulk(
        &self,
        pay_period: PayPeriod,
        employee_ids: &[Uuid],
    ) -> Vec<(Uuid, EngineResult<ProcessedPayroll>)> {
        let results: Vec<(Uuid, EngineResult<ProcessedPayroll>)> = employee_ids
            .iter()
            .map(|&employee_id| (employee_id, self.process(employee_id, pay_period)))
            .collect();

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            pay_period = %pay_period,
            requested = employee_ids.len(),
            processed = results.len() - failed,
            failed,
            "Bulk payroll finished"
        );
        results
    }

    /// Moves a payroll along `PENDING -> PROCESSED -> PAID`, or to
    /// `CANCELLED` from any non-terminal status. Amounts are not recomputed.
    pub fn update_status(&self, payroll_id: Uuid, status: PayrollStatus) -> EngineResult<Payroll> {
        let key = self
            .store
            .payroll_ids
            .get(&payroll_id)
            .ok_or_else(|| EngineError::not_found("payroll", payroll_id))?;
        let row = self
            .store
            .payrolls
            .row(&key)
            .ok_or_else(|| EngineError::not_found("payroll", payroll_id))?;
        let mut payroll = lock(&row);
        let previous = payroll.status;
        payroll.transition(status)?;

        info!(
            payroll_id = %payroll_id,
            from = %previous,
            to = %status,
            "Payroll status changed"
        );
        Ok(payroll.clone())
    }

    /// Looks up a payroll by id.
    pub fn get(&self, payroll_id: Uuid) -> EngineResult<Payroll> {
        self.store
            .payroll_ids
            .get(&payroll_id)
            .and_then(|key| self.store.payrolls.get(&key))
            .ok_or_else(|| EngineError::not_found("payroll", payroll_id))
    }

    /// Looks up the payroll of one employee and period.
    pub fn find(&self, employee_id: Uuid, pay_period: PayPeriod) -> EngineResult<Payroll> {
        let key = PayrollKey::new(employee_id, pay_period);
        self.store.payrolls.get(&key).ok_or_else(|| {
            EngineError::not_found("payroll", format!("{}/{}", employee_id, pay_period))
        })
    }

    /// Every payroll of a period.
    pub fn list_for_period(&self, pay_period: PayPeriod) -> Vec<Payroll> {
        let mut payrolls = self
            .store
            .payrolls
            .filter(|p| p.pay_period == pay_period);
        payrolls.sort_by_key(|p| (p.processed_at, p.id));
        payrolls
    }

    fn attendance_for(
        &self,
        employee_id: Uuid,
        pay_period: PayPeriod,
    ) -> EngineResult<AttendanceSummary> {
        let reported = self.attendance.monthly_attendance_summary(
            employee_id,
            pay_period.year(),
            pay_period.month(),
        )?;
        Ok(match self.settings.working_days {
            WorkingDaysPolicy::Reported => reported,
            WorkingDaysPolicy::Calendar => AttendanceSummary {
                present_days: reported.present_days,
                working_days: pay_period.days_in_month(),
            },
        })
    }
}

fn duplicate(key: &PayrollKey) -> EngineError {
    EngineError::DuplicatePayroll {
        employee_id: key.employee_id,
        pay_period: key.pay_period,
    }
}
