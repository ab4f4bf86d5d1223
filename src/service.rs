//! The caller-facing HR service.
//!
//! [`HrService`] wires the leave and payroll components over one shared
//! store and exposes the operations controllers, CLIs and other services
//! call. Every operation runs inside a tracing span carrying a fresh
//! correlation id.

use std::sync::Arc;

use tracing::info_span;
use tracing::span::EnteredSpan;
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::external::{AttendanceAggregator, EmployeeDirectory};
use crate::leave::{
    InitializationReport, LeaveApplicationWorkflow, LeaveBalanceLedger, LeaveTypeCatalog,
};
use crate::models::{
    LeaveApplication, LeaveApplicationUpdate, LeaveBalance, NewLeaveApplication, PayPeriod,
    Payroll, PayrollStatus, Payslip,
};
use crate::payroll::{PayrollEngine, PayslipGenerator, ProcessedPayroll, SalaryStructureStore};
use crate::store::MemoryStore;

/// Shared HR service state. Cloning is cheap; clones share all state.
#[derive(Clone)]
pub struct HrService {
    config: Arc<ConfigLoader>,
    catalog: Arc<LeaveTypeCatalog>,
    ledger: Arc<LeaveBalanceLedger>,
    workflow: Arc<LeaveApplicationWorkflow>,
    salaries: Arc<SalaryStructureStore>,
    payroll: Arc<PayrollEngine>,
    payslips: Arc<PayslipGenerator>,
}

impl HrService {
    /// Builds a service over a fresh store and seeds the leave type catalog
    /// from `config`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use hrm_engine::config::ConfigLoader;
    /// use hrm_engine::external::{InMemoryAttendance, InMemoryDirectory};
    /// use hrm_engine::service::HrService;
    ///
    /// let service = HrService::new(
    ///     ConfigLoader::default(),
    ///     Arc::new(InMemoryDirectory::new()),
    ///     Arc::new(InMemoryAttendance::new()),
    /// )
    /// .unwrap();
    /// assert!(service.catalog().list().is_empty());
    /// ```
    pub fn new(
        config: ConfigLoader,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceAggregator>,
    ) -> EngineResult<Self> {
        let store = Arc::new(MemoryStore::new());
        let settings = config.payroll().clone();

        let catalog = Arc::new(LeaveTypeCatalog::new(Arc::clone(&store)));
        catalog.seed(config.leave_types())?;

        let ledger = Arc::new(LeaveBalanceLedger::new(
            Arc::clone(&store),
            Arc::clone(&catalog),
            Arc::clone(&directory),
        ));
        let workflow = Arc::new(LeaveApplicationWorkflow::new(
            Arc::clone(&store),
            Arc::clone(&catalog),
            Arc::clone(&ledger),
            Arc::clone(&directory),
        ));
        let salaries = Arc::new(SalaryStructureStore::new(Arc::clone(&store)));
        let payslips = Arc::new(PayslipGenerator::new(
            Arc::clone(&store),
            Arc::clone(&directory),
            settings.payslip_code_prefix.clone(),
        ));
        let payroll = Arc::new(PayrollEngine::new(
            store,
            Arc::clone(&salaries),
            Arc::clone(&payslips),
            directory,
            attendance,
            settings,
        ));

        Ok(Self {
            config: Arc::new(config),
            catalog,
            ledger,
            workflow,
            salaries,
            payroll,
            payslips,
        })
    }

    /// Submits a leave request.
    pub fn apply_for_leave(&self, request: NewLeaveApplication) -> EngineResult<LeaveApplication> {
        let _span = operation_span("apply_for_leave");
        self.workflow.apply(request)
    }

    /// Approves a pending leave application.
    pub fn approve_leave(
        &self,
        application_id: Uuid,
        approver_id: Uuid,
        remarks: Option<String>,
    ) -> EngineResult<LeaveApplication> {
        let _span = operation_span("approve_leave");
        self.workflow.approve(application_id, approver_id, remarks)
    }

    /// Rejects a pending leave application.
    pub fn reject_leave(
        &self,
        application_id: Uuid,
        approver_id: Uuid,
        remarks: Option<String>,
    ) -> EngineResult<LeaveApplication> {
        let _span = operation_span("reject_leave");
        self.workflow.reject(application_id, approver_id, remarks)
    }

    /// Cancels a leave application on behalf of its owner.
    pub fn cancel_leave(
        &self,
        application_id: Uuid,
        requester_id: Uuid,
    ) -> EngineResult<LeaveApplication> {
        let _span = operation_span("cancel_leave");
        self.workflow.cancel(application_id, requester_id)
    }

    /// Edits a pending leave application.
    pub fn update_leave_application(
        &self,
        application_id: Uuid,
        update: LeaveApplicationUpdate,
    ) -> EngineResult<LeaveApplication> {
        let _span = operation_span("update_leave_application");
        self.workflow.update(application_id, update)
    }

    /// Returns one leave balance.
    pub fn get_leave_balance(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> EngineResult<LeaveBalance> {
        self.ledger.get_balance(employee_id, leave_type_id, year)
    }

    /// Returns every balance an employee holds for `year`.
    pub fn get_employee_leave_balances(&self, employee_id: Uuid, year: i32) -> Vec<LeaveBalance> {
        self.ledger.employee_balances(employee_id, year)
    }

    /// Opens the year's balances for all active employees.
    pub fn initialize_yearly_leave_balances(&self, year: i32) -> InitializationReport {
        let _span = operation_span("initialize_yearly_leave_balances");
        self.ledger.initialize_year(year)
    }

    /// Processes one employee's payroll.
    pub fn process_payroll(
        &self,
        employee_id: Uuid,
        pay_period: PayPeriod,
    ) -> EngineResult<ProcessedPayroll> {
        let _span = operation_span("process_payroll");
        self.payroll.process(employee_id, pay_period)
    }

    /// Processes many employees' payrolls, reporting each outcome.
    pub fn process_bulk_payroll(
        &self,
        pay_period: PayPeriod,
        employee_ids: &[Uuid],
    ) -> Vec<(Uuid, EngineResult<ProcessedPayroll>)> {
        let _span = operation_span("process_bulk_payroll");
        self.payroll.process_bulk(pay_period, employee_ids)
    }

    /// Moves a payroll to a new status.
    pub fn update_payroll_status(
        &self,
        payroll_id: Uuid,
        status: PayrollStatus,
    ) -> EngineResult<Payroll> {
        let _span = operation_span("update_payroll_status");
        self.payroll.update_status(payroll_id, status)
    }

    /// Issues the payslip of a payroll, e.g. to retry a failed automatic
    /// generation.
    pub fn generate_payslip(&self, payroll_id: Uuid) -> EngineResult<Payslip> {
        let _span = operation_span("generate_payslip");
        self.payslips.generate(payroll_id)
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The leave type catalog.
    pub fn catalog(&self) -> &LeaveTypeCatalog {
        &self.catalog
    }

    /// The leave balance ledger.
    pub fn ledger(&self) -> &LeaveBalanceLedger {
        &self.ledger
    }

    /// The leave application workflow.
    pub fn workflow(&self) -> &LeaveApplicationWorkflow {
        &self.workflow
    }

    /// The salary structure store.
    pub fn salaries(&self) -> &SalaryStructureStore {
        &self.salaries
    }

    /// The payroll engine.
    pub fn payroll(&self) -> &PayrollEngine {
        &self.payroll
    }

    /// The payslip generator.
    pub fn payslips(&self) -> &PayslipGenerator {
        &self.payslips
    }
}

fn operation_span(operation: &'static str) -> EnteredSpan {
    info_span!("hr_service", operation, correlation_id = %Uuid::new_v4()).entered()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, EngineSettings};
    use crate::external::{InMemoryAttendance, InMemoryDirectory};
    use crate::models::{LeaveCategory, NewLeaveType};

    #[test]
    fn test_service_is_clone_and_thread_safe() {
        fn assert_shareable<T: Clone + Send + Sync>() {}
        assert_shareable::<HrService>();
    }

    #[test]
    fn test_new_seeds_catalog_from_config() {
        let config = ConfigLoader::from_config(EngineConfig::new(
            EngineSettings::default(),
            vec![NewLeaveType {
                name: "Casual Leave".to_string(),
                code: "CL".to_string(),
                category: LeaveCategory::Paid,
                max_days_per_year: 10,
                is_active: true,
                requires_approval: true,
                allow_encashment: false,
                carry_forward_days: 0,
            }],
        ));
        let service = HrService::new(
            config,
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemoryAttendance::new()),
        )
        .unwrap();

        assert_eq!(service.catalog().get_by_code("CL").unwrap().max_days_per_year, 10);
        assert_eq!(service.config().payroll().payslip_code_prefix, "PS");
    }
}
