//! Integration tests for the HR leave and payroll engine.
//!
//! This test suite drives `HrService` over the shipped `config/default`
//! configuration and covers:
//! - Leave day counting and overlap rejection
//! - Balance exhaustion and the approve/cancel round trip
//! - Yearly initialization and carry-forward
//! - Payroll arithmetic, duplicate rejection and bulk isolation
//! - Payslip issue
//! - Concurrent approvals and concurrent payroll runs
//! - Serialized shapes at the textual boundary

use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use uuid::Uuid;

use hrm_engine::config::ConfigLoader;
use hrm_engine::error::{EngineError, ErrorKind};
use hrm_engine::external::{InMemoryAttendance, InMemoryDirectory};
use hrm_engine::models::{
    AttendanceSummary, EmployeeRecord, EmployeeStatus, LeaveApplicationUpdate, LeaveCategory,
    LeaveStatus, LeaveType, LeaveTypeUpdate, NewLeaveApplication, NewLeaveType, PayPeriod,
    PayrollAdjustments, PayrollStatus, PayslipStatus, SalaryComponents,
};
use hrm_engine::service::HrService;

// =============================================================================
// Test Helpers
// =============================================================================

struct TestContext {
    service: HrService,
    directory: Arc<InMemoryDirectory>,
    attendance: Arc<InMemoryAttendance>,
}

fn create_context() -> TestContext {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let directory = Arc::new(InMemoryDirectory::new());
    let attendance = Arc::new(InMemoryAttendance::new());
    let service = HrService::new(config, directory.clone(), attendance.clone())
        .expect("Failed to build service");
    TestContext {
        service,
        directory,
        attendance,
    }
}

fn add_employee(ctx: &TestContext, code: &str) -> Uuid {
    let id = Uuid::new_v4();
    ctx.directory.upsert(EmployeeRecord {
        id,
        employee_code: code.to_string(),
        department_id: None,
        manager_id: None,
        status: EmployeeStatus::Active,
    });
    id
}

fn add_paid_employee(ctx: &TestContext, code: &str, present_days: u32, working_days: u32) -> Uuid {
    let id = add_employee(ctx, code);
    ctx.service
        .salaries()
        .create(
            id,
            SalaryComponents {
                basic_salary: dec!(30000),
                house_rent: dec!(10000),
                medical_allowance: dec!(2000),
                transport_allowance: dec!(1000),
                other_allowances: dec!(0),
                total_deductions: dec!(0),
            },
        )
        .unwrap();
    ctx.attendance.record(
        id,
        march(),
        AttendanceSummary {
            present_days,
            working_days,
        },
    );
    id
}

fn leave_type(ctx: &TestContext, code: &str) -> LeaveType {
    ctx.service.catalog().get_by_code(code).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn march() -> PayPeriod {
    "2024-03".parse().unwrap()
}

fn leave_request(employee_id: Uuid, leave_type: &LeaveType, start: &str, end: &str) -> NewLeaveApplication {
    NewLeaveApplication {
        employee_id,
        leave_type_id: leave_type.id,
        start_date: date(start),
        end_date: date(end),
        reason: "personal".to_string(),
        contact_info: Some("+1 555 0100".to_string()),
    }
}

fn remaining(ctx: &TestContext, employee_id: Uuid, leave_type: &LeaveType) -> u32 {
    ctx.service
        .get_leave_balance(employee_id, leave_type.id, 2024)
        .unwrap()
        .remaining_days()
}

// =============================================================================
// SECTION 1: Configuration and catalog
// =============================================================================

#[test]
fn test_default_config_seeds_catalog() {
    let ctx = create_context();
    let codes: Vec<String> = ctx
        .service
        .catalog()
        .list()
        .into_iter()
        .map(|t| t.code)
        .collect();
    assert_eq!(codes, vec!["AL", "CL", "LWP", "ML", "PL", "SL"]);

    let annual = leave_type(&ctx, "AL");
    assert_eq!(annual.max_days_per_year, 20);
    assert_eq!(annual.carry_forward_days, 5);
    assert!(annual.allow_encashment);
}

#[test]
fn test_referenced_leave_type_cannot_be_deleted() {
    let ctx = create_context();
    add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);

    let casual = leave_type(&ctx, "CL");
    let err = ctx.service.catalog().delete(casual.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // a type nobody holds a balance for can go
    let retired = ctx
        .service
        .catalog()
        .create(NewLeaveType {
            name: "Study Leave".to_string(),
            code: "STL".to_string(),
            category: LeaveCategory::Special,
            max_days_per_year: 5,
            is_active: true,
            requires_approval: true,
            allow_encashment: false,
            carry_forward_days: 0,
        })
        .unwrap();
    assert!(ctx.service.catalog().delete(retired.id).is_ok());
}

// =============================================================================
// SECTION 2: Leave applications
// =============================================================================

#[test]
fn test_total_days_inclusive_count() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let casual = leave_type(&ctx, "CL");

    let single = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-01-01", "2024-01-01"))
        .unwrap();
    assert_eq!(single.total_days, 1);

    let week = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-01-02", "2024-01-06"))
        .unwrap();
    assert_eq!(week.total_days, 5);
}

#[test]
fn test_overlap_with_approved_application() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let annual = leave_type(&ctx, "AL");

    let first = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &annual, "2024-03-10", "2024-03-15"))
        .unwrap();
    ctx.service
        .approve_leave(first.id, Uuid::new_v4(), None)
        .unwrap();

    let err = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &annual, "2024-03-12", "2024-03-20"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(err, EngineError::OverlappingLeave { existing_id, .. } if existing_id == first.id));

    let adjacent = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &annual, "2024-03-16", "2024-03-20"))
        .unwrap();
    assert_eq!(adjacent.status, LeaveStatus::Pending);
}

#[test]
fn test_overlap_is_per_employee() {
    let ctx = create_context();
    let alice = add_employee(&ctx, "EMP001");
    let bob = add_employee(&ctx, "EMP002");
    ctx.service.initialize_yearly_leave_balances(2024);
    let casual = leave_type(&ctx, "CL");

    ctx.service
        .apply_for_leave(leave_request(alice, &casual, "2024-03-10", "2024-03-12"))
        .unwrap();
    assert!(
        ctx.service
            .apply_for_leave(leave_request(bob, &casual, "2024-03-10", "2024-03-12"))
            .is_ok()
    );
}

#[test]
fn test_balance_exhaustion() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    let casual = leave_type(&ctx, "CL");
    ctx.service
        .ledger()
        .open_balance(employee_id, casual.id, 2024, 5)
        .unwrap();
    assert_eq!(remaining(&ctx, employee_id, &casual), 5);

    let err = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-04-01", "2024-04-06"))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientBalance {
            requested: 6,
            remaining: 5
        }
    );

    let application = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-04-01", "2024-04-05"))
        .unwrap();
    ctx.service
        .approve_leave(application.id, Uuid::new_v4(), Some("approved".to_string()))
        .unwrap();
    assert_eq!(remaining(&ctx, employee_id, &casual), 0);
}

#[test]
fn test_approve_then_cancel_restores_used_days() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let sick = leave_type(&ctx, "SL");
    ctx.service
        .ledger()
        .debit(employee_id, sick.id, 2024, 2)
        .unwrap();
    let before = ctx
        .service
        .get_leave_balance(employee_id, sick.id, 2024)
        .unwrap();

    let application = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &sick, "2024-05-06", "2024-05-09"))
        .unwrap();
    ctx.service
        .approve_leave(application.id, Uuid::new_v4(), None)
        .unwrap();
    assert_eq!(
        ctx.service
            .get_leave_balance(employee_id, sick.id, 2024)
            .unwrap()
            .used_days(),
        6
    );

    let cancelled = ctx.service.cancel_leave(application.id, employee_id).unwrap();
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    let after = ctx
        .service
        .get_leave_balance(employee_id, sick.id, 2024)
        .unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_only_owner_may_cancel() {
    let ctx = create_context();
    let alice = add_employee(&ctx, "EMP001");
    let bob = add_employee(&ctx, "EMP002");
    ctx.service.initialize_yearly_leave_balances(2024);
    let casual = leave_type(&ctx, "CL");

    let application = ctx
        .service
        .apply_for_leave(leave_request(alice, &casual, "2024-03-10", "2024-03-10"))
        .unwrap();
    let err = ctx.service.cancel_leave(application.id, bob).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_rejected_application_is_terminal() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let casual = leave_type(&ctx, "CL");

    let application = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-03-10", "2024-03-11"))
        .unwrap();
    let rejected = ctx
        .service
        .reject_leave(application.id, Uuid::new_v4(), Some("short staffed".to_string()))
        .unwrap();
    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(remaining(&ctx, employee_id, &casual), 10);

    for result in [
        ctx.service.approve_leave(application.id, Uuid::new_v4(), None),
        ctx.service.cancel_leave(application.id, employee_id),
    ] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidTransition);
    }
}

#[test]
fn test_update_pending_application() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let casual = leave_type(&ctx, "CL");
    let annual = leave_type(&ctx, "AL");

    let application = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-07-01", "2024-07-03"))
        .unwrap();
    let updated = ctx
        .service
        .update_leave_application(
            application.id,
            LeaveApplicationUpdate {
                leave_type_id: Some(annual.id),
                end_date: Some(date("2024-07-12")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.leave_type_id, annual.id);
    assert_eq!(updated.total_days, 12);
}

#[test]
fn test_inactive_leave_type_cannot_be_applied_for() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let paternity = leave_type(&ctx, "PL");
    ctx.service
        .catalog()
        .update(
            paternity.id,
            LeaveTypeUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

    let err = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &paternity, "2024-03-10", "2024-03-11"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// SECTION 3: Yearly initialization
// =============================================================================

#[test]
fn test_initialize_year_covers_active_employees_and_types() {
    let ctx = create_context();
    let alice = add_employee(&ctx, "EMP001");
    add_employee(&ctx, "EMP002");
    ctx.directory.upsert(EmployeeRecord {
        id: Uuid::new_v4(),
        employee_code: "EMP003".to_string(),
        department_id: None,
        manager_id: None,
        status: EmployeeStatus::Inactive,
    });

    let report = ctx.service.initialize_yearly_leave_balances(2024);
    assert_eq!(report.created, 12);
    assert_eq!(ctx.service.get_employee_leave_balances(alice, 2024).len(), 6);

    let again = ctx.service.initialize_yearly_leave_balances(2024);
    assert_eq!(again.created, 0);
    assert_eq!(again.skipped, 12);
}

#[test]
fn test_carry_forward_into_next_year() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2023);
    let annual = leave_type(&ctx, "AL");
    ctx.service
        .ledger()
        .debit(employee_id, annual.id, 2023, 18)
        .unwrap();

    ctx.service.initialize_yearly_leave_balances(2024);
    let balance = ctx
        .service
        .get_leave_balance(employee_id, annual.id, 2024)
        .unwrap();
    // 2 days left over, below the cap of 5
    assert_eq!(balance.carry_forward_days(), 2);
    assert_eq!(balance.remaining_days(), 22);
}

// =============================================================================
// SECTION 4: Payroll
// =============================================================================

#[test]
fn test_reference_payroll_arithmetic() {
    let ctx = create_context();
    let employee_id = add_paid_employee(&ctx, "EMP001", 28, 30);

    let processed = ctx.service.process_payroll(employee_id, march()).unwrap();
    let payroll = &processed.payroll;
    assert_eq!(payroll.total_allowances, dec!(13000));
    assert_eq!(payroll.other_deductions, dec!(2000));
    assert_eq!(payroll.gross_salary, dec!(43000));
    assert_eq!(payroll.net_salary, dec!(41000));
    assert_eq!(payroll.status, PayrollStatus::Processed);

    let absence = processed.audit_trace.step("absence_deduction").unwrap();
    assert_eq!(absence.output["per_day_rate"], "1000");
    assert_eq!(absence.output["deduction"], "2000");
}

#[test]
fn test_standing_deductions_reach_the_payroll() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP007");
    let structure = ctx
        .service
        .salaries()
        .create(
            employee_id,
            SalaryComponents {
                basic_salary: dec!(30000),
                total_deductions: dec!(500),
                ..Default::default()
            },
        )
        .unwrap();
    ctx.attendance.record(
        employee_id,
        march(),
        AttendanceSummary {
            present_days: 30,
            working_days: 30,
        },
    );

    let processed = ctx.service.process_payroll(employee_id, march()).unwrap();
    assert_eq!(processed.payroll.other_deductions, dec!(500));
    assert_eq!(processed.payroll.net_salary, structure.net_salary());
    assert_eq!(processed.payroll.net_salary, dec!(29500));
}

#[test]
fn test_overflowing_amounts_are_rejected_without_storing() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP008");
    let err = ctx
        .service
        .salaries()
        .create(
            employee_id,
            SalaryComponents {
                basic_salary: Decimal::MAX,
                house_rent: dec!(1),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(ctx.service.salaries().get(employee_id).is_err());

    let employee_id = add_paid_employee(&ctx, "EMP009", 30, 30);
    let err = ctx
        .service
        .payroll()
        .process_with(
            employee_id,
            march(),
            PayrollAdjustments {
                bonus: Decimal::MAX,
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(ctx.service.payroll().find(employee_id, march()).is_err());
}

#[test]
fn test_duplicate_payroll_rejected() {
    let ctx = create_context();
    let employee_id = add_paid_employee(&ctx, "EMP001", 30, 30);

    ctx.service.process_payroll(employee_id, march()).unwrap();
    let err = ctx.service.process_payroll(employee_id, march()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_bulk_payroll_isolates_failures() {
    let ctx = create_context();
    let paid = add_paid_employee(&ctx, "EMP001", 30, 30);
    // in the directory but without a salary structure
    let unpaid = add_employee(&ctx, "EMP002");
    let already = add_paid_employee(&ctx, "EMP003", 30, 30);
    ctx.service.process_payroll(already, march()).unwrap();

    let results = ctx
        .service
        .process_bulk_payroll(march(), &[paid, unpaid, already]);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].1.as_ref().unwrap_err().kind(), ErrorKind::NotFound);
    assert!(matches!(
        results[2].1,
        Err(EngineError::DuplicatePayroll { .. })
    ));
    assert_eq!(ctx.service.payroll().list_for_period(march()).len(), 2);
}

#[test]
fn test_payroll_status_lifecycle() {
    let ctx = create_context();
    let employee_id = add_paid_employee(&ctx, "EMP001", 30, 30);
    let payroll_id = ctx
        .service
        .process_payroll(employee_id, march())
        .unwrap()
        .payroll
        .id;

    let paid = ctx
        .service
        .update_payroll_status(payroll_id, PayrollStatus::Paid)
        .unwrap();
    assert_eq!(paid.status, PayrollStatus::Paid);

    let err = ctx
        .service
        .update_payroll_status(payroll_id, PayrollStatus::Processed)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_payroll_processing_issues_payslip() {
    let ctx = create_context();
    let employee_id = add_paid_employee(&ctx, "EMP042", 30, 30);

    let processed = ctx.service.process_payroll(employee_id, march()).unwrap();
    let payslip = processed.payslip.unwrap().unwrap();
    assert_eq!(payslip.payslip_code, "PS-202403-EMP042");
    assert_eq!(payslip.status, PayslipStatus::Generated);

    // regeneration is detected, not duplicated
    let err = ctx
        .service
        .generate_payslip(processed.payroll.id)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::DuplicatePayslip {
            payroll_id: processed.payroll.id
        }
    );
}

// =============================================================================
// SECTION 5: Concurrency
// =============================================================================

#[test]
fn test_concurrent_approvals_never_overdraw() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    let casual = leave_type(&ctx, "CL");
    ctx.service
        .ledger()
        .open_balance(employee_id, casual.id, 2024, 5)
        .unwrap();

    // both fit individually, together they exceed the balance
    let first = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-06-03", "2024-06-05"))
        .unwrap();
    let second = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-06-10", "2024-06-12"))
        .unwrap();

    let results = thread::scope(|scope| {
        let handles: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|id| {
                let service = ctx.service.clone();
                scope.spawn(move || service.approve_leave(id, Uuid::new_v4(), None))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(remaining(&ctx, employee_id, &casual), 2);
}

#[test]
fn test_concurrent_payroll_runs_produce_one_payroll() {
    let ctx = create_context();
    let employee_id = add_paid_employee(&ctx, "EMP001", 28, 30);

    let results = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = ctx.service.clone();
                scope.spawn(move || service.process_payroll(employee_id, march()))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(matches!(
        results.iter().find_map(|r| r.as_ref().err()),
        Some(EngineError::DuplicatePayroll { .. })
    ));
    assert_eq!(ctx.service.payroll().list_for_period(march()).len(), 1);
}

#[test]
fn test_initialize_year_alongside_applications() {
    let ctx = create_context();
    let employee_id = add_employee(&ctx, "EMP001");
    ctx.service.initialize_yearly_leave_balances(2024);
    let casual = leave_type(&ctx, "CL");
    let application = ctx
        .service
        .apply_for_leave(leave_request(employee_id, &casual, "2024-02-05", "2024-02-07"))
        .unwrap();

    thread::scope(|scope| {
        let initializer = ctx.service.clone();
        scope.spawn(move || initializer.initialize_yearly_leave_balances(2024));
        let approver = ctx.service.clone();
        scope.spawn(move || approver.approve_leave(application.id, Uuid::new_v4(), None));
    });

    // initialization never overwrote the debited balance
    assert_eq!(remaining(&ctx, employee_id, &casual), 7);
}

// =============================================================================
// SECTION 6: Serialized shapes
// =============================================================================

#[test]
fn test_payroll_serializes_period_and_status_as_text() {
    let ctx = create_context();
    let employee_id = add_paid_employee(&ctx, "EMP001", 28, 30);
    let processed = ctx.service.process_payroll(employee_id, march()).unwrap();

    let json: Value = serde_json::to_value(&processed.payroll).unwrap();
    assert_eq!(json["pay_period"], "2024-03");
    assert_eq!(json["status"], "PROCESSED");
    let net: Decimal = json["net_salary"].as_str().unwrap().parse().unwrap();
    assert_eq!(net, dec!(41000));
}

#[test]
fn test_unknown_status_is_rejected_at_the_boundary() {
    assert!(serde_json::from_str::<LeaveStatus>("\"ON_HOLD\"").is_err());
    assert!("SETTLED".parse::<PayrollStatus>().is_err());
    assert!(serde_json::from_str::<PayPeriod>("\"2024-13\"").is_err());
}
