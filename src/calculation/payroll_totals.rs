//! Payroll totals calculation.
//!
//! Combines the salary structure, the attendance summary and caller-supplied
//! adjustments into gross and net salary:
//!
//! ```text
//! total_allowances = house_rent + medical + transport + other_allowances
//! other_deductions = standing deductions + adjustments.other_deductions
//!                    + absence deduction
//! gross_salary     = basic + total_allowances + overtime_pay + bonus
//! net_salary       = gross_salary - tax_deduction - other_deductions
//! ```

use std::time::Instant;

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AttendanceSummary, AuditStep, AuditTrace, AuditWarning, PayrollAdjustments, SalaryComponents,
    checked_difference, checked_sum,
};

use super::absence_deduction::calculate_absence_deduction;
use super::allowances::calculate_total_allowances;

/// The derived figures of one payroll.
#[derive(Debug, Clone)]
pub struct PayrollCalculation {
    /// Basic salary.
    pub basic_salary: Decimal,
    /// Sum of all allowances.
    pub total_allowances: Decimal,
    /// Overtime earned.
    pub overtime_pay: Decimal,
    /// Bonus paid.
    pub bonus: Decimal,
    /// Income tax withheld.
    pub tax_deduction: Decimal,
    /// Standing deductions, caller-supplied deductions and the absence
    /// deduction.
    pub other_deductions: Decimal,
    /// The salary structure's standing part of `other_deductions`.
    pub standing_deductions: Decimal,
    /// The absence part of `other_deductions`.
    pub absence_deduction: Decimal,
    /// Working days used as the proration denominator.
    pub working_days: u32,
    /// Days present or late.
    pub present_days: u32,
    /// Basic + allowances + overtime + bonus.
    pub gross_salary: Decimal,
    /// Gross less tax and other deductions.
    pub net_salary: Decimal,
    /// Every rule applied, in order.
    pub audit_trace: AuditTrace,
}

/// Calculates gross and net salary for one employee and one pay period.
///
/// # Errors
///
/// Returns a `Validation` error if any adjustment is negative, the
/// attendance summary has zero working days or a total overflows.
///
/// # Examples
///
/// ```
/// use hrm_engine::calculation::calculate_payroll;
/// use hrm_engine::models::{AttendanceSummary, PayrollAdjustments, SalaryComponents};
/// use rust_decimal::Decimal;
///
/// let components = SalaryComponents {
///     basic_salary: Decimal::from(30000),
///     house_rent: Decimal::from(10000),
///     medical_allowance: Decimal::from(2000),
///     transport_allowance: Decimal::from(1000),
///     ..Default::default()
/// };
/// let attendance = AttendanceSummary { present_days: 28, working_days: 30 };
///
/// let result = calculate_payroll(&components, attendance, &PayrollAdjustments::default()).unwrap();
/// assert_eq!(result.gross_salary, Decimal::from(43000));
/// assert_eq!(result.net_salary, Decimal::from(41000));
/// ```
pub fn calculate_payroll(
    components: &SalaryComponents,
    attendance: AttendanceSummary,
    adjustments: &PayrollAdjustments,
) -> EngineResult<PayrollCalculation> {
    let start_time = Instant::now();
    adjustments.validate()?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let basic_salary = components.basic_salary;

    // Step 1: allowances
    let allowance_result = calculate_total_allowances(components, step_number)?;
    let total_allowances = allowance_result.total_allowances;
    steps.push(allowance_result.audit_step);
    step_number += 1;

    // Step 2: absence deduction
    let absence_result = calculate_absence_deduction(basic_salary, attendance, step_number)?;
    let absence_deduction = absence_result.deduction;
    steps.push(absence_result.audit_step);
    warnings.extend(absence_result.warning);
    step_number += 1;

    // Step 3: other deductions
    let standing_deductions = components.total_deductions;
    let other_deductions = checked_sum(
        "other_deductions",
        [
            standing_deductions,
            adjustments.other_deductions,
            absence_deduction,
        ],
    )?;
    steps.push(AuditStep {
        step_number,
        rule_id: "other_deductions".to_string(),
        rule_name: "Other Deductions".to_string(),
        input: serde_json::json!({
            "standing_deductions": standing_deductions.normalize().to_string(),
            "adjustment": adjustments.other_deductions.normalize().to_string(),
            "absence_deduction": absence_deduction.normalize().to_string()
        }),
        output: serde_json::json!({
            "other_deductions": other_deductions.normalize().to_string()
        }),
        reasoning: format!(
            "Standing {} + adjustment {} + absence {} = {}",
            standing_deductions.normalize(),
            adjustments.other_deductions.normalize(),
            absence_deduction.normalize(),
            other_deductions.normalize()
        ),
    });
    step_number += 1;

    // Step 4: gross
    let gross_salary = checked_sum(
        "gross_salary",
        [
            basic_salary,
            total_allowances,
            adjustments.overtime_pay,
            adjustments.bonus,
        ],
    )?;
    steps.push(AuditStep {
        step_number,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.normalize().to_string(),
            "total_allowances": total_allowances.normalize().to_string(),
            "overtime_pay": adjustments.overtime_pay.normalize().to_string(),
            "bonus": adjustments.bonus.normalize().to_string()
        }),
        output: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Basic {} + allowances {} + overtime {} + bonus {} = {}",
            basic_salary.normalize(),
            total_allowances.normalize(),
            adjustments.overtime_pay.normalize(),
            adjustments.bonus.normalize(),
            gross_salary.normalize()
        ),
    });
    step_number += 1;

    // Step 5: net
    let net_salary = checked_difference(
        "net_salary",
        gross_salary,
        [adjustments.tax_deduction, other_deductions],
    )?;
    steps.push(AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "tax_deduction": adjustments.tax_deduction.normalize().to_string(),
            "other_deductions": other_deductions.normalize().to_string()
        }),
        output: serde_json::json!({
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Gross {} - tax {} - other deductions {} = {}",
            gross_salary.normalize(),
            adjustments.tax_deduction.normalize(),
            other_deductions.normalize(),
            net_salary.normalize()
        ),
    });

    if net_salary < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: "NEGATIVE_NET_SALARY".to_string(),
            message: format!("Deductions exceed gross salary by {}", -net_salary),
            severity: "high".to_string(),
        });
    }

    Ok(PayrollCalculation {
        basic_salary,
        total_allowances,
        overtime_pay: adjustments.overtime_pay,
        bonus: adjustments.bonus,
        tax_deduction: adjustments.tax_deduction,
        other_deductions,
        standing_deductions,
        absence_deduction,
        working_days: attendance.working_days,
        present_days: attendance.present_days,
        gross_salary,
        net_salary,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    })
}
