//! Absence deduction calculation.
//!
//! Basic salary is prorated over the working days of the pay period; every
//! working day not attended is deducted at the per-day rate.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceSummary, AuditStep, AuditWarning};

/// Decimal places monetary results are rounded to.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// The result of the absence deduction calculation.
#[derive(Debug, Clone)]
pub struct AbsenceDeductionResult {
    /// Basic salary divided by working days.
    pub per_day_rate: Decimal,
    /// Working days not attended.
    pub absent_days: u32,
    /// `per_day_rate * absent_days`, rounded to cents.
    pub deduction: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Raised when more days were attended than there were working days.
    pub warning: Option<AuditWarning>,
}

/// Calculates the salary deduction for days not attended.
///
/// `absent_days` is `working_days - present_days`, floored at zero. The
/// deduction is rounded to two decimal places, midpoint away from zero.
///
/// # Errors
///
/// Returns a `Validation` error if `working_days` is zero or the deduction
/// overflows.
///
/// # Examples
///
/// ```
/// use hrm_engine::calculation::calculate_absence_deduction;
/// use hrm_engine::models::AttendanceSummary;
/// use rust_decimal::Decimal;
///
/// let attendance = AttendanceSummary { present_days: 28, working_days: 30 };
/// let result = calculate_absence_deduction(Decimal::from(30000), attendance, 1).unwrap();
/// assert_eq!(result.per_day_rate, Decimal::from(1000));
/// assert_eq!(result.absent_days, 2);
/// assert_eq!(result.deduction, Decimal::from(2000));
/// ```
pub fn calculate_absence_deduction(
    basic_salary: Decimal,
    attendance: AttendanceSummary,
    step_number: u32,
) -> EngineResult<AbsenceDeductionResult> {
    if attendance.working_days == 0 {
        return Err(EngineError::validation(
            "working_days",
            "cannot prorate salary over zero working days",
        ));
    }

    let per_day_rate = basic_salary / Decimal::from(attendance.working_days);
    let absent_days = attendance
        .working_days
        .saturating_sub(attendance.present_days);
    let deduction = per_day_rate
        .checked_mul(Decimal::from(absent_days))
        .ok_or_else(|| {
            EngineError::validation("absence_deduction", "amount exceeds the representable range")
        })?
        .round_dp_with_strategy(
            MONEY_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        );

    let warning = (attendance.present_days > attendance.working_days).then(|| AuditWarning {
        code: "PRESENT_EXCEEDS_WORKING_DAYS".to_string(),
        message: format!(
            "{} present days reported against {} working days; no absence deducted",
            attendance.present_days, attendance.working_days
        ),
        severity: "medium".to_string(),
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "absence_deduction".to_string(),
        rule_name: "Absence Deduction".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.normalize().to_string(),
            "working_days": attendance.working_days,
            "present_days": attendance.present_days
        }),
        output: serde_json::json!({
            "per_day_rate": per_day_rate.normalize().to_string(),
            "absent_days": absent_days,
            "deduction": deduction.normalize().to_string()
        }),
        reasoning: format!(
            "{} absent day(s) x per-day rate {} ({} / {} working days) = {}",
            absent_days,
            per_day_rate.round_dp(MONEY_DECIMAL_PLACES).normalize(),
            basic_salary.normalize(),
            attendance.working_days,
            deduction.normalize()
        ),
    };

    Ok(AbsenceDeductionResult {
        per_day_rate,
        absent_days,
        deduction,
        audit_step,
        warning,
    })
}
