//! Allowance total calculation.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, SalaryComponents};

/// The result of summing a salary structure's allowances.
#[derive(Debug, Clone)]
pub struct AllowanceTotalResult {
    /// House rent + medical + transport + other allowances.
    pub total_allowances: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Sums the allowance components of a salary structure.
///
/// # Errors
///
/// Returns a `Validation` error if the sum overflows.
///
/// # Examples
///
/// ```
/// use hrm_engine::calculation::calculate_total_allowances;
/// use hrm_engine::models::SalaryComponents;
/// use rust_decimal::Decimal;
///
/// let components = SalaryComponents {
///     basic_salary: Decimal::from(30000),
///     house_rent: Decimal::from(10000),
///     medical_allowance: Decimal::from(2000),
///     transport_allowance: Decimal::from(1000),
///     ..Default::default()
/// };
/// let result = calculate_total_allowances(&components, 1).unwrap();
/// assert_eq!(result.total_allowances, Decimal::from(13000));
/// ```
pub fn calculate_total_allowances(
    components: &SalaryComponents,
    step_number: u32,
) -> EngineResult<AllowanceTotalResult> {
    let total_allowances = components.total_allowances()?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "allowance_total".to_string(),
        rule_name: "Allowance Total".to_string(),
        input: serde_json::json!({
            "house_rent": components.house_rent.normalize().to_string(),
            "medical_allowance": components.medical_allowance.normalize().to_string(),
            "transport_allowance": components.transport_allowance.normalize().to_string(),
            "other_allowances": components.other_allowances.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_allowances": total_allowances.normalize().to_string()
        }),
        reasoning: format!(
            "House rent {} + medical {} + transport {} + other {} = {}",
            components.house_rent.normalize(),
            components.medical_allowance.normalize(),
            components.transport_allowance.normalize(),
            components.other_allowances.normalize(),
            total_allowances.normalize()
        ),
    };

    Ok(AllowanceTotalResult {
        total_allowances,
        audit_step,
    })
}
