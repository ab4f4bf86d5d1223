//! Salary structure model.
//!
//! One [`SalaryStructure`] per employee holds the monthly compensation
//! components. Gross and net salary are derived and recomputed whenever a
//! component changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::money::{checked_difference, checked_sum};

/// The monthly compensation components of a salary structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponents {
    /// Basic monthly salary.
    pub basic_salary: Decimal,
    /// House rent allowance.
    #[serde(default)]
    pub house_rent: Decimal,
    /// Medical allowance.
    #[serde(default)]
    pub medical_allowance: Decimal,
    /// Transport allowance.
    #[serde(default)]
    pub transport_allowance: Decimal,
    /// Any other allowances.
    #[serde(default)]
    pub other_allowances: Decimal,
    /// Standing monthly deductions.
    #[serde(default)]
    pub total_deductions: Decimal,
}

impl SalaryComponents {
    /// Rejects negative amounts.
    pub fn validate(&self) -> EngineResult<()> {
        let fields = [
            ("basic_salary", self.basic_salary),
            ("house_rent", self.house_rent),
            ("medical_allowance", self.medical_allowance),
            ("transport_allowance", self.transport_allowance),
            ("other_allowances", self.other_allowances),
            ("total_deductions", self.total_deductions),
        ];
        for (field, amount) in fields {
            if amount < Decimal::ZERO {
                return Err(EngineError::validation(
                    field,
                    format!("must not be negative, got {}", amount),
                ));
            }
        }
        Ok(())
    }

    /// Sum of all allowance components.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the sum overflows.
    pub fn total_allowances(&self) -> EngineResult<Decimal> {
        checked_sum(
            "total_allowances",
            [
                self.house_rent,
                self.medical_allowance,
                self.transport_allowance,
                self.other_allowances,
            ],
        )
    }

    /// Basic salary plus all allowances.
    pub fn gross_salary(&self) -> EngineResult<Decimal> {
        checked_sum("gross_salary", [self.basic_salary, self.total_allowances()?])
    }
}

/// An employee's compensation configuration.
///
/// # Example
///
/// ```
/// use hrm_engine::models::{SalaryComponents, SalaryStructure};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let structure = SalaryStructure::new(
///     Uuid::new_v4(),
///     SalaryComponents {
///         basic_salary: Decimal::from(30000),
///         house_rent: Decimal::from(10000),
///         medical_allowance: Decimal::from(2000),
///         transport_allowance: Decimal::from(1000),
///         other_allowances: Decimal::ZERO,
///         total_deductions: Decimal::from(500),
///     },
/// )
/// .unwrap();
///
/// assert_eq!(structure.gross_salary(), Decimal::from(43000));
/// assert_eq!(structure.net_salary(), Decimal::from(42500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryStructure {
    id: Uuid,
    employee_id: Uuid,
    components: SalaryComponents,
    gross_salary: Decimal,
    net_salary: Decimal,
    updated_at: DateTime<Utc>,
}

impl SalaryStructure {
    /// Creates a salary structure after validating its components.
    pub fn new(employee_id: Uuid, components: SalaryComponents) -> EngineResult<Self> {
        let (gross_salary, net_salary) = derive_salaries(&components)?;
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            components,
            gross_salary,
            net_salary,
            updated_at: Utc::now(),
        })
    }

    /// Replaces the components and recomputes gross and net salary.
    pub fn set_components(&mut self, components: SalaryComponents) -> EngineResult<()> {
        let (gross_salary, net_salary) = derive_salaries(&components)?;
        self.components = components;
        self.gross_salary = gross_salary;
        self.net_salary = net_salary;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The employee this structure belongs to.
    pub fn employee_id(&self) -> Uuid {
        self.employee_id
    }

    /// The compensation components.
    pub fn components(&self) -> &SalaryComponents {
        &self.components
    }

    /// Basic salary plus all allowances.
    pub fn gross_salary(&self) -> Decimal {
        self.gross_salary
    }

    /// Gross salary less standing deductions.
    pub fn net_salary(&self) -> Decimal {
        self.net_salary
    }

    /// When the components last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn derive_salaries(components: &SalaryComponents) -> EngineResult<(Decimal, Decimal)> {
    components.validate()?;
    let gross_salary = components.gross_salary()?;
    let net_salary =
        checked_difference("net_salary", gross_salary, [components.total_deductions])?;
    Ok((gross_salary, net_salary))
}
