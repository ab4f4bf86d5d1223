//! Salary structure store.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{SalaryComponents, SalaryStructure};
use crate::store::{MemoryStore, lock};

/// One compensation structure per employee. Payroll reads it and never
/// mutates it.
#[derive(Debug)]
pub struct SalaryStructureStore {
    store: Arc<MemoryStore>,
}

impl SalaryStructureStore {
    /// Creates a salary structure store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Creates an employee's salary structure.
    ///
    /// # Errors
    ///
    /// - `Validation` if any component is negative
    /// - `Conflict` if the employee already has one
    pub fn create(
        &self,
        employee_id: Uuid,
        components: SalaryComponents,
    ) -> EngineResult<SalaryStructure> {
        let structure = SalaryStructure::new(employee_id, components)?;
        self.store
            .salary_structures
            .insert_unique(employee_id, structure.clone())
            .map_err(|_| EngineError::Conflict {
                message: format!("employee {} already has a salary structure", employee_id),
            })?;

        info!(
            employee_id = %employee_id,
            gross_salary = %structure.gross_salary(),
            net_salary = %structure.net_salary(),
            "Salary structure created"
        );
        Ok(structure)
    }

    /// Returns an employee's salary structure.
    pub fn get(&self, employee_id: Uuid) -> EngineResult<SalaryStructure> {
        self.store
            .salary_structures
            .get(&employee_id)
            .ok_or_else(|| EngineError::not_found("salary structure", employee_id))
    }

    /// Replaces the components of an employee's salary structure.
    pub fn update(
        &self,
        employee_id: Uuid,
        components: SalaryComponents,
    ) -> EngineResult<SalaryStructure> {
        let row = self
            .store
            .salary_structures
            .row(&employee_id)
            .ok_or_else(|| EngineError::not_found("salary structure", employee_id))?;
        let mut structure = lock(&row);
        structure.set_components(components)?;

        info!(
            employee_id = %employee_id,
            gross_salary = %structure.gross_salary(),
            net_salary = %structure.net_salary(),
            "Salary structure updated"
        );
        Ok(structure.clone())
    }

    /// Removes an employee's salary structure.
    pub fn delete(&self, employee_id: Uuid) -> EngineResult<SalaryStructure> {
        let removed = self
            .store
            .salary_structures
            .remove(&employee_id)
            .ok_or_else(|| EngineError::not_found("salary structure", employee_id))?;
        info!(employee_id = %employee_id, "Salary structure deleted");
        Ok(removed)
    }
}
