//! Employee directory interface.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::models::EmployeeRecord;

/// Read access to the employee directory.
///
/// Implementations must be thread-safe (`Send + Sync`) because the engine
/// may query them from concurrent operations.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee.
    fn get_employee(&self, id: Uuid) -> Option<EmployeeRecord>;

    /// Every employee whose status is active.
    fn active_employees(&self) -> Vec<EmployeeRecord>;
}

/// An employee directory held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<HashMap<Uuid, EmployeeRecord>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn upsert(&self, employee: EmployeeRecord) {
        let mut employees = self
            .employees
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        employees.insert(employee.id, employee);
    }

    /// Removes an employee.
    pub fn remove(&self, id: Uuid) -> Option<EmployeeRecord> {
        let mut employees = self
            .employees
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        employees.remove(&id)
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn get_employee(&self, id: Uuid) -> Option<EmployeeRecord> {
        let employees = self.employees.read().unwrap_or_else(PoisonError::into_inner);
        employees.get(&id).cloned()
    }

    fn active_employees(&self) -> Vec<EmployeeRecord> {
        let employees = self.employees.read().unwrap_or_else(PoisonError::into_inner);
        let mut active: Vec<EmployeeRecord> = employees
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        active
    }
}
