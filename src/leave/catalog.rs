//! Leave type catalog.
//!
//! Reference data naming each leave category, its yearly entitlement and its
//! approval, encashment and carry-forward policy.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveType, LeaveTypeUpdate, NewLeaveType};
use crate::store::{MemoryStore, lock};

/// CRUD over leave types with unique names and codes.
#[derive(Debug)]
pub struct LeaveTypeCatalog {
    store: Arc<MemoryStore>,
    // serializes catalog writes so the code and name indexes move together
    writes: Mutex<()>,
    // shared while a referencing record is created, exclusive during delete
    references: RwLock<()>,
}

impl LeaveTypeCatalog {
    /// Creates a catalog over `store`.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
            references: RwLock::new(()),
        }
    }

    /// Blocks deletes until the returned guard is dropped.
    ///
    /// Records that reference a leave type are created under this guard,
    /// with the leave type looked up after it is taken. The guard is not
    /// reentrant: never take it twice on one thread.
    pub(crate) fn hold_references(&self) -> RwLockReadGuard<'_, ()> {
        self.references.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a leave type.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name or code is blank
    /// - `Conflict` if the name or code is already used
    pub fn create(&self, new: NewLeaveType) -> EngineResult<LeaveType> {
        validate_label("name", &new.name)?;
        validate_label("code", &new.code)?;

        let _guard = lock(&self.writes);
        self.ensure_label_free(&new.code, &new.name, None)?;

        let leave_type = LeaveType::from_new(new);
        self.store
            .leave_types
            .insert_unique(leave_type.id, leave_type.clone())?;
        self.store
            .leave_type_codes
            .insert_unique(leave_type.code.clone(), leave_type.id)?;
        self.store
            .leave_type_names
            .insert_unique(leave_type.name.clone(), leave_type.id)?;

        info!(
            leave_type_id = %leave_type.id,
            code = %leave_type.code,
            max_days_per_year = leave_type.max_days_per_year,
            "Leave type created"
        );
        Ok(leave_type)
    }

    /// Seeds the catalog, skipping codes that already exist. Returns the
    /// number of leave types created.
    pub fn seed(&self, leave_types: &[NewLeaveType]) -> EngineResult<usize> {
        let mut created = 0;
        for new in leave_types {
            if self.store.leave_type_codes.contains(&new.code) {
                continue;
            }
            self.create(new.clone())?;
            created += 1;
        }
        Ok(created)
    }

    /// Applies an administrative edit.
    pub fn update(&self, id: Uuid, update: LeaveTypeUpdate) -> EngineResult<LeaveType> {
        if let Some(name) = &update.name {
            validate_label("name", name)?;
        }
        if let Some(code) = &update.code {
            validate_label("code", code)?;
        }

        let _guard = lock(&self.writes);
        let row = self
            .store
            .leave_types
            .row(&id)
            .ok_or_else(|| EngineError::not_found("leave type", id))?;
        let mut leave_type = lock(&row);

        let mut updated = leave_type.clone();
        updated.apply_update(update);
        self.ensure_label_free(&updated.code, &updated.name, Some(id))?;

        if updated.code != leave_type.code {
            self.store.leave_type_codes.remove(&leave_type.code);
            self.store
                .leave_type_codes
                .insert_unique(updated.code.clone(), id)?;
        }
        if updated.name != leave_type.name {
            self.store.leave_type_names.remove(&leave_type.name);
            self.store
                .leave_type_names
                .insert_unique(updated.name.clone(), id)?;
        }

        *leave_type = updated.clone();
        info!(leave_type_id = %id, code = %updated.code, "Leave type updated");
        Ok(updated)
    }

    /// Deletes a leave type that no balance or application references.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the leave type does not exist
    /// - `Conflict` if any balance or application references it
    pub fn delete(&self, id: Uuid) -> EngineResult<LeaveType> {
        let _guard = lock(&self.writes);
        let _references = self
            .references
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let leave_type = self.get(id)?;

        let referenced = self
            .store
            .leave_balances
            .any(|b| b.leave_type_id() == id)
            || self
                .store
                .leave_applications
                .any(|a| a.leave_type_id == id);
        if referenced {
            warn!(leave_type_id = %id, code = %leave_type.code, "Refusing to delete referenced leave type");
            return Err(EngineError::Conflict {
                message: format!(
                    "leave type '{}' is referenced by balances or applications",
                    leave_type.code
                ),
            });
        }

        self.store.leave_types.remove(&id);
        self.store.leave_type_codes.remove(&leave_type.code);
        self.store.leave_type_names.remove(&leave_type.name);
        info!(leave_type_id = %id, code = %leave_type.code, "Leave type deleted");
        Ok(leave_type)
    }

    /// Looks up a leave type by id.
    pub fn get(&self, id: Uuid) -> EngineResult<LeaveType> {
        self.store
            .leave_types
            .get(&id)
            .ok_or_else(|| EngineError::not_found("leave type", id))
    }

    /// Looks up a leave type by code.
    pub fn get_by_code(&self, code: &str) -> EngineResult<LeaveType> {
        self.store
            .leave_type_codes
            .get(&code.to_string())
            .and_then(|id| self.store.leave_types.get(&id))
            .ok_or_else(|| EngineError::not_found("leave type", code))
    }

    /// Every leave type, ordered by code.
    pub fn list(&self) -> Vec<LeaveType> {
        let mut leave_types = self.store.leave_types.values();
        leave_types.sort_by(|a, b| a.code.cmp(&b.code));
        leave_types
    }

    /// Active leave types, ordered by code.
    pub fn list_active(&self) -> Vec<LeaveType> {
        let mut leave_types = self.store.leave_types.filter(|t| t.is_active);
        leave_types.sort_by(|a, b| a.code.cmp(&b.code));
        leave_types
    }

    fn ensure_label_free(&self, code: &str, name: &str, own_id: Option<Uuid>) -> EngineResult<()> {
        let taken_by_other = |owner: Option<Uuid>| owner.is_some_and(|owner| Some(owner) != own_id);

        if taken_by_other(self.store.leave_type_codes.get(&code.to_string())) {
            return Err(EngineError::Conflict {
                message: format!("leave type code '{}' already exists", code),
            });
        }
        if taken_by_other(self.store.leave_type_names.get(&name.to_string())) {
            return Err(EngineError::Conflict {
                message: format!("leave type name '{}' already exists", name),
            });
        }
        Ok(())
    }
}

fn validate_label(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(field, "must not be blank"));
    }
    Ok(())
}
