//! Leave application workflow.
//!
//! Drives applications through `PENDING -> APPROVED | REJECTED | CANCELLED`
//! and `APPROVED -> CANCELLED`, debiting or crediting the ledger on the
//! transitions that move days.
//!
//! Locking:
//!
//! - `apply` and `update` hold the employee's lock across the overlap check
//!   and the write, so two requests from one employee cannot both pass.
//! - `approve` and `cancel` hold the application row while the ledger takes
//!   the balance row. The order is always application, then balance.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_leave_days;
use crate::error::{EngineError, EngineResult};
use crate::external::EmployeeDirectory;
use crate::leave::{LeaveBalanceLedger, LeaveTypeCatalog};
use crate::models::{LeaveApplication, LeaveApplicationUpdate, LeaveStatus, NewLeaveApplication};
use crate::store::{KeyedLocks, MemoryStore, Row, lock};

/// State machine over leave applications.
pub struct LeaveApplicationWorkflow {
    store: Arc<MemoryStore>,
    catalog: Arc<LeaveTypeCatalog>,
    ledger: Arc<LeaveBalanceLedger>,
    directory: Arc<dyn EmployeeDirectory>,
    employee_locks: KeyedLocks<Uuid>,
}

impl LeaveApplicationWorkflow {
    /// Creates a workflow.
    pub fn new(
        store: Arc<MemoryStore>,
        catalog: Arc<LeaveTypeCatalog>,
        ledger: Arc<LeaveBalanceLedger>,
        directory: Arc<dyn EmployeeDirectory>,
    ) -> Self {
        Self {
            store,
            catalog,
            ledger,
            directory,
            employee_locks: KeyedLocks::new(),
        }
    }

    /// Submits a leave request in `PENDING`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the end date precedes the start date or the leave
    ///   type is inactive
    /// - `NotFound` if the employee, leave type or balance does not exist
    /// - `OverlappingLeave` if a pending or approved application intersects
    ///   the requested dates
    /// - `InsufficientBalance` if the balance cannot cover the request
    pub fn apply(&self, request: NewLeaveApplication) -> EngineResult<LeaveApplication> {
        let total_days = calculate_leave_days(request.start_date, request.end_date)?;
        if self.directory.get_employee(request.employee_id).is_none() {
            return Err(EngineError::not_found("employee", request.employee_id));
        }

        let employee_lock = self.employee_locks.handle(&request.employee_id);
        let _guard = lock(&employee_lock);
        let _references = self.catalog.hold_references();
        self.ensure_active_leave_type(request.leave_type_id)?;

        self.ensure_no_overlap(request.employee_id, request.start_date, request.end_date, None)?;
        self.ensure_available(
            request.employee_id,
            request.leave_type_id,
            request.start_date,
            total_days,
        )?;

        let application = LeaveApplication {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            leave_type_id: request.leave_type_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_days,
            status: LeaveStatus::Pending,
            reason: request.reason,
            contact_info: request.contact_info,
            approver_id: None,
            applied_at: Utc::now(),
            processed_at: None,
            remarks: None,
        };
        self.store
            .leave_applications
            .insert_unique(application.id, application.clone())?;

        info!(
            application_id = %application.id,
            employee_id = %application.employee_id,
            leave_type_id = %application.leave_type_id,
            start_date = %application.start_date,
            end_date = %application.end_date,
            total_days,
            "Leave application submitted"
        );
        Ok(application)
    }

    /// Approves a pending application and debits the ledger.
    ///
    /// If the debit fails the application stays `PENDING` and the ledger
    /// error is returned.
    pub fn approve(
        &self,
        application_id: Uuid,
        approver_id: Uuid,
        remarks: Option<String>,
    ) -> EngineResult<LeaveApplication> {
        let row = self.application_row(application_id)?;
        let mut application = lock(&row);
        application.ensure_transition(LeaveStatus::Approved)?;

        if let Err(err) = self.ledger.debit(
            application.employee_id,
            application.leave_type_id,
            application.start_date.year(),
            application.total_days,
        ) {
            warn!(
                application_id = %application_id,
                approver_id = %approver_id,
                error = %err,
                "Leave approval failed, application left pending"
            );
            return Err(err);
        }
        application.record_decision(LeaveStatus::Approved, approver_id, remarks, Utc::now())?;

        info!(
            application_id = %application_id,
            employee_id = %application.employee_id,
            approver_id = %approver_id,
            total_days = application.total_days,
            "Leave application approved"
        );
        Ok(application.clone())
    }

    /// Rejects a pending application. The ledger is not touched.
    pub fn reject(
        &self,
        application_id: Uuid,
        approver_id: Uuid,
        remarks: Option<String>,
    ) -> EngineResult<LeaveApplication> {
        let row = self.application_row(application_id)?;
        let mut application = lock(&row);
        application.record_decision(LeaveStatus::Rejected, approver_id, remarks, Utc::now())?;

        info!(
            application_id = %application_id,
            employee_id = %application.employee_id,
            approver_id = %approver_id,
            "Leave application rejected"
        );
        Ok(application.clone())
    }

    /// Withdraws an application on behalf of its owner. Cancelling an
    /// approved application credits the days back.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the application does not exist
    /// - `NotApplicationOwner` if `requester_id` is not the applicant
    /// - `InvalidTransition` if the application is rejected or cancelled
    pub fn cancel(&self, application_id: Uuid, requester_id: Uuid) -> EngineResult<LeaveApplication> {
        let row = self.application_row(application_id)?;
        let mut application = lock(&row);

        if application.employee_id != requester_id {
            warn!(
                application_id = %application_id,
                requester_id = %requester_id,
                "Leave cancellation by non-owner rejected"
            );
            return Err(EngineError::NotApplicationOwner {
                application_id,
                requester_id,
            });
        }
        application.ensure_transition(LeaveStatus::Cancelled)?;

        let credited = application.status == LeaveStatus::Approved;
        if credited {
            self.ledger.credit(
                application.employee_id,
                application.leave_type_id,
                application.start_date.year(),
                application.total_days,
            )?;
        }
        application.transition(LeaveStatus::Cancelled)?;

        info!(
            application_id = %application_id,
            employee_id = %requester_id,
            credited_days = if credited { application.total_days } else { 0 },
            "Leave application cancelled"
        );
        Ok(application.clone())
    }

    /// Edits a pending application, re-running the `apply` checks against
    /// the new fields.
    pub fn update(
        &self,
        application_id: Uuid,
        update: LeaveApplicationUpdate,
    ) -> EngineResult<LeaveApplication> {
        let current = self.get(application_id)?;
        let employee_lock = self.employee_locks.handle(&current.employee_id);
        let _guard = lock(&employee_lock);

        // re-read under the employee lock; approve does not take it
        let current = self.get(application_id)?;
        ensure_pending(&current)?;
        let _references = self.catalog.hold_references();

        let leave_type_id = update.leave_type_id.unwrap_or(current.leave_type_id);
        let start_date = update.start_date.unwrap_or(current.start_date);
        let end_date = update.end_date.unwrap_or(current.end_date);
        let total_days = calculate_leave_days(start_date, end_date)?;
        if leave_type_id != current.leave_type_id {
            self.ensure_active_leave_type(leave_type_id)?;
        }
        self.ensure_no_overlap(current.employee_id, start_date, end_date, Some(application_id))?;
        self.ensure_available(current.employee_id, leave_type_id, start_date, total_days)?;

        let row = self.application_row(application_id)?;
        let mut application = lock(&row);
        // an approver may have decided while the checks ran
        ensure_pending(&application)?;
        application.leave_type_id = leave_type_id;
        application.start_date = start_date;
        application.end_date = end_date;
        application.total_days = total_days;
        if let Some(reason) = update.reason {
            application.reason = reason;
        }
        if let Some(contact_info) = update.contact_info {
            application.contact_info = Some(contact_info);
        }

        info!(
            application_id = %application_id,
            employee_id = %application.employee_id,
            start_date = %start_date,
            end_date = %end_date,
            total_days,
            "Leave application updated"
        );
        Ok(application.clone())
    }

    /// Looks up an application.
    pub fn get(&self, application_id: Uuid) -> EngineResult<LeaveApplication> {
        self.store
            .leave_applications
            .get(&application_id)
            .ok_or_else(|| EngineError::not_found("leave application", application_id))
    }

    /// An employee's applications, ordered by start date.
    pub fn list_for_employee(&self, employee_id: Uuid) -> Vec<LeaveApplication> {
        let mut applications = self
            .store
            .leave_applications
            .filter(|a| a.employee_id == employee_id);
        applications.sort_by_key(|a| (a.start_date, a.applied_at));
        applications
    }

    /// Applications awaiting a decision, oldest first.
    pub fn list_pending(&self) -> Vec<LeaveApplication> {
        let mut applications = self
            .store
            .leave_applications
            .filter(|a| a.status == LeaveStatus::Pending);
        applications.sort_by_key(|a| a.applied_at);
        applications
    }

    fn application_row(&self, application_id: Uuid) -> EngineResult<Row<LeaveApplication>> {
        self.store
            .leave_applications
            .row(&application_id)
            .ok_or_else(|| EngineError::not_found("leave application", application_id))
    }

    fn ensure_active_leave_type(&self, leave_type_id: Uuid) -> EngineResult<()> {
        let leave_type = self.catalog.get(leave_type_id)?;
        if !leave_type.is_active {
            return Err(EngineError::validation(
                "leave_type_id",
                format!("leave type '{}' is not active", leave_type.code),
            ));
        }
        Ok(())
    }

    fn ensure_no_overlap(
        &self,
        employee_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> EngineResult<()> {
        let existing = self.store.leave_applications.filter(|a| {
            a.employee_id == employee_id
                && Some(a.id) != exclude
                && a.status.is_active()
                && a.overlaps(start_date, end_date)
        });
        match existing.first() {
            Some(existing) => {
                warn!(
                    employee_id = %employee_id,
                    existing_id = %existing.id,
                    start_date = %start_date,
                    end_date = %end_date,
                    "Overlapping leave request rejected"
                );
                Err(EngineError::OverlappingLeave {
                    existing_id: existing.id,
                    start_date,
                    end_date,
                })
            }
            None => Ok(()),
        }
    }

    fn ensure_available(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        start_date: NaiveDate,
        total_days: u32,
    ) -> EngineResult<()> {
        let balance = self
            .ledger
            .get_balance(employee_id, leave_type_id, start_date.year())?;
        if balance.remaining_days() < total_days {
            warn!(
                employee_id = %employee_id,
                leave_type_id = %leave_type_id,
                requested = total_days,
                remaining = balance.remaining_days(),
                "Leave request exceeds balance"
            );
            return Err(EngineError::InsufficientBalance {
                requested: total_days,
                remaining: balance.remaining_days(),
            });
        }
        Ok(())
    }
}

fn ensure_pending(application: &LeaveApplication) -> EngineResult<()> {
    if application.status == LeaveStatus::Pending {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition {
            entity: "leave application",
            from: application.status.to_string(),
            to: LeaveStatus::Pending.to_string(),
        })
    }
}
