//! Leave application model and its status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::date_ranges_overlap;
use crate::error::{EngineError, EngineResult};

/// Status of a leave application.
///
/// `Pending` may move to any other status; `Approved` may only move to
/// `Cancelled`; `Rejected` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Submitted, awaiting a decision.
    Pending,
    /// Approved; the days are debited from the balance.
    Approved,
    /// Rejected by an approver.
    Rejected,
    /// Withdrawn by the applicant.
    Cancelled,
}

impl LeaveStatus {
    /// The persisted form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
            LeaveStatus::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if the state machine allows moving to `next`.
    ///
    /// # Example
    ///
    /// ```
    /// use hrm_engine::models::LeaveStatus;
    ///
    /// assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
    /// assert!(LeaveStatus::Approved.can_transition_to(LeaveStatus::Cancelled));
    /// assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Rejected));
    /// assert!(!LeaveStatus::Cancelled.can_transition_to(LeaveStatus::Pending));
    /// ```
    pub fn can_transition_to(&self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
                | (LeaveStatus::Pending, LeaveStatus::Cancelled)
                | (LeaveStatus::Approved, LeaveStatus::Cancelled)
        )
    }

    /// Returns true while the application still blocks its dates.
    pub fn is_active(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(LeaveStatus::Pending),
            "APPROVED" => Ok(LeaveStatus::Approved),
            "REJECTED" => Ok(LeaveStatus::Rejected),
            "CANCELLED" => Ok(LeaveStatus::Cancelled),
            other => Err(EngineError::validation(
                "status",
                format!("unknown leave status '{}'", other),
            )),
        }
    }
}

/// Fields of a new leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaveApplication {
    /// The applicant.
    pub employee_id: Uuid,
    /// The leave type to draw from.
    pub leave_type_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
    /// How to reach the applicant while away.
    #[serde(default)]
    pub contact_info: Option<String>,
}

/// Edit of a pending leave application. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplicationUpdate {
    /// Draw from a different leave type.
    pub leave_type_id: Option<Uuid>,
    /// New first day.
    pub start_date: Option<NaiveDate>,
    /// New last day.
    pub end_date: Option<NaiveDate>,
    /// New reason.
    pub reason: Option<String>,
    /// New contact details.
    pub contact_info: Option<String>,
}

/// A leave request and its decision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// Unique identifier.
    pub id: Uuid,
    /// The applicant.
    pub employee_id: Uuid,
    /// The leave type drawn from.
    pub leave_type_id: Uuid,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Inclusive calendar-day count of the range.
    pub total_days: u32,
    /// Current status.
    pub status: LeaveStatus,
    /// Free-text reason.
    pub reason: String,
    /// How to reach the applicant while away.
    pub contact_info: Option<String>,
    /// Who approved or rejected the application.
    pub approver_id: Option<Uuid>,
    /// When the application was submitted.
    pub applied_at: DateTime<Utc>,
    /// When the application was approved or rejected.
    pub processed_at: Option<DateTime<Utc>>,
    /// Approver's comment.
    pub remarks: Option<String>,
}

impl LeaveApplication {
    /// Returns true if this application's dates intersect `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        date_ranges_overlap(self.start_date, self.end_date, start, end)
    }

    /// Moves to `next`, failing with `InvalidTransition` if the state
    /// machine does not allow it.
    pub fn transition(&mut self, next: LeaveStatus) -> EngineResult<()> {
        self.ensure_transition(next)?;
        self.status = next;
        Ok(())
    }

    /// Checks a transition without performing it.
    pub fn ensure_transition(&self, next: LeaveStatus) -> EngineResult<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                entity: "leave application",
                from: self.status.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Records an approver's decision.
    pub fn record_decision(
        &mut self,
        next: LeaveStatus,
        approver_id: Uuid,
        remarks: Option<String>,
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.transition(next)?;
        self.approver_id = Some(approver_id);
        self.remarks = remarks;
        self.processed_at = Some(at);
        Ok(())
    }
}
