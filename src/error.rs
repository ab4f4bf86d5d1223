//! Error types for the HR engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the leave ledger, the leave workflow and the payroll
//! engine can report to a caller.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PayPeriod;

/// The broad category of an [`EngineError`].
///
/// Callers that only need to map errors to a response class (HTTP status,
/// exit code, retry policy) can match on the kind instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// A uniqueness rule or overlap rule was violated.
    Conflict,
    /// The requested leave days exceed the remaining balance.
    InsufficientBalance,
    /// The entity is not in a state that allows the requested change.
    InvalidTransition,
    /// The input was malformed or out of range.
    Validation,
    /// Engine configuration could not be loaded.
    Configuration,
}

/// The main error type for the HR engine.
///
/// # Example
///
/// ```
/// use hrm_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::InsufficientBalance {
///     requested: 6,
///     remaining: 5,
/// };
/// assert_eq!(error.kind(), ErrorKind::InsufficientBalance);
/// assert_eq!(
///     error.to_string(),
///     "Insufficient leave balance: requested 6 day(s), 5 remaining"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A referenced entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "employee", "leave balance").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A payroll already exists for the employee and pay period.
    #[error("Payroll already processed for employee {employee_id} in {pay_period}")]
    DuplicatePayroll {
        /// The employee the payroll belongs to.
        employee_id: Uuid,
        /// The pay period of the existing payroll.
        pay_period: PayPeriod,
    },

    /// A payslip already exists for the payroll.
    #[error("Payslip already generated for payroll {payroll_id}")]
    DuplicatePayslip {
        /// The payroll that already has a payslip.
        payroll_id: Uuid,
    },

    /// The requested leave dates intersect an active application.
    #[error(
        "Leave from {start_date} to {end_date} overlaps existing application {existing_id}"
    )]
    OverlappingLeave {
        /// The application the new dates collide with.
        existing_id: Uuid,
        /// Requested start date.
        start_date: NaiveDate,
        /// Requested end date.
        end_date: NaiveDate,
    },

    /// A generic uniqueness or referential conflict.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflict.
        message: String,
    },

    /// Not enough leave days remain in the balance.
    #[error("Insufficient leave balance: requested {requested} day(s), {remaining} remaining")]
    InsufficientBalance {
        /// Days requested.
        requested: u32,
        /// Days remaining in the balance.
        remaining: u32,
    },

    /// A status change that the state machine does not allow.
    #[error("Invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        /// The kind of entity (e.g. "leave application", "payroll").
        entity: &'static str,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// Somebody other than the applicant tried to cancel a leave application.
    #[error("Employee {requester_id} does not own leave application {application_id}")]
    NotApplicationOwner {
        /// The application being cancelled.
        application_id: Uuid,
        /// The employee who asked for the cancellation.
        requester_id: Uuid,
    },

    /// Input failed validation.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`EngineError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::DuplicatePayroll { .. }
            | EngineError::DuplicatePayslip { .. }
            | EngineError::OverlappingLeave { .. }
            | EngineError::Conflict { .. } => ErrorKind::Conflict,
            EngineError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            EngineError::InvalidTransition { .. } | EngineError::NotApplicationOwner { .. } => {
                ErrorKind::InvalidTransition
            }
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::Configuration
            }
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
