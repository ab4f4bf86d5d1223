//! Leave balance model.
//!
//! A [`LeaveBalance`] tracks how many days of one leave type an employee may
//! still take in one year. Its counters are private so that
//! `remaining_days == total_days - used_days + carry_forward_days` holds
//! after every mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The unique key of a leave balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    /// The employee owning the balance.
    pub employee_id: Uuid,
    /// The leave type the balance is for.
    pub leave_type_id: Uuid,
    /// The calendar year.
    pub year: i32,
}

impl BalanceKey {
    /// Creates a balance key.
    pub fn new(employee_id: Uuid, leave_type_id: Uuid, year: i32) -> Self {
        Self {
            employee_id,
            leave_type_id,
            year,
        }
    }
}

/// Persisted shape of a balance. Deserialization goes through this so a
/// stored `remaining_days` is never trusted.
#[derive(Debug, Clone, Deserialize)]
struct LeaveBalanceRecord {
    id: Uuid,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    total_days: u32,
    used_days: u32,
    carry_forward_days: u32,
}

/// Per-employee, per-leave-type, per-year leave entitlement.
///
/// # Example
///
/// ```
/// use hrm_engine::models::LeaveBalance;
/// use uuid::Uuid;
///
/// let mut balance = LeaveBalance::open(Uuid::new_v4(), Uuid::new_v4(), 2024, 10, 2);
/// assert_eq!(balance.remaining_days(), 12);
///
/// balance.debit(5).unwrap();
/// assert_eq!(balance.used_days(), 5);
/// assert_eq!(balance.remaining_days(), 7);
///
/// balance.credit(5).unwrap();
/// assert_eq!(balance.remaining_days(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LeaveBalanceRecord")]
pub struct LeaveBalance {
    id: Uuid,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    total_days: u32,
    used_days: u32,
    carry_forward_days: u32,
    remaining_days: u32,
}

impl LeaveBalance {
    /// Opens a fresh balance with nothing used.
    pub fn open(
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        total_days: u32,
        carry_forward_days: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            leave_type_id,
            year,
            total_days,
            used_days: 0,
            carry_forward_days,
            remaining_days: total_days.saturating_add(carry_forward_days),
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The key this balance is stored under.
    pub fn key(&self) -> BalanceKey {
        BalanceKey::new(self.employee_id, self.leave_type_id, self.year)
    }

    /// The employee owning the balance.
    pub fn employee_id(&self) -> Uuid {
        self.employee_id
    }

    /// The leave type of the balance.
    pub fn leave_type_id(&self) -> Uuid {
        self.leave_type_id
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Entitlement for the year.
    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    /// Days consumed by approved leave.
    pub fn used_days(&self) -> u32 {
        self.used_days
    }

    /// Days rolled over from the previous year.
    pub fn carry_forward_days(&self) -> u32 {
        self.carry_forward_days
    }

    /// Days still available.
    pub fn remaining_days(&self) -> u32 {
        self.remaining_days
    }

    /// Consumes `days` from the balance.
    ///
    /// Fails with `InsufficientBalance` and leaves the balance untouched if
    /// fewer than `days` remain.
    pub fn debit(&mut self, days: u32) -> EngineResult<()> {
        if days == 0 {
            return Err(EngineError::validation("days", "must be at least 1"));
        }
        if days > self.remaining_days {
            return Err(EngineError::InsufficientBalance {
                requested: days,
                remaining: self.remaining_days,
            });
        }
        self.used_days += days;
        self.recompute();
        Ok(())
    }

    /// Returns `days` to the balance.
    ///
    /// Fails with `Validation` and leaves the balance untouched if more days
    /// would be returned than were used.
    pub fn credit(&mut self, days: u32) -> EngineResult<()> {
        if days == 0 {
            return Err(EngineError::validation("days", "must be at least 1"));
        }
        if days > self.used_days {
            return Err(EngineError::validation(
                "days",
                format!(
                    "cannot credit {} day(s) when only {} are used",
                    days, self.used_days
                ),
            ));
        }
        self.used_days -= days;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        // debit and credit keep used_days <= total_days + carry_forward_days
        self.remaining_days = self
            .total_days
            .saturating_add(self.carry_forward_days)
            .saturating_sub(self.used_days);
    }
}

impl TryFrom<LeaveBalanceRecord> for LeaveBalance {
    type Error = EngineError;

    fn try_from(record: LeaveBalanceRecord) -> Result<Self, Self::Error> {
        let available = record
            .total_days
            .checked_add(record.carry_forward_days)
            .ok_or_else(|| EngineError::validation("total_days", "entitlement overflow"))?;
        if record.used_days > available {
            return Err(EngineError::validation(
                "used_days",
                format!(
                    "{} used days exceed the {} available",
                    record.used_days, available
                ),
            ));
        }

        let mut balance = Self {
            id: record.id,
            employee_id: record.employee_id,
            leave_type_id: record.leave_type_id,
            year: record.year,
            total_days: record.total_days,
            used_days: record.used_days,
            carry_forward_days: record.carry_forward_days,
            remaining_days: 0,
        };
        balance.recompute();
        Ok(balance)
    }
}
