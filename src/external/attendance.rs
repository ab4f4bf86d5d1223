//! Attendance aggregator interface.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceSummary, PayPeriod};

/// Source of monthly attendance counts.
///
/// Implementations must be thread-safe (`Send + Sync`) because bulk payroll
/// runs query them for many employees.
pub trait AttendanceAggregator: Send + Sync {
    /// Returns present and working days for one employee and month.
    fn monthly_attendance_summary(
        &self,
        employee_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<AttendanceSummary>;
}

/// Attendance summaries held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendance {
    summaries: RwLock<HashMap<(Uuid, PayPeriod), AttendanceSummary>>,
}

impl InMemoryAttendance {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the summary for one employee and pay period.
    pub fn record(&self, employee_id: Uuid, pay_period: PayPeriod, summary: AttendanceSummary) {
        let mut summaries = self
            .summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        summaries.insert((employee_id, pay_period), summary);
    }
}

impl AttendanceAggregator for InMemoryAttendance {
    fn monthly_attendance_summary(
        &self,
        employee_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<AttendanceSummary> {
        let pay_period = PayPeriod::new(year, month)?;
        let summaries = self.summaries.read().unwrap_or_else(PoisonError::into_inner);
        summaries
            .get(&(employee_id, pay_period))
            .copied()
            .ok_or_else(|| {
                EngineError::not_found(
                    "attendance summary",
                    format!("{}/{}", employee_id, pay_period),
                )
            })
    }
}
