//! External collaborators.
//!
//! The engine reads employees from a directory and attendance counts from an
//! aggregator it does not own. Both are traits so any backing service can
//! be plugged in; in-memory implementations are provided for embedding and
//! tests.

mod attendance;
mod directory;

pub use attendance::{AttendanceAggregator, InMemoryAttendance};
pub use directory::{EmployeeDirectory, InMemoryDirectory};
