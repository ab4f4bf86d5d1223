//! Leave type catalog entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Category of a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveCategory {
    /// Paid leave (annual, casual).
    Paid,
    /// Leave without pay.
    Unpaid,
    /// Sick leave.
    Sick,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Anything else granted by policy.
    Special,
}

impl LeaveCategory {
    /// The persisted form of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveCategory::Paid => "PAID",
            LeaveCategory::Unpaid => "UNPAID",
            LeaveCategory::Sick => "SICK",
            LeaveCategory::Maternity => "MATERNITY",
            LeaveCategory::Paternity => "PATERNITY",
            LeaveCategory::Special => "SPECIAL",
        }
    }
}

impl fmt::Display for LeaveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAID" => Ok(LeaveCategory::Paid),
            "UNPAID" => Ok(LeaveCategory::Unpaid),
            "SICK" => Ok(LeaveCategory::Sick),
            "MATERNITY" => Ok(LeaveCategory::Maternity),
            "PATERNITY" => Ok(LeaveCategory::Paternity),
            "SPECIAL" => Ok(LeaveCategory::Special),
            other => Err(EngineError::validation(
                "category",
                format!("unknown leave category '{}'", other),
            )),
        }
    }
}

/// A named leave category with its yearly entitlement and policy flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique display name (e.g., "Casual Leave").
    pub name: String,
    /// Unique short code (e.g., "CL").
    pub code: String,
    /// Category tag.
    pub category: LeaveCategory,
    /// Yearly entitlement in days.
    pub max_days_per_year: u32,
    /// Whether new balances and applications may use this type.
    pub is_active: bool,
    /// Whether applications need an approver.
    pub requires_approval: bool,
    /// Whether unused days may be paid out.
    pub allow_encashment: bool,
    /// Cap on days rolled into the next year.
    pub carry_forward_days: u32,
}

/// Fields for creating a leave type.
///
/// Also the shape of each entry in `leave_types.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaveType {
    /// Display name.
    pub name: String,
    /// Short code.
    pub code: String,
    /// Category tag.
    pub category: LeaveCategory,
    /// Yearly entitlement in days.
    pub max_days_per_year: u32,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub requires_approval: bool,
    /// Defaults to `false`.
    #[serde(default)]
    pub allow_encashment: bool,
    /// Defaults to `0`.
    #[serde(default)]
    pub carry_forward_days: u32,
}

fn default_true() -> bool {
    true
}

/// Administrative edit of a leave type. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTypeUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New short code.
    pub code: Option<String>,
    /// New category.
    pub category: Option<LeaveCategory>,
    /// New yearly entitlement.
    pub max_days_per_year: Option<u32>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
    /// Change the approval policy.
    pub requires_approval: Option<bool>,
    /// Change the encashment policy.
    pub allow_encashment: Option<bool>,
    /// Change the carry-forward cap.
    pub carry_forward_days: Option<u32>,
}

impl LeaveType {
    /// Builds a catalog entry from creation fields with a fresh id.
    pub fn from_new(new: NewLeaveType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            code: new.code,
            category: new.category,
            max_days_per_year: new.max_days_per_year,
            is_active: new.is_active,
            requires_approval: new.requires_approval,
            allow_encashment: new.allow_encashment,
            carry_forward_days: new.carry_forward_days,
        }
    }

    /// Applies an administrative edit in place.
    pub fn apply_update(&mut self, update: LeaveTypeUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(code) = update.code {
            self.code = code;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(max_days) = update.max_days_per_year {
            self.max_days_per_year = max_days;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(requires_approval) = update.requires_approval {
            self.requires_approval = requires_approval;
        }
        if let Some(allow_encashment) = update.allow_encashment {
            self.allow_encashment = allow_encashment;
        }
        if let Some(carry_forward) = update.carry_forward_days {
            self.carry_forward_days = carry_forward;
        }
    }
}
