//! Year-end carry-forward calculation.

use crate::models::LeaveBalance;

/// Determines how many unused days roll into the next year.
///
/// The carried amount is the previous year's remaining days, capped by the
/// leave type's carry-forward policy. Without a previous-year balance
/// nothing is carried.
///
/// # Examples
///
/// ```
/// use hrm_engine::calculation::calculate_carry_forward;
/// use hrm_engine::models::LeaveBalance;
/// use uuid::Uuid;
///
/// let mut previous = LeaveBalance::open(Uuid::new_v4(), Uuid::new_v4(), 2023, 10, 0);
/// previous.debit(4).unwrap();
///
/// assert_eq!(calculate_carry_forward(Some(&previous), 5), 5);
/// assert_eq!(calculate_carry_forward(Some(&previous), 10), 6);
/// assert_eq!(calculate_carry_forward(None, 5), 0);
/// ```
pub fn calculate_carry_forward(previous: Option<&LeaveBalance>, cap: u32) -> u32 {
    previous
        .map(|balance| balance.remaining_days().min(cap))
        .unwrap_or(0)
}
