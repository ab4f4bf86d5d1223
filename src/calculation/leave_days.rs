//! Leave day counting and date range overlap detection.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};

/// Counts the days covered by a leave request.
///
/// The count is inclusive of both ends and covers every calendar day in the
/// range. Weekends and public holidays are counted like any other day.
///
/// # Errors
///
/// Returns a `Validation` error if `end_date` is before `start_date`.
///
/// # Examples
///
/// ```
/// use hrm_engine::calculation::calculate_leave_days;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(calculate_leave_days(start, start).unwrap(), 1);
/// assert_eq!(calculate_leave_days(start, end).unwrap(), 5);
/// ```
pub fn calculate_leave_days(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<u32> {
    if end_date < start_date {
        return Err(EngineError::validation(
            "end_date",
            format!(
                "end date {} is before start date {}",
                end_date, start_date
            ),
        ));
    }

    let span = (end_date - start_date).num_days() + 1;
    u32::try_from(span)
        .map_err(|_| EngineError::validation("end_date", "leave range is too long"))
}

/// Returns true if `[a_start, a_end]` and `[b_start, b_end]` share at least
/// one calendar day.
///
/// # Examples
///
/// ```
/// use hrm_engine::calculation::date_ranges_overlap;
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
/// assert!(date_ranges_overlap(d(10), d(15), d(12), d(20)));
/// assert!(!date_ranges_overlap(d(10), d(15), d(16), d(20)));
/// ```
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_counts_as_one() {
        assert_eq!(
            calculate_leave_days(date(2024, 1, 1), date(2024, 1, 1)).unwrap(),
            1
        );
    }

    #[test]
    fn test_five_day_range() {
        assert_eq!(
            calculate_leave_days(date(2024, 1, 1), date(2024, 1, 5)).unwrap(),
            5
        );
    }

    #[test]
    fn test_weekends_are_counted() {
        // Friday 2024-03-08 to Monday 2024-03-11
        assert_eq!(
            calculate_leave_days(date(2024, 3, 8), date(2024, 3, 11)).unwrap(),
            4
        );
    }

    #[test]
    fn test_range_across_leap_day() {
        assert_eq!(
            calculate_leave_days(date(2024, 2, 28), date(2024, 3, 1)).unwrap(),
            3
        );
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = calculate_leave_days(date(2024, 1, 5), date(2024, 1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        assert!(!date_ranges_overlap(
            date(2024, 3, 10),
            date(2024, 3, 15),
            date(2024, 3, 16),
            date(2024, 3, 20)
        ));
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        assert!(date_ranges_overlap(
            date(2024, 3, 10),
            date(2024, 3, 15),
            date(2024, 3, 15),
            date(2024, 3, 20)
        ));
    }

    #[test]
    fn test_containing_range_overlaps() {
        assert!(date_ranges_overlap(
            date(2024, 3, 1),
            date(2024, 3, 31),
            date(2024, 3, 10),
            date(2024, 3, 12)
        ));
        assert!(date_ranges_overlap(
            date(2024, 3, 10),
            date(2024, 3, 12),
            date(2024, 3, 1),
            date(2024, 3, 31)
        ));
    }
}
