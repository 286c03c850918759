use chrono::{Months, NaiveDate};

use crate::errors::{Error, Result};

/// Adds calendar months to a date.
///
/// When the target month is shorter than the source day, the result is
/// clamped to the last day of the target month (31 Jan + 1 month = 28/29 Feb).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| Error::invalid_input(format!("Date {} + {} months is out of range", date, months)))
}

/// Last scheduled month of a committee that rotates through `member_count`
/// members, one per month, starting at `start_date`.
pub fn committee_end_date(start_date: NaiveDate, member_count: usize) -> Result<NaiveDate> {
    if member_count == 0 {
        return Err(Error::invalid_input("Committee must have at least one member"));
    }
    let months = u32::try_from(member_count - 1)
        .map_err(|_| Error::invalid_input("Too many committee members"))?;
    add_months(start_date, months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_member_committee_ends_on_start() {
        let start = date(2025, 9, 11);
        assert_eq!(committee_end_date(start, 1).unwrap(), start);
    }

    #[test]
    fn test_end_date_crosses_year() {
        assert_eq!(
            committee_end_date(date(2025, 9, 11), 12).unwrap(),
            date(2026, 8, 11)
        );
    }

    #[test]
    fn test_end_date_clamps_to_month_end() {
        assert_eq!(committee_end_date(date(2025, 1, 31), 2).unwrap(), date(2025, 2, 28));
        assert_eq!(committee_end_date(date(2024, 1, 31), 2).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_zero_members_rejected() {
        assert!(committee_end_date(date(2025, 1, 1), 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_end_date_is_start_plus_members_minus_one(
            year in 2022i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            members in 1usize..240,
        ) {
            let start = date(year, month, day);
            let end = committee_end_date(start, members).unwrap();
            let elapsed = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
            prop_assert_eq!(elapsed, members as i32 - 1);
            prop_assert_eq!(end.day(), day);
        }
    }
}
