//! Date parsing and calendar arithmetic for clinic records.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const DAY_FIRST: &str = "%d/%m/%Y";
const ISO: &str = "%Y-%m-%d";
const ISO_DATETIME: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse `YYYY-MM-DD` (optionally with a time part) or `DD/MM/YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, ISO) {
        return Some(d);
    }
    for fmt in ISO_DATETIME {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, DAY_FIRST).ok()
}

/// Completed years between `dob` and `reference`: the naive year difference,
/// minus one when the reference month/day falls before the birth month/day.
pub fn completed_years(dob: NaiveDate, reference: NaiveDate) -> i32 {
    let years = reference.year() - dob.year();
    if (reference.month(), reference.day()) < (dob.month(), dob.day()) {
        years - 1
    } else {
        years
    }
}

/// Whole days from `from` to `to`; missing when either side is.
pub fn day_count(to: Option<NaiveDate>, from: Option<NaiveDate>) -> Option<i64> {
    Some((to? - from?).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn accepts_iso_day_first_and_timestamps() {
        assert_eq!(parse_date("2024-10-10"), Some(d(2024, 10, 10)));
        assert_eq!(parse_date("07/10/2024"), Some(d(2024, 10, 7)));
        assert_eq!(parse_date("2024-10-10 00:00:00"), Some(d(2024, 10, 10)));
        assert_eq!(parse_date(" 2024-10-10T08:30:00 "), Some(d(2024, 10, 10)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("31/02/2024"), None);
    }

    #[test]
    fn age_on_birthday_and_day_before() {
        let reference = d(2024, 10, 7);
        assert_eq!(completed_years(reference, reference), 0);
        assert_eq!(completed_years(d(1990, 10, 7), reference), 34);
        assert_eq!(completed_years(d(1990, 10, 8), reference), 33);
        assert_eq!(completed_years(d(1990, 10, 6), reference), 34);
    }

    #[test]
    fn day_count_between_visits() {
        assert_eq!(day_count(Some(d(2024, 10, 10)), Some(d(2024, 10, 1))), Some(9));
        assert_eq!(day_count(Some(d(2024, 10, 1)), Some(d(2024, 10, 10))), Some(-9));
        assert_eq!(day_count(None, Some(d(2024, 10, 1))), None);
    }

    proptest! {
        #[test]
        fn age_is_naive_difference_or_one_less(y in 1900i32..2024, m in 1u32..=12, day in 1u32..=28) {
            let reference = d(2024, 10, 7);
            let dob = d(y, m, day);
            let age = completed_years(dob, reference);
            let naive = 2024 - y;
            prop_assert!(age == naive || age == naive - 1);
            prop_assert!(age >= 0);
        }
    }
}
