//! Age computation for denormalized patient views.

use chrono::{Datelike, NaiveDate};

use crate::error::{DomainError, DomainResult};

/// Date format birth dates are stored in.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Whole years elapsed between `birth` and `today`.
///
/// One year is subtracted while `today` falls before the birth month/day in
/// the current year. A 29 February birthday counts as reached on 1 March in
/// non-leap years.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Parse a stored `YYYY-MM-DD` birth date and compute the age on `today`.
pub fn age_from_birth_date(date_of_birth: &str, today: NaiveDate) -> DomainResult<i32> {
    let birth = NaiveDate::parse_from_str(date_of_birth.trim(), BIRTH_DATE_FORMAT)
        .map_err(|e| DomainError::invalid_date(format!("{date_of_birth:?}: {e}")))?;
    Ok(age_on(birth, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_before_birthday_is_not_yet_a_year_older() {
        assert_eq!(age_on(date(2000, 3, 10), date(2024, 3, 9)), 23);
    }

    #[test]
    fn birthday_itself_counts() {
        assert_eq!(age_on(date(2000, 3, 10), date(2024, 3, 10)), 24);
    }

    #[test]
    fn leap_day_birthday_in_non_leap_year() {
        let birth = date(2004, 2, 29);
        assert_eq!(age_on(birth, date(2023, 2, 28)), 18);
        assert_eq!(age_on(birth, date(2023, 3, 1)), 19);
    }

    #[test]
    fn parses_stored_text() {
        assert_eq!(age_from_birth_date("2000-03-10", date(2024, 3, 10)).unwrap(), 24);
    }

    #[test]
    fn rejects_unparseable_text() {
        assert!(matches!(
            age_from_birth_date("10/03/2000", date(2024, 3, 10)),
            Err(DomainError::InvalidDate(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Age never decreases as the observation date moves forward.
        #[test]
        fn age_is_monotonic(birth_offset in 0i64..40_000, a in 0i64..40_000, b in 0i64..40_000) {
            let epoch = date(1900, 1, 1);
            let birth = epoch + chrono::Duration::days(birth_offset);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let d1 = birth + chrono::Duration::days(lo);
            let d2 = birth + chrono::Duration::days(hi);
            prop_assert!(age_on(birth, d1) <= age_on(birth, d2));
            prop_assert!(age_on(birth, d1) >= 0);
        }
    }
}
