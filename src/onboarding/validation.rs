//! Guard predicates for the onboarding steps.
//!
//! All checks are pure. Functions that depend on the calendar take `today`
//! explicitly; [`today`] supplies the local date for callers that want "now".

use chrono::{Datelike, Local, NaiveDate};

/// Minimum age, in whole years, to complete onboarding.
pub const MIN_AGE_YEARS: i32 = 13;

/// The current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A name is valid when it contains something other than whitespace.
pub fn is_name_valid(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Whole calendar years elapsed from `date_of_birth` to `today`.
///
/// The count only ticks over once `today` reaches the birthday's month and
/// day, so a 29 February birthday is reached on 1 March in common years.
/// Negative when the birth date lies in the future.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years
}

pub fn is_old_enough(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    age_in_years(date_of_birth, today) >= MIN_AGE_YEARS
}
