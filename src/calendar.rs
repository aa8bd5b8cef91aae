//! Weekday arithmetic and the meal expiration rule.
//!
//! All functions take "now" explicitly so callers decide the clock and
//! time zone (the binaries pass `chrono::Local::now()`).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::models::date::Date;

/// Days to add to `today` to reach the next occurrence of `target`.
///
/// Always in `0..=6`; `0` means `target` is `today`. Not commutative:
/// Monday→Tuesday is 1 while Tuesday→Monday is 6.
#[must_use]
pub fn day_offset(today: Weekday, target: Weekday) -> u32 {
    (target.num_days_from_sunday() + 7 - today.num_days_from_sunday()) % 7
}

/// Resolve a weekday to the concrete date of its next occurrence.
///
/// Returns `now` itself when `target` is today's weekday, never a past date
/// and never more than six days ahead.
#[must_use]
pub fn resolve_date(now: NaiveDate, target: Weekday) -> Date {
    let offset = day_offset(now.weekday(), target);
    Date::from(now + Duration::days(i64::from(offset)))
}

/// The calendar day after `now`.
#[must_use]
pub fn tomorrow(now: NaiveDate) -> Date {
    Date::from(now + Duration::days(1))
}

/// Whether a meal dated `meal_date` has expired at `now`.
///
/// Expired means `now` is later than midnight of the meal's date plus one
/// day. Dates that cannot be represented count as expired.
#[must_use]
pub fn is_expired(meal_date: Date, now: NaiveDateTime) -> bool {
    match meal_date.to_naive() {
        Ok(date) => now > date.and_time(NaiveTime::MIN) + Duration::days(1),
        Err(_) => true,
    }
}
