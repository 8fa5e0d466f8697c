//! Calendar arithmetic shared by the store and the report builders.

use time::{Date, Month};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

const MONTH_LENGTHS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Proleptic Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, or `None` when `month` is not in 1..=12.
pub fn days_in_month(year: i32, month: u8) -> Option<u8> {
    let len = *MONTH_LENGTHS.get(usize::from(month).checked_sub(1)?)?;
    if month == 2 && is_leap_year(year) {
        Some(len + 1)
    } else {
        Some(len)
    }
}

/// Moves `offset` months away from (year, month), rolling the year over at
/// December/January. `month` must already be in 1..=12.
pub fn shift_month(year: i32, month: u8, offset: i32) -> (i32, u8) {
    let zero_based = i32::from(month) + offset - 1;
    let target_month = zero_based.rem_euclid(12) + 1;
    let target_year = year + zero_based.div_euclid(12);
    (target_year, target_month as u8)
}

/// `"YYYY-MM"` key used for quarter results.
pub fn month_key(year: i32, month: u8) -> String {
    format!("{year:04}-{month:02}")
}

/// Inclusive date range `[first day, last day]` of the month.
pub fn month_bounds(year: i32, month: u8) -> anyhow::Result<(Date, Date)> {
    let month_enum = Month::try_from(month)?;
    let last_day = days_in_month(year, month)
        .ok_or_else(|| anyhow::anyhow!("month out of range: {month}"))?;
    let first = Date::from_calendar_date(year, month_enum, 1)?;
    let last = Date::from_calendar_date(year, month_enum, last_day)?;
    Ok((first, last))
}
