//! US/Eastern calendar conversion and display helpers.

use time::{
    macros::format_description, Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
};

const EST: i8 = -5;
const EDT: i8 = -4;

fn nth_sunday(year: i32, month: Month, n: u8) -> Date {
    // day 1 exists for every month
    let first = Date::from_calendar_date(year, month, 1).unwrap_or(Date::MIN);
    let offset = (7 - first.weekday().number_days_from_sunday()) % 7;
    first + time::Duration::days(i64::from(offset) + 7 * i64::from(n - 1))
}

/// UTC offset of US/Eastern at the given instant.
///
/// Daylight time runs from 02:00 EST on the second Sunday of March to 02:00
/// EDT on the first Sunday of November. Those are the rules in force since
/// 2007; earlier instants near the old April/October switch dates get the
/// wrong offset.
pub fn eastern_offset(at: OffsetDateTime) -> UtcOffset {
    let utc = at.to_offset(UtcOffset::UTC);
    let year = utc.year();
    let two_am = Time::from_hms(2, 0, 0).unwrap_or(Time::MIDNIGHT);
    let dst_start = PrimitiveDateTime::new(nth_sunday(year, Month::March, 2), two_am)
        .assume_offset(hours(EST));
    let dst_end = PrimitiveDateTime::new(nth_sunday(year, Month::November, 1), two_am)
        .assume_offset(hours(EDT));
    if utc >= dst_start && utc < dst_end {
        hours(EDT)
    } else {
        hours(EST)
    }
}

fn hours(h: i8) -> UtcOffset {
    UtcOffset::from_hms(h, 0, 0).unwrap_or(UtcOffset::UTC)
}

pub fn to_eastern(at: OffsetDateTime) -> OffsetDateTime {
    at.to_offset(eastern_offset(at))
}

/// Calendar date of the instant in US/Eastern.
pub fn eastern_date(at: OffsetDateTime) -> Date {
    to_eastern(at).date()
}

/// Monday of the US/Eastern ISO week containing the instant.
pub fn eastern_week_start(at: OffsetDateTime) -> Date {
    let date = eastern_date(at);
    date - time::Duration::days(i64::from(date.weekday().number_days_from_monday()))
}

/// `Mar 4, 2024 9:05 PM` in US/Eastern.
pub fn format_date(at: OffsetDateTime) -> String {
    let local = to_eastern(at);
    let fmt = format_description!(
        "[month repr:short] [day padding:none], [year] [hour repr:12 padding:none]:[minute] [period]"
    );
    local.format(fmt).unwrap_or_else(|_| local.to_string())
}

/// `Mar 4, 2024` in US/Eastern.
pub fn format_day(at: OffsetDateTime) -> String {
    let local = to_eastern(at);
    let fmt = format_description!("[month repr:short] [day padding:none], [year]");
    local.format(fmt).unwrap_or_else(|_| local.to_string())
}

/// Zero-pads an account id to 16 digits in groups of four.
pub fn format_account_number(id: i64) -> String {
    let digits = format!("{:016}", id);
    digits
        .as_bytes()
        .chunks(4)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_fish_weight(lbs: f64) -> String {
    if lbs == 0.0 {
        return "-".into();
    }
    let whole = lbs.trunc() as i64;
    let oz = (lbs.fract() * 16.0).trunc() as i64;
    format!("{whole} lbs {oz} oz")
}

pub fn format_fish_length(inches: f64) -> String {
    if inches == 0.0 {
        return "-".into();
    }
    format!("{:.1} in", inches)
}
