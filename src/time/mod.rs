//! Time module for astronomical time calculations
//!
//! This module provides Julian-day handling, calendar conversion and the
//! ΔT model relating Terrestrial Time to Universal Time. The apparent
//! position pipeline takes epochs in TT; ΔT is only consulted when Earth
//! rotation (sidereal time) is involved.

use crate::constants::{DAY_S, GREGORIAN_START, J2000};
use chrono::{DateTime, Datelike, Timelike, Utc};
use thiserror::Error;

pub use crate::constants::JULIAN_CENTURY_DAYS;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),

    #[error("Calendar error: {0}")]
    CalendarError(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Calendar tuple for representing a date and time
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarTuple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

/// Julian centuries of TT since J2000.0
pub fn julian_centuries(jd_tt: f64) -> f64 {
    (jd_tt - J2000) / JULIAN_CENTURY_DAYS
}

/// Calculate Julian day number from calendar date
///
/// This follows the algorithm in the Explanatory Supplement to the
/// Astronomical Almanac 15.11, with the Gregorian reform applied at
/// 1582-10-15.
pub fn julian_day(year: i32, month: u32, day: u32) -> i32 {
    // Support months outside of the 1-12 range by adjusting the year
    let month_0 = month as i32 - 1;
    let year = year + month_0.div_euclid(12);
    let month = (month_0.rem_euclid(12) + 1) as u32;

    let janfeb = month <= 2;
    let g = year + 4716 - if janfeb { 1 } else { 0 };
    let f = (month + 9) % 12;
    let e = 1461 * g / 4 + day as i32 - 1402;
    let mut j = e + (153 * f as i32 + 2) / 5;

    if j >= GREGORIAN_START {
        j += 38 - (g + 184) / 100 * 3 / 4;
    }

    j
}

/// Convert a calendar date and time to a Julian date
pub fn calendar_to_jd(cal: &CalendarTuple) -> f64 {
    let jd = julian_day(cal.year, cal.month, cal.day) as f64;
    let day_fraction =
        (cal.hour as f64 + cal.minute as f64 / 60.0 + cal.second / 3600.0) / 24.0;
    // julian_day() yields the day number for noon; shift to the civil midnight epoch
    jd - 0.5 + day_fraction
}

/// Convert a Julian date to a calendar date and time
pub fn jd_to_calendar(jd: f64) -> CalendarTuple {
    let jd_plus_half = jd + 0.5;
    let z = jd_plus_half.floor() as i64;
    let f = jd_plus_half - jd_plus_half.floor();

    // Richards' inverse of the Julian day number algorithm
    let mut e = z + 1401;
    if z >= GREGORIAN_START as i64 {
        e += (4 * z + 274_277) / 146_097 * 3 / 4 - 38;
    }
    let e = 4 * e + 3;
    let g = e % 1461 / 4;
    let h = 5 * g + 2;
    let day = (h % 153 / 5 + 1) as i32;
    let month = ((h / 153 + 2) % 12 + 1) as i32;
    let year = (e / 1461 - 4716 + (14 - month as i64) / 12) as i32;

    let seconds_in_day = f * DAY_S;
    let hour = (seconds_in_day / 3600.0).floor() as u32;
    let minute = ((seconds_in_day - hour as f64 * 3600.0) / 60.0).floor() as u32;
    let second = seconds_in_day - hour as f64 * 3600.0 - minute as f64 * 60.0;

    CalendarTuple {
        year,
        month: month as u32,
        day: day as u32,
        hour,
        minute,
        second,
    }
}

/// Julian date (treated as UTC, ignoring leap seconds) from a chrono datetime
pub fn jd_from_datetime(dt: &DateTime<Utc>) -> f64 {
    calendar_to_jd(&CalendarTuple {
        year: dt.year(),
        month: dt.month(),
        day: dt.day(),
        hour: dt.hour(),
        minute: dt.minute(),
        second: dt.second() as f64 + dt.nanosecond() as f64 / 1_000_000_000.0,
    })
}

/// Calculate ΔT = TT - UT1 in seconds for a TT Julian date
///
/// Piecewise polynomial approximation (Espenak & Meeus), valid over the
/// whole epoch window of the analytic series. Typical accuracy is a few
/// seconds outside the telescopic era and well under a second for the
/// 20th and 21st centuries.
pub fn delta_t_seconds(jd_tt: f64) -> f64 {
    let year = 2000.0 + (jd_tt - J2000) / 365.25;
    delta_t_for_year(year)
}

fn delta_t_for_year(year: f64) -> f64 {
    if year < -500.0 {
        // Long-term parabolic approximation
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    } else if year < 500.0 {
        let t = year / 100.0;
        10583.6 - 1014.41 * t + 33.78311 * t * t - 5.952053 * t.powi(3) - 0.1798452 * t.powi(4)
            + 0.022174192 * t.powi(5)
            + 0.0090316521 * t.powi(6)
    } else if year < 1600.0 {
        let t = (year - 1000.0) / 100.0;
        1574.2 - 556.01 * t + 71.23472 * t * t + 0.319781 * t.powi(3)
            - 0.8503463 * t.powi(4)
            - 0.005050998 * t.powi(5)
            + 0.0083572073 * t.powi(6)
    } else if year < 1700.0 {
        let t = year - 1600.0;
        120.0 - 0.9808 * t - 0.01532 * t * t + t.powi(3) / 7129.0
    } else if year < 1800.0 {
        let t = year - 1700.0;
        8.83 + 0.1603 * t - 0.0059285 * t * t + 0.00013336 * t.powi(3) - t.powi(4) / 1_174_000.0
    } else if year < 1860.0 {
        let t = year - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t * t + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if year < 1900.0 {
        let t = year - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t * t + 0.01680668 * t.powi(3) - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t * t + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t * t + 0.0020936 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t * t
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else if year < 2150.0 {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

/// Convert a TT Julian date to UT1
pub fn tt_to_ut(jd_tt: f64) -> f64 {
    jd_tt - delta_t_seconds(jd_tt) / DAY_S
}
