//! Date normalization for heterogeneous source formats.
//!
//! The manual sheets record dates as Portuguese abbreviated strings such as
//! `8-dez.23-qui.` (day, abbreviated month, two-digit year, weekday suffix),
//! the consolidated tab uses `dd/mm/yyyy HH:MM`, and the calendar feeds hand
//! over structured timestamps. Everything funnels through [`parse_flexible`];
//! a value no shape accepts is reported as `None` and the owning row is
//! dropped by the caller. Parsing never raises.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::{DEFAULT_CHECK_IN_HOUR, DEFAULT_CHECK_OUT_HOUR};

/// Portuguese month abbreviations in calendar order. The first abbreviation
/// found in the input is substituted; the sources never carry more than one.
const MONTH_ABBREVIATIONS: [(&str, &str); 12] = [
    ("jan", "01"),
    ("fev", "02"),
    ("mar", "03"),
    ("abr", "04"),
    ("mai", "05"),
    ("jun", "06"),
    ("jul", "07"),
    ("ago", "08"),
    ("set", "09"),
    ("out", "10"),
    ("nov", "11"),
    ("dez", "12"),
];

/// Day-month-year shapes tried after month substitution, in order.
const PT_DATE_FORMATS: [&str; 6] =
    ["%d-%m.%y", "%d-%m-%y", "%d/%m/%y", "%d-%m.%Y", "%d-%m-%Y", "%d/%m/%Y"];

/// Generic day-first fallback shapes carrying a time of day.
const DAY_FIRST_DATETIME_FORMATS: [&str; 6] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Generic day-first fallback shapes without a time of day.
const DAY_FIRST_DATE_FORMATS: [&str; 5] =
    ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%Y-%m-%d"];

/// Which end of a stay a timestamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayBoundary {
    CheckIn,
    CheckOut,
}

/// Parse a textual date in any of the admissible shapes.
///
/// Resolution order: the consolidated-tab format (`14/12/2025 18:30`), the
/// Portuguese abbreviated shape, then a generic day-first fallback. Returns
/// `None` when nothing matches.
pub fn parse_flexible(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%d/%m/%Y %H:%M") {
        return Some(dt);
    }

    parse_pt_date(trimmed).or_else(|| parse_day_first(trimmed))
}

/// Parse the Portuguese abbreviated-month shape (`8-dez.23-qui.`).
///
/// Strips one trailing period, then a three-letter weekday suffix preceded
/// by `-` or `.` (only while the remainder stays longer than four
/// characters), substitutes the month abbreviation, and tries the fixed
/// day-month-year format list. Bare dates resolve to midnight.
pub fn parse_pt_date(input: &str) -> Option<NaiveDateTime> {
    let mut cleaned: Vec<char> = input.trim().chars().collect();

    if cleaned.len() > 4 && cleaned.last() == Some(&'.') {
        cleaned.pop();
    }

    // Weekday suffix: `-qui`, `.sáb` and friends are always separator + three
    // characters from the end.
    if cleaned.len() > 4 {
        let sep = cleaned[cleaned.len() - 4];
        if sep == '-' || sep == '.' {
            cleaned.truncate(cleaned.len() - 4);
        }
    }

    let mut lowered: String = cleaned.into_iter().collect::<String>().to_lowercase();
    for (abbreviation, month_number) in MONTH_ABBREVIATIONS {
        if let Some(pos) = lowered.find(abbreviation) {
            lowered.replace_range(pos..pos + abbreviation.len(), month_number);
            break;
        }
    }

    for format in PT_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&lowered, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Generic day-first fallback over a fixed format list.
fn parse_day_first(input: &str) -> Option<NaiveDateTime> {
    for format in DAY_FIRST_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }

    for format in DAY_FIRST_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Shift an exact-midnight timestamp to the default check-in (15:00) or
/// check-out (11:00) hour.
///
/// Timestamps already carrying a time of day pass through untouched, which
/// makes the rule idempotent: a midnight date shifted to 15:00 is not
/// re-shifted on a second pass. A genuinely supplied midnight check-in is
/// indistinguishable from a bare date and gets shifted too; the sources
/// cannot express that case, so the ambiguity is accepted.
pub fn apply_default_hours(dt: NaiveDateTime, boundary: StayBoundary) -> NaiveDateTime {
    if dt.time() != NaiveTime::MIN {
        return dt;
    }

    let hours = match boundary {
        StayBoundary::CheckIn => DEFAULT_CHECK_IN_HOUR,
        StayBoundary::CheckOut => DEFAULT_CHECK_OUT_HOUR,
    };
    dt + Duration::hours(hours)
}
