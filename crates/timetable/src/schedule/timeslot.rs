//! Time-slot encoding used by the catalog.
//!
//! A course meets at comma-separated slots such as `"13,14"` (Monday
//! periods 3 and 4) or `"2T,2A"` (Tuesday evening periods). The first
//! character of each slot is the weekday (1..=7), the rest is the period
//! token.

use crate::catalog::Course;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Characters allowed in a time encoding.
static TIME_ENCODING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9TABC,]+$").unwrap());

/// Display order of periods, with their clock times.
pub const PERIOD_TABLE: [(&str, &str); 13] = [
    ("1", "08:10-09:00"),
    ("2", "09:10-10:00"),
    ("3", "10:10-11:00"),
    ("4", "11:10-12:00"),
    ("5", "13:10-14:00"),
    ("6", "14:10-15:00"),
    ("7", "15:10-16:00"),
    ("8", "16:10-17:00"),
    ("9", "17:10-18:00"),
    ("T", "18:30-19:20"),
    ("A", "19:20-20:10"),
    ("B", "20:20-21:10"),
    ("C", "21:10-22:00"),
];

/// Weekday labels, indexed by day number (index 0 unused).
pub const DAY_NAMES: [&str; 8] = ["", "週一", "週二", "週三", "週四", "週五", "週六", "週日"];

pub const MIN_DAY: u8 = 1;
pub const MAX_DAY: u8 = 7;

/// A period token. Numeric and lettered periods share one namespace, so
/// the token is kept as a string rather than an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Clock time for display, if the token is in the period table.
    pub fn clock_time(&self) -> Option<&'static str> {
        PERIOD_TABLE
            .iter()
            .find(|(token, _)| *token == self.0)
            .map(|(_, time)| *time)
    }

    /// Row position in the period table.
    pub fn order(&self) -> Option<usize> {
        PERIOD_TABLE.iter().position(|(token, _)| *token == self.0)
    }

    /// All known periods in display order.
    pub fn all() -> impl Iterator<Item = Period> {
        PERIOD_TABLE.iter().map(|(token, _)| Period::new(*token))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One weekly meeting occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// 1 = Monday .. 7 = Sunday
    pub day: u8,
    pub period: Period,
}

impl TimeSlot {
    pub fn new(day: u8, period: impl Into<String>) -> Self {
        Self {
            day,
            period: Period::new(period),
        }
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES.get(self.day as usize).copied().unwrap_or_default()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.day, self.period)
    }
}

/// Returns true if the string is a well-formed time encoding.
pub fn is_valid_encoding(encoding: &str) -> bool {
    TIME_ENCODING_REGEX.is_match(encoding)
}

/// Picks the course's time encoding: the primary field if it validates,
/// otherwise the fallback field, otherwise an empty string.
pub fn extract_time_encoding(course: &Course) -> &str {
    [course.class_time.as_deref(), course.alt_class_time.as_deref()]
        .into_iter()
        .flatten()
        .find(|encoding| is_valid_encoding(encoding))
        .unwrap_or_default()
}

/// Decodes a time encoding into slots.
///
/// Fragments shorter than two characters or with a weekday outside 1..=7
/// are dropped; the remaining fragments still decode.
pub fn decode(encoding: &str) -> Vec<TimeSlot> {
    if encoding.is_empty() {
        return Vec::new();
    }

    encoding
        .split(',')
        .map(str::trim)
        .filter_map(decode_part)
        .collect()
}

fn decode_part(part: &str) -> Option<TimeSlot> {
    let mut chars = part.chars();
    let day = chars.next()?.to_digit(10)?;
    let period = chars.as_str();

    if period.is_empty() || !(MIN_DAY as u32..=MAX_DAY as u32).contains(&day) {
        return None;
    }

    Some(TimeSlot::new(day as u8, period))
}

/// Decoded slots for a course.
pub fn course_slots(course: &Course) -> Vec<TimeSlot> {
    decode(extract_time_encoding(course))
}
