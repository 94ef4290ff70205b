//! Season calendar.
//!
//! Deterministic, pure lookups. No IO, no wall-clock, no locale.
//!
//! # Design
//!
//! The month→season partition and the month-name table are fixed `const`
//! arrays indexed by `month - 1`. Every month 1..=12 maps to exactly one
//! [`Season`]:
//!
//! | Season | Months     |
//! |--------|------------|
//! | Winter | 12, 1, 2   |
//! | Spring | 3, 4, 5    |
//! | Summer | 6, 7, 8    |
//! | Fall   | 9, 10, 11  |

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// One of the four fixed retail seasons.
///
/// Serializes as the capitalised name (`"Winter"`, `"Spring"`, ...), which is
/// also the value the upstream seasonal query emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// All seasons in calendar-display order.
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }

    /// Position of this season in [`Season::ALL`].
    pub fn ordinal(self) -> usize {
        match self {
            Season::Winter => 0,
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
        }
    }

    /// Parse a season name. Case-insensitive; surrounding whitespace ignored.
    /// `Autumn` is accepted as a synonym for `Fall`.
    pub fn parse(s: &str) -> Result<Self, SeasonParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            _ => Err(SeasonParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::parse(s)
    }
}

/// A season string outside the fixed four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonParseError(pub String);

impl fmt::Display for SeasonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid season '{}'. expected one of: Winter | Spring | Summer | Fall",
            self.0
        )
    }
}

impl std::error::Error for SeasonParseError {}

// ---------------------------------------------------------------------------
// Fixed tables
// ---------------------------------------------------------------------------

/// Calendar months in ascending order.
pub const MONTHS: std::ops::RangeInclusive<u8> = 1..=12;

/// English month names indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Season of each month indexed by `month - 1`.
pub const MONTH_TO_SEASON: [Season; 12] = [
    Season::Winter, // January
    Season::Winter, // February
    Season::Spring, // March
    Season::Spring, // April
    Season::Spring, // May
    Season::Summer, // June
    Season::Summer, // July
    Season::Summer, // August
    Season::Fall,   // September
    Season::Fall,   // October
    Season::Fall,   // November
    Season::Winter, // December
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Returns `true` when `month` is a calendar month (1..=12).
pub fn is_valid_month(month: u8) -> bool {
    MONTHS.contains(&month)
}

/// Season for `month`, or `None` when `month` is outside 1..=12.
pub fn try_season_of(month: u8) -> Option<Season> {
    if is_valid_month(month) {
        Some(MONTH_TO_SEASON[usize::from(month - 1)])
    } else {
        None
    }
}

/// Season for `month`.
///
/// # Panics
/// Panics when `month` is outside 1..=12. Callers must validate first (see
/// [`crate::validate_facts`]); an out-of-range month here is a defect.
pub fn season_of(month: u8) -> Season {
    match try_season_of(month) {
        Some(season) => season,
        None => panic!("season_of: month {month} is outside 1..=12"),
    }
}

/// English name for `month`.
///
/// # Panics
/// Panics when `month` is outside 1..=12.
pub fn month_name(month: u8) -> &'static str {
    assert!(is_valid_month(month), "month_name: month {month} is outside 1..=12");
    MONTH_NAMES[usize::from(month - 1)]
}
