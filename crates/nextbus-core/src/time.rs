//! Time token normalization.
//!
//! Timetables mix `7:05`, `07.05`, `0705` and overnight notation such as
//! `2530`. Everything is reduced to a [`CanonicalTime`].

use std::fmt;

use chrono::{NaiveTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};

lazy_static! {
    // HH:MM or H:MM
    static ref TIME_COLON: Regex = Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap();

    // HH.MM or H.MM
    static ref TIME_DOT: Regex = Regex::new(r"^(\d{1,2})\.(\d{2})$").unwrap();

    // HHMM or HMM
    static ref TIME_COMPACT: Regex = Regex::new(r"^(\d{1,2})(\d{2})$").unwrap();
}

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalTime {
    hour: u8,
    minute: u8,
}

impl CanonicalTime {
    /// Build a time, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                hour: hour as u8,
                minute: minute as u8,
            })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Whole minutes from `self` until `later`. Negative when `later` is earlier.
    pub fn minutes_until(&self, later: CanonicalTime) -> i64 {
        later.minutes_since_midnight() as i64 - self.minutes_since_midnight() as i64
    }

    /// Parse a textual token. See [`parse_time`].
    pub fn parse(token: &str) -> Option<Self> {
        parse_time(token)
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for CanonicalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<CanonicalTime> for NaiveTime {
    fn from(time: CanonicalTime) -> Self {
        // Components are range-checked on construction.
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for CanonicalTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

/// Parse a time token into a [`CanonicalTime`].
///
/// Shapes are tried in order: colon-separated, dot-separated, then three or
/// four compact digits. Hours of 24 and above are reduced modulo 24 to
/// handle overnight service notation. A shape whose numbers are out of range
/// falls through to the next one.
pub fn parse_time(token: &str) -> Option<CanonicalTime> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    for pattern in [&*TIME_COLON, &*TIME_DOT, &*TIME_COMPACT] {
        let Some(caps) = pattern.captures(token) else {
            continue;
        };

        let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
            continue;
        };

        if let Some(time) = CanonicalTime::new(hour % 24, minute) {
            return Some(time);
        }
    }

    None
}

/// Whether a token has one of the recognized time shapes, regardless of range.
pub fn is_time_shaped(token: &str) -> bool {
    let token = token.trim();
    TIME_COLON.is_match(token) || TIME_DOT.is_match(token) || TIME_COMPACT.is_match(token)
}
