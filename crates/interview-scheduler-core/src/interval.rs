//! Half-open time spans used for slots, breaks and event days.
//!
//! Timestamps are naive local date-times: every input of an event is
//! expressed in the venue's wall clock, so no time zone is attached.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::IntervalError;

/// Accepted timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601-like timestamp (`T` or space separator, optional seconds).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Exact `(start, end)` pair shared by every slot with the same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeKey {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A half-open span `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct TimeInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::from_bounds(raw.start, raw.end)
    }
}

impl From<TimeInterval> for RawInterval {
    fn from(interval: TimeInterval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
        }
    }
}

impl TimeInterval {
    /// Create an interval starting at `start` and lasting `duration`.
    pub fn new(start: NaiveDateTime, duration: Duration) -> Result<Self, IntervalError> {
        Self::from_bounds(start, start + duration)
    }

    /// Create an interval from explicit bounds.
    pub fn from_bounds(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, IntervalError> {
        if start >= end {
            return Err(IntervalError::Range { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from ISO-8601-like strings.
    ///
    /// # Errors
    ///
    /// [`IntervalError::Format`] if either timestamp is unparsable,
    /// [`IntervalError::Range`] if the start is not strictly before the end.
    pub fn parse(start: &str, end: &str) -> Result<Self, IntervalError> {
        match (parse_timestamp(start), parse_timestamp(end)) {
            (Some(s), Some(e)) => Self::from_bounds(s, e),
            _ => Err(IntervalError::Format {
                start: start.to_string(),
                end: end.to_string(),
            }),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn key(&self) -> TimeKey {
        TimeKey {
            start: self.start,
            end: self.end,
        }
    }

    /// Strict overlap: touching endpoints do not intersect.
    pub fn is_intersecting(&self, other: &TimeInterval) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Non-strict containment of `other` within `self`.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// First interval in `others` overlapping this one.
    pub fn first_overlap<'a, I>(&self, others: I) -> Option<&'a TimeInterval>
    where
        I: IntoIterator<Item = &'a TimeInterval>,
    {
        others.into_iter().find(|other| self.is_intersecting(other))
    }
}

impl From<TimeKey> for TimeInterval {
    fn from(key: TimeKey) -> Self {
        Self {
            start: key.start,
            end: key.end,
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{},{}]",
            self.start.format("%b %d"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}
