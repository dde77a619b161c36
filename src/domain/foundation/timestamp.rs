//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns whichever of the two timestamps is later.
    pub fn later_of(self, other: Timestamp) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// RFC 3339 rendering used in JSON envelopes.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn add_days_crosses_month_boundary() {
        let ts = at(2025, 1, 1).add_days(30);
        assert_eq!(ts, at(2025, 1, 31));

        let ts = at(2025, 1, 31).add_days(30);
        assert_eq!(ts.as_datetime().month(), 3);
        assert_eq!(ts.as_datetime().day(), 2);
    }

    #[test]
    fn later_of_picks_the_later_value() {
        let early = at(2024, 6, 1);
        let late = at(2025, 1, 1);

        assert_eq!(early.later_of(late), late);
        assert_eq!(late.later_of(early), late);
        assert_eq!(late.later_of(late), late);
    }

    #[test]
    fn before_and_after_are_strict() {
        let a = at(2025, 1, 1);
        let b = at(2025, 1, 2);

        assert!(a.is_before(&b));
        assert!(b.is_after(&a));
        assert!(!a.is_before(&a));
    }

    #[test]
    fn timestamp_round_trips_through_json() {
        let ts = at(2024, 1, 15);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
