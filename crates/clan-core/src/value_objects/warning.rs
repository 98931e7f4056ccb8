//! Member warnings
//!
//! Each warning carries a point value, an expiry date, and a reason.
//! A member's current warning points are the sum over non-expired entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single disciplinary warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub points: u32,
    pub expires: NaiveDate,
    pub reason: String,
}

impl Warning {
    pub fn new(points: u32, expires: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            points,
            expires,
            reason: reason.into(),
        }
    }

    /// Whether this warning still counts on the given date
    #[inline]
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.expires >= today
    }
}

/// Sum the points of all non-expired warnings
pub fn current_points(warnings: &[Warning], today: NaiveDate) -> u32 {
    warnings
        .iter()
        .filter(|w| w.is_active(today))
        .map(|w| w.points)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_expired_warnings_do_not_count() {
        let warnings = vec![
            Warning::new(2, date("2026-01-01"), "afk in event"),
            Warning::new(3, date("2026-12-31"), "spam"),
        ];
        assert_eq!(current_points(&warnings, date("2026-06-15")), 3);
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let warnings = vec![Warning::new(1, date("2026-06-15"), "late")];
        assert_eq!(current_points(&warnings, date("2026-06-15")), 1);
        assert_eq!(current_points(&warnings, date("2026-06-16")), 0);
    }
}
