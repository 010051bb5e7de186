/// Booking periods and interval arithmetic
///
/// A booking occupies a car from its start instant for a whole number of days.
/// Two periods conflict when their closed intervals `[start, end]` intersect,
/// so a booking that ends at the exact instant another one starts still
/// conflicts with it.
///
/// # Example
///
/// ```
/// use carbooking_shared::booking::period::BookingPeriod;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
/// let first = BookingPeriod::new(start, 3).unwrap();
/// let second = BookingPeriod::new(start + Duration::days(2), 2).unwrap();
///
/// assert!(first.overlaps(&second));
/// assert_eq!(first.end(), start + Duration::days(3));
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Display format for booking start/end dates in car listings
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Error type for invalid periods
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("Duration must be at least 1 day, got {0}")]
    NonPositiveDuration(i32),

    #[error("Booking period is out of range")]
    OutOfRange,
}

/// Closed interval `[start, start + days]` of a booking, stored as its start
/// instant and a duration in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPeriod {
    start: DateTime<Utc>,
    days: i32,
}

impl BookingPeriod {
    /// Creates a period, rejecting durations below one day
    pub fn new(start: DateTime<Utc>, days: i32) -> Result<Self, PeriodError> {
        if days < 1 {
            return Err(PeriodError::NonPositiveDuration(days));
        }
        start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(PeriodError::OutOfRange)?;

        Ok(Self { start, days })
    }

    /// Start of the period
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Length in days
    pub fn days(&self) -> i32 {
        self.days
    }

    /// End of the period (`start + days`)
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::days(i64::from(self.days))
    }

    /// Closed-interval overlap test
    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.start <= other.end() && self.end() >= other.start
    }

    /// Whether the period ended strictly before `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end() < now
    }

    /// Whether the period has not ended yet at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
    }
}

/// Formats an instant for car listings (`YYYY-MM-DD HH:MM`)
pub fn format_display(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}
