//! Sources of wall-clock time for deadline checks.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

/// Reads the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system's real-time clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a clock starting at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = saturating_add(*now, by);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Converts a possibly fractional number of seconds into a `Duration`,
/// at microsecond resolution. Out-of-range values clamp.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() {
        return Duration::zero();
    }
    // `as` saturates at the i64 bounds.
    let micros = (seconds * 1_000_000.0).round() as i64;
    Duration::microseconds(micros)
}

/// Adds `span` to `instant`, clamping to the representable range.
pub fn saturating_add(instant: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    instant.checked_add_signed(span).unwrap_or(if span < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_seconds_keep_microsecond_precision() {
        assert_eq!(seconds_to_duration(1.5), Duration::milliseconds(1500));
        assert_eq!(seconds_to_duration(-2.0), Duration::seconds(-2));
        assert_eq!(seconds_to_duration(f64::NAN), Duration::zero());
    }

    #[test]
    fn huge_spans_clamp_instead_of_overflowing() {
        let now = Utc::now();
        let far = saturating_add(now, seconds_to_duration(f64::MAX));
        assert_eq!(far, DateTime::<Utc>::MAX_UTC);
        let past = saturating_add(now, seconds_to_duration(f64::MIN));
        assert_eq!(past, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::starting_now();
        let start = clock.now();
        assert_eq!(clock.now(), start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now() - start, Duration::seconds(90));
    }
}
