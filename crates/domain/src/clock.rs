use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Default age after which a server mirror is considered stale.
pub const DEFAULT_MAX_AGE: Duration = Duration::milliseconds(300_000);

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock(Cell<DateTime<Utc>>);

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Cell::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.0.set(now);
    }

    pub fn advance(&self, duration: Duration) {
        self.0.set(self.0.get() + duration);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (*self).now()
    }
}

/// A mirror is stale if it was never fetched or its age exceeds `max_age`.
#[must_use]
pub fn is_stale(
    last_fetched_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> bool {
    match last_fetched_at {
        Some(last_fetched_at) => now - last_fetched_at > max_age,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[rstest]
    #[case::never_fetched(None, true)]
    #[case::just_fetched(Some(Duration::zero()), false)]
    #[case::one_second(Some(Duration::seconds(1)), false)]
    #[case::exactly_max_age(Some(Duration::milliseconds(300_000)), false)]
    #[case::one_ms_past(Some(Duration::milliseconds(300_001)), true)]
    #[case::long_ago(Some(Duration::days(2)), true)]
    fn test_is_stale(#[case] age: Option<Duration>, #[case] expected: bool) {
        assert_eq!(
            is_stale(age.map(|age| t0() - age), t0(), DEFAULT_MAX_AGE),
            expected
        );
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(t0());
        assert_eq!(clock.now(), t0());
        clock.advance(Duration::minutes(3));
        assert_eq!(clock.now(), t0() + Duration::minutes(3));
        clock.set(t0());
        assert_eq!((&clock).now(), t0());
    }
}
