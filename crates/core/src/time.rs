use chrono::{DateTime, Duration, Utc};

/// Length of one weekly-challenge rotation bucket.
pub const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Wall-clock source for the engine.
///
/// Services take a `Clock` instead of calling `Utc::now()` so that grace
/// deadlines, completion timestamps and the weekly rotation can be pinned in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. No effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Number of whole 7-day buckets since the Unix epoch.
///
/// Buckets start on Thursdays (1970-01-01 was a Thursday), so this is not a
/// calendar week. Negative timestamps floor towards the earlier bucket.
#[must_use]
pub fn epoch_week(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis().div_euclid(WEEK_MILLIS)
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(2));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(2));
    }

    #[test]
    fn epoch_week_buckets_by_seven_days() {
        let start = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(epoch_week(start), 0);
        assert_eq!(epoch_week(start + Duration::days(6)), 0);
        assert_eq!(epoch_week(start + Duration::days(7)), 1);
        assert_eq!(epoch_week(start - Duration::milliseconds(1)), -1);
    }

    #[test]
    fn fixed_now_is_in_week_2810() {
        // 1_700_000_000_000 / 604_800_000 = 2810.84...
        assert_eq!(epoch_week(fixed_now()), 2810);
    }
}
