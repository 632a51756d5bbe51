use chrono::{DateTime, TimeZone, Utc};

/// Source of the timestamps stamped onto an exam attempt.
///
/// The session controller reads `started_at` and `completed_at` through
/// this so tests can pin an attempt to a known instant instead of the
/// wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// The system wall clock.
    #[default]
    Wall,
    /// Frozen at a single instant.
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
            Clock::Wall => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// A Saturday-morning sitting, used as the frozen instant in tests.
///
/// # Panics
///
/// Panics if the timestamp cannot be represented, which it always can.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0)
        .single()
        .expect("timestamp is unambiguous in UTC")
}

/// A `Clock` frozen at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_always_reads_the_same_instant() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());
        assert_eq!(clock.now(), clock.now());
    }
}
