//! Clock adapters.

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    pub fn at(timestamp: Timestamp) -> Self {
        Self(timestamp)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_does_not_move() {
        let ts = Timestamp::now().add_days(-400);
        let clock = FixedClock::at(ts);
        assert_eq!(clock.now(), ts);
        assert_eq!(clock.now(), ts);
    }

    #[test]
    fn system_clock_tracks_now() {
        let before = Timestamp::now();
        let now = SystemClock.now();
        assert!(!now.is_before(&before));
    }
}
