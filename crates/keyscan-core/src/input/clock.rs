// Keyscan Input Layer - Event Clock
// Kernel event timestamps mapped onto the monotonic clock

use std::time::{Instant, SystemTime};

/// Places wall-clock event timestamps on the `Instant` timeline.
///
/// evdev stamps each event when the key was pressed. Keystroke gaps must be
/// measured between those stamps: events that queued up while the process
/// was stalled arrive in one batch, and stamping them at read time would
/// make slow typing look like a scanner burst.
///
/// Take one anchor per batch, right after the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventClock {
    instant: Instant,
    wall: SystemTime,
}

impl EventClock {
    pub fn now() -> Self {
        Self::anchored(Instant::now(), SystemTime::now())
    }

    pub fn anchored(instant: Instant, wall: SystemTime) -> Self {
        Self { instant, wall }
    }

    /// When an event stamped `timestamp` happened.
    ///
    /// Stamps later than the anchor (wall clock stepped back) and stamps
    /// older than the monotonic clock itself map to the anchor.
    pub fn instant_of(&self, timestamp: SystemTime) -> Instant {
        match self.wall.duration_since(timestamp) {
            Ok(age) => self.instant.checked_sub(age).unwrap_or(self.instant),
            Err(_) => self.instant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_preserves_gaps_between_stamps() {
        let read_at = Instant::now();
        let wall = SystemTime::now();
        let clock = EventClock::anchored(read_at, wall);

        let first = clock.instant_of(wall - Duration::from_millis(900));
        let second = clock.instant_of(wall - Duration::from_millis(600));
        assert_eq!(second - first, Duration::from_millis(300));
        assert_eq!(read_at - second, Duration::from_millis(600));
    }

    #[test]
    fn test_future_stamp_maps_to_anchor() {
        let read_at = Instant::now();
        let wall = SystemTime::now();
        let clock = EventClock::anchored(read_at, wall);
        assert_eq!(clock.instant_of(wall + Duration::from_secs(5)), read_at);
        assert_eq!(clock.instant_of(wall), read_at);
    }
}
