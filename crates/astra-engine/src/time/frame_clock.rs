use std::time::{Duration, Instant};

/// Timing of one presented frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Monotonic frame counter, starting at 0.
    pub index: u64,

    /// Clamped time since the previous tick.
    pub dt: Duration,
}

/// Produces [`FrameTime`] snapshots for one frame loop.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// produce pathological values.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous tick; the next one reports `dt_min`.
    ///
    /// Called when a loop starts so setup time is not counted as a frame.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            Some(last) => now
                .saturating_duration_since(last)
                .clamp(self.dt_min, self.dt_max),
            None => self.dt_min,
        };
        self.last = Some(now);

        let time = FrameTime {
            index: self.index,
            dt,
        };
        self.index = self.index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_reports_the_minimum() {
        let mut clock = FrameClock::new();
        let t = clock.tick();
        assert_eq!(t.index, 0);
        assert_eq!(t.dt, FrameClock::DEFAULT_DT_MIN);
    }

    #[test]
    fn delta_is_clamped_on_both_sides() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);

        let long = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(long.dt, FrameClock::DEFAULT_DT_MAX);

        let same = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(same.dt, FrameClock::DEFAULT_DT_MIN);

        let normal = clock.tick_at(start + Duration::from_secs(5) + Duration::from_millis(16));
        assert_eq!(normal.dt, Duration::from_millis(16));
        assert_eq!(normal.index, 3);
    }

    #[test]
    fn reset_keeps_the_frame_index() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.reset();
        let t = clock.tick();
        assert_eq!(t.index, 1);
        assert_eq!(t.dt, FrameClock::DEFAULT_DT_MIN);
    }
}
