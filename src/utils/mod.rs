use std::time::{Duration, Instant};

/// Convert a user-supplied number of seconds into a [`Duration`]. Negative, NaN, infinite and
/// out-of-range values are rejected.
pub fn interval_from_secs(secs: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("Invalid interval of {} seconds: {}", secs, e).into())
}

/// Counts frames and reports the average rate once per `interval`.
pub struct FpsMeter {
    interval: Duration,
    window_start: Instant,
    frames: u32,
}

impl FpsMeter {
    /// A zero `interval` disables reporting.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            window_start: start,
            frames: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    /// Count one frame at `now`. Returns the frames per second over the elapsed window once the
    /// window is at least `interval` long, and starts a new window.
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        if self.interval.is_zero() {
            return None;
        }
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }
        let fps = self.frames as f64 / elapsed.as_secs_f64();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}
