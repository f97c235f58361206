use std::time::{Duration, Instant};

/// Longest step we'll feed the simulation. A stalled window (being dragged, or
/// hidden) shouldn't make the planets jump when it comes back.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Measures the time between frames. Once cancelled it reports zero forever.
pub struct FrameClock {
    last_frame: Option<Instant>,
}

impl FrameClock {
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    pub fn start_at(now: Instant) -> Self {
        FrameClock {
            last_frame: Some(now),
        }
    }

    /// Seconds since the previous call, bounded by `MAX_FRAME_DELTA`.
    pub fn delta(&mut self) -> f64 {
        self.delta_at(Instant::now())
    }

    pub fn delta_at(&mut self, now: Instant) -> f64 {
        let last = match self.last_frame {
            Some(last) => last,
            None => return 0.0,
        };
        // Instants can't go backwards, but clamp anyways rather than panic
        let elapsed = now.saturating_duration_since(last).min(MAX_FRAME_DELTA);
        self.last_frame = Some(now.max(last));
        elapsed.as_secs_f64()
    }

    /// Returns whether there was anything to cancel.
    pub fn cancel(&mut self) -> bool {
        self.last_frame.take().is_some()
    }
}

pub struct FpsCounter {
    instant: Instant,
    counter: usize,
    window_size_millis: usize,
    previous_fps: f64,
}

impl FpsCounter {
    pub fn new(window_size_millis: usize) -> Self {
        FpsCounter {
            instant: Instant::now(),
            counter: 0,
            previous_fps: 0.0,
            window_size_millis,
        }
    }

    pub fn reset(&mut self) {
        self.instant = Instant::now();
        self.counter = 0;
    }

    pub fn value(&self) -> f64 {
        self.previous_fps
    }

    pub fn increment(&mut self) {
        self.counter += 1;

        let elapsed = self.instant.elapsed();
        if elapsed.as_millis() > self.window_size_millis as u128 {
            self.previous_fps = (1000 * self.counter) as f64 / elapsed.as_millis() as f64;
            self.reset();
        }
    }
}
