//! Frame clock.
//!
//! Forces in this crate are expressed per tick, so the tick counter drives
//! the simulation; seconds are carried along for time-based effects (hue
//! cycling, pulsing) and for the FPS readout.
//!
//! ```ignore
//! let mut clock = Clock::new().with_fixed_delta(Some(1.0 / 60.0));
//! let time = clock.tick();
//! println!("tick {} at {:.2}s", time.tick, time.elapsed);
//! ```

use std::time::{Duration, Instant};

/// Timing of one frame, as seen by the sketch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Frames simulated so far, starting at 1 for the first frame.
    pub tick: u64,
    /// Scaled seconds since the clock started, excluding pauses.
    pub elapsed: f32,
    /// Scaled seconds since the previous frame.
    pub delta: f32,
}

/// Tick counter with pause, time scale and optional fixed step.
#[derive(Debug)]
pub struct Clock {
    last_frame: Instant,
    current: FrameTime,
    paused: bool,
    /// Fixed delta time for deterministic runs.
    fixed_delta: Option<f32>,
    /// 1.0 = normal speed.
    time_scale: f32,
    fps: f32,
    fps_frames: u64,
    fps_since: Instant,
    fps_interval: Duration,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            current: FrameTime::default(),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
            fps: 0.0,
            fps_frames: 0,
            fps_since: now,
            fps_interval: Duration::from_millis(500),
        }
    }

    pub fn with_fixed_delta(mut self, delta: Option<f32>) -> Self {
        self.set_fixed_delta(delta);
        self
    }

    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.set_time_scale(scale);
        self
    }

    /// Advance one frame. While paused the returned time does not move.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        if self.paused {
            self.current.delta = 0.0;
            return self.current;
        }

        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let delta = self.fixed_delta.unwrap_or(raw) * self.time_scale;

        self.current.tick += 1;
        self.current.delta = delta;
        self.current.elapsed += delta;

        self.fps_frames += 1;
        let window = now.duration_since(self.fps_since);
        if window >= self.fps_interval {
            self.fps = self.fps_frames as f32 / window.as_secs_f32();
            self.fps_frames = 0;
            self.fps_since = now;
        }

        self.current
    }

    /// The most recent frame time.
    #[inline]
    pub fn now(&self) -> FrameTime {
        self.current
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            // the paused interval must not show up as one huge delta
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.filter(|d| *d > 0.0);
    }

    /// Negative scales clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Back to tick 0, keeping pause state and settings.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.current = FrameTime::default();
        self.fps = 0.0;
        self.fps_frames = 0;
        self.fps_since = now;
    }
}
