//! One running experiment and everything it owns.
//!
//! A [`Stage`] bundles the surface, input sampler, clock and sketch of a
//! single mounted experiment. Nothing is shared between stages, so several
//! can run side by side (tests do this freely).
//!
//! Lifecycle: [`Stage::new`] seeds the sketch, [`Stage::frame`] runs once per
//! paint, [`Stage::dispose`] tears it down.

use crate::error::SurfaceError;
use crate::input::Input;
use crate::sketch::{FrameContext, Sketch};
use crate::surface::Surface;
use crate::time::{Clock, FrameTime};
use std::path::{Path, PathBuf};

/// Per-instance state of a mounted experiment.
pub struct Stage<S: Sketch> {
    surface: Surface,
    input: Input,
    clock: Clock,
    sketch: S,
    disposed: bool,
}

impl<S: Sketch> Stage<S> {
    /// Allocate a `width` x `height` surface and seed `sketch` for it.
    pub fn new(width: u32, height: u32, mut sketch: S) -> Result<Self, SurfaceError> {
        let surface = Surface::new(width, height)?;
        let mut input = Input::new();
        input.set_window_size(width, height);
        sketch.seed(surface.bounds());
        log::info!("mounted '{}' at {}x{}", sketch.name(), width, height);
        Ok(Self {
            surface,
            input,
            clock: Clock::new(),
            sketch,
            disposed: false,
        })
    }

    /// Replace the input sampler, e.g. to change pointer smoothing.
    pub fn with_input(mut self, mut input: Input) -> Self {
        input.set_window_size(self.surface.width(), self.surface.height());
        self.input = input;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run one frame: tick, sample input, update, render, clear edges.
    ///
    /// While the clock is paused nothing else happens: the last frame stays
    /// on the surface, the smoothed pointer holds still and clicks or key
    /// presses are kept for the first frame after resuming.
    pub fn frame(&mut self) -> FrameTime {
        if self.disposed {
            return self.clock.now();
        }
        let time = self.clock.tick();
        if self.clock.is_paused() {
            return time;
        }
        self.input.sample_frame();
        let ctx = FrameContext::new(&self.input, time, self.surface.bounds());
        self.sketch.update(&ctx);
        self.sketch.render(&mut self.surface, &ctx);
        self.input.end_frame();
        time
    }

    /// Follow a viewport resize. The sketch is re-seeded only when the size
    /// actually changed; zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.surface.resize(width, height) {
            return false;
        }
        self.input.set_window_size(width, height);
        self.sketch.resize(self.surface.bounds());
        true
    }

    /// Throw the current state away and seed again at the current size.
    pub fn reseed(&mut self) {
        self.sketch.seed(self.surface.bounds());
        log::info!("re-seeded '{}'", self.sketch.name());
    }

    /// Save the current frame as `<dir>/<name>-<tick>.png`.
    pub fn snapshot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, SurfaceError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}-{:06}.png", self.sketch.name(), self.clock.now().tick));
        self.surface.save_png(&path)?;
        Ok(path)
    }

    /// Release the sketch. Later frames do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.sketch.dispose();
        self.input.reset();
        self.disposed = true;
        log::info!("disposed '{}'", self.sketch.name());
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Host events go here.
    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    pub fn sketch_mut(&mut self) -> &mut S {
        &mut self.sketch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use glam::{Vec2, Vec3};

    /// Counts calls and paints the whole surface white.
    #[derive(Default)]
    struct Probe {
        seeds: Vec<Vec2>,
        updates: usize,
        renders: usize,
        clicks: usize,
        disposed: bool,
    }

    impl Sketch for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn seed(&mut self, bounds: Vec2) {
            self.seeds.push(bounds);
        }

        fn update(&mut self, ctx: &FrameContext) {
            self.updates += 1;
            if ctx.input.mouse_pressed(MouseButton::Left) {
                self.clicks += 1;
            }
        }

        fn render(&mut self, surface: &mut Surface, _ctx: &FrameContext) {
            self.renders += 1;
            surface.clear(Vec3::ONE);
        }

        fn dispose(&mut self) {
            self.disposed = true;
        }
    }

    #[test]
    fn test_new_seeds_once() {
        let stage = Stage::new(32, 16, Probe::default()).unwrap();
        assert_eq!(stage.sketch().seeds, vec![Vec2::new(32.0, 16.0)]);
    }

    #[test]
    fn test_zero_sized_mount_fails() {
        assert!(Stage::new(0, 16, Probe::default()).is_err());
    }

    #[test]
    fn test_frame_updates_then_renders() {
        let mut stage = Stage::new(8, 8, Probe::default()).unwrap();
        let time = stage.frame();
        assert_eq!(time.tick, 1);
        assert_eq!(stage.sketch().updates, 1);
        assert_eq!(stage.sketch().renders, 1);
        assert_eq!(stage.surface().pixel(3, 3).map(|p| p.g), Some(255));
    }

    #[test]
    fn test_resize_reseeds_only_on_change() {
        let mut stage = Stage::new(8, 8, Probe::default()).unwrap();
        assert!(!stage.resize(8, 8));
        assert!(!stage.resize(0, 20));
        assert!(stage.resize(20, 10));
        assert_eq!(stage.sketch().seeds.len(), 2);
        assert_eq!(stage.surface().bounds(), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_pause_freezes_frame() {
        let mut stage = Stage::new(8, 8, Probe::default()).unwrap();
        stage.frame();
        stage.clock_mut().pause();
        stage.frame();
        stage.frame();
        assert_eq!(stage.sketch().updates, 1);
        stage.clock_mut().resume();
        stage.frame();
        assert_eq!(stage.sketch().updates, 2);
    }

    #[test]
    fn test_input_held_while_paused() {
        let mut stage = Stage::new(100, 100, Probe::default()).unwrap();
        stage.input_mut().pointer_moved(Vec2::new(10.0, 10.0));
        stage.frame();
        stage.clock_mut().pause();

        stage.input_mut().pointer_moved(Vec2::new(90.0, 10.0));
        stage.input_mut().button_pressed(MouseButton::Left);
        stage.frame();
        stage.frame();
        assert_eq!(stage.input().smoothed_pointer(), Vec2::new(10.0, 10.0));
        assert!(stage.input().mouse_pressed(MouseButton::Left));

        stage.clock_mut().resume();
        stage.frame();
        assert_eq!(stage.sketch().clicks, 1);
        assert!(stage.input().smoothed_pointer().x > 10.0);
        assert!(!stage.input().mouse_pressed(MouseButton::Left));
    }

    #[test]
    fn test_dispose_is_final() {
        let mut stage = Stage::new(8, 8, Probe::default()).unwrap();
        stage.dispose();
        stage.dispose();
        stage.frame();
        assert!(stage.is_disposed());
        assert!(stage.sketch().disposed);
        assert_eq!(stage.sketch().updates, 0);
    }

    #[test]
    fn test_snapshot_writes_png() {
        let mut stage = Stage::new(8, 8, Probe::default()).unwrap();
        stage.frame();
        let dir = std::env::temp_dir().join(format!("sketchbook-test-{}", std::process::id()));
        let path = stage.snapshot(&dir).unwrap();
        assert!(path.ends_with("probe-000001.png"));
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
