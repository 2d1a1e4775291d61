//! Cancellable per-frame loop on top of a host's paint cadence.
//!
//! The host decides when frames happen; the loop only asks for the next one
//! through a [`FrameScheduler`] and remembers the request it is waiting on.
//! At most one request is pending at any time. Stopping cancels that request
//! exactly once and disposes the stage, so a stopped loop never draws again.
//!
//! ```ignore
//! let scheduler = ManualScheduler::new();
//! let animation = AnimationLoop::new(stage, scheduler.clone());
//! let handle = animation.start();
//! animation.pump();      // run whatever the host granted
//! handle.stop();         // cancels the pending request
//! ```

use crate::sketch::Sketch;
use crate::stage::Stage;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Opaque id of a scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// The host's "call me before the next paint" primitive.
pub trait FrameScheduler {
    /// Ask for one frame callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

struct LoopInner<S: Sketch, H: FrameScheduler> {
    stage: Stage<S>,
    scheduler: H,
    state: LoopState,
    pending: Option<FrameRequest>,
    frames: u64,
}

impl<S: Sketch, H: FrameScheduler> LoopInner<S, H> {
    fn stop(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        self.state = LoopState::Stopped;
        self.stage.dispose();
        log::info!("loop stopped after {} frames", self.frames);
        true
    }
}

/// A stage driven by a frame scheduler.
///
/// Cloning shares the same loop.
pub struct AnimationLoop<S: Sketch, H: FrameScheduler> {
    inner: Rc<RefCell<LoopInner<S, H>>>,
}

impl<S: Sketch, H: FrameScheduler> Clone for AnimationLoop<S, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Sketch, H: FrameScheduler> AnimationLoop<S, H> {
    pub fn new(stage: Stage<S>, scheduler: H) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoopInner {
                stage,
                scheduler,
                state: LoopState::Stopped,
                pending: None,
                frames: 0,
            })),
        }
    }

    /// Schedule the first frame and return the handle that stops the loop.
    ///
    /// Starting a running loop only hands out another handle. A stage that
    /// was already disposed cannot be started again.
    pub fn start(&self) -> StopHandle<S, H> {
        let handle = StopHandle {
            inner: Rc::downgrade(&self.inner),
        };
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            LoopState::Running => {}
            LoopState::Stopped if inner.stage.is_disposed() => {
                log::warn!("cannot restart a loop whose stage was disposed");
            }
            LoopState::Stopped => {
                inner.state = LoopState::Running;
                let request = inner.scheduler.request_frame();
                inner.pending = Some(request);
                log::info!("loop started for '{}'", inner.stage.sketch().name());
            }
        }
        handle
    }

    /// Host callback for `request`.
    ///
    /// Runs one frame and schedules the next, but only for the pending
    /// request of a running loop. Stale or cancelled requests return `false`.
    pub fn on_frame(&self, request: FrameRequest) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.state != LoopState::Running || inner.pending != Some(request) {
            return false;
        }
        inner.pending = None;
        inner.stage.frame();
        inner.frames += 1;
        let next = inner.scheduler.request_frame();
        inner.pending = Some(next);
        true
    }

    /// Stop from the loop side. Same as [`StopHandle::stop`].
    pub fn stop(&self) -> bool {
        self.inner.borrow_mut().stop()
    }

    pub fn state(&self) -> LoopState {
        self.inner.borrow().state
    }

    /// The request the loop is waiting on, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.inner.borrow().pending
    }

    /// Frames run since the loop was created.
    pub fn frames(&self) -> u64 {
        self.inner.borrow().frames
    }

    /// Borrow the stage, e.g. to forward input or resize.
    pub fn with_stage<R>(&self, f: impl FnOnce(&mut Stage<S>) -> R) -> R {
        f(&mut self.inner.borrow_mut().stage)
    }
}

impl<S: Sketch> AnimationLoop<S, ManualScheduler> {
    /// Fire every request the manual host is holding. Returns the number of
    /// frames that ran.
    pub fn pump(&self) -> usize {
        let requests = self.inner.borrow().scheduler.take_pending();
        requests.into_iter().filter(|&request| self.on_frame(request)).count()
    }
}

/// Stops a loop. Dropping the handle leaves the loop running.
pub struct StopHandle<S: Sketch, H: FrameScheduler> {
    inner: Weak<RefCell<LoopInner<S, H>>>,
}

impl<S: Sketch, H: FrameScheduler> StopHandle<S, H> {
    /// Cancel the pending frame, move to [`LoopState::Stopped`] and dispose
    /// the stage. Returns `false` if the loop was already stopped or gone.
    pub fn stop(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.borrow_mut().stop(),
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct ManualQueue {
    next_id: u64,
    pending: Vec<FrameRequest>,
    requests: u64,
    cancels: u64,
}

/// Host with an explicit queue, for headless runs, benches and tests.
///
/// Clones share the queue, so keep one to inspect what the loop asked for.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Total requests ever made.
    pub fn requests(&self) -> u64 {
        self.queue.borrow().requests
    }

    /// Total cancellations ever made.
    pub fn cancels(&self) -> u64 {
        self.queue.borrow().cancels
    }

    /// Hand out the pending requests, as the host firing them.
    pub fn take_pending(&self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.queue.borrow_mut().pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        queue.requests += 1;
        let request = FrameRequest(queue.next_id);
        queue.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut queue = self.queue.borrow_mut();
        queue.pending.retain(|&r| r != request);
        queue.cancels += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Point2D;
    use crate::sketch::ParticleSketch;
    use glam::Vec2;

    fn dots() -> Stage<ParticleSketch<Point2D>> {
        let sketch = ParticleSketch::new("dots", 10, |ctx| {
            Point2D::new(ctx.random_in_bounds(), Vec2::ZERO)
        });
        Stage::new(16, 16, sketch).unwrap()
    }

    #[test]
    fn test_start_requests_one_frame() {
        let scheduler = ManualScheduler::new();
        let animation = AnimationLoop::new(dots(), scheduler.clone());
        let _handle = animation.start();
        let _again = animation.start();
        assert_eq!(animation.state(), LoopState::Running);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.requests(), 1);
    }

    #[test]
    fn test_frames_reschedule_themselves() {
        let scheduler = ManualScheduler::new();
        let animation = AnimationLoop::new(dots(), scheduler.clone());
        let _handle = animation.start();
        for _ in 0..5 {
            assert_eq!(animation.pump(), 1);
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(animation.frames(), 5);
    }

    #[test]
    fn test_stale_request_is_ignored() {
        let scheduler = ManualScheduler::new();
        let animation = AnimationLoop::new(dots(), scheduler.clone());
        let _handle = animation.start();
        let first = scheduler.take_pending()[0];
        assert!(animation.on_frame(first));
        assert!(!animation.on_frame(first));
        assert_eq!(animation.frames(), 1);
    }

    #[test]
    fn test_stop_cancels_once_and_disposes() {
        let scheduler = ManualScheduler::new();
        let animation = AnimationLoop::new(dots(), scheduler.clone());
        let handle = animation.start();
        animation.pump();

        assert!(handle.stop());
        assert!(!handle.stop());
        assert!(!animation.stop());
        assert_eq!(scheduler.cancels(), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(animation.state(), LoopState::Stopped);
        assert!(animation.with_stage(|stage| stage.is_disposed()));
    }

    #[test]
    fn test_dropped_handle_keeps_running() {
        let scheduler = ManualScheduler::new();
        let animation = AnimationLoop::new(dots(), scheduler.clone());
        drop(animation.start());
        assert_eq!(animation.pump(), 1);
        assert_eq!(animation.state(), LoopState::Running);
    }

    #[test]
    fn test_no_restart_after_dispose() {
        let scheduler = ManualScheduler::new();
        let animation = AnimationLoop::new(dots(), scheduler.clone());
        animation.start().stop();
        let _handle = animation.start();
        assert_eq!(animation.state(), LoopState::Stopped);
        assert_eq!(scheduler.pending(), 0);
    }
}
