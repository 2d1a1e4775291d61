//! Desktop host: one winit window running one experiment.
//!
//! Window events feed the stage's input sampler. Frames are paced by winit
//! redraws: the loop's [`FrameScheduler`] is a [`WindowScheduler`] that asks
//! for a redraw, and `RedrawRequested` runs the pending frame and presents
//! the surface.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::config::AppConfig;
use crate::driver::{AnimationLoop, FrameRequest, FrameScheduler, StopHandle};
use crate::error::RunError;
use crate::gallery;
use crate::gpu::Presenter;
use crate::input::{Input, KeyCode};
use crate::sketch::Sketch;
use crate::stage::Stage;
use crate::time::Clock;

/// Schedules frames as window redraws.
///
/// winit cannot withdraw a redraw request, so a cancelled request still
/// produces one `RedrawRequested`; the loop ignores it because nothing is
/// pending any more.
pub struct WindowScheduler {
    window: Arc<Window>,
    next_id: u64,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window, next_id: 0 }
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.window.request_redraw();
        FrameRequest(self.next_id)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        log::debug!("cancelled frame request {}", request.0);
    }
}

type HostLoop = AnimationLoop<Box<dyn Sketch>, WindowScheduler>;

struct Host {
    window: Arc<Window>,
    presenter: Option<Presenter>,
    animation: HostLoop,
    stop: StopHandle<Box<dyn Sketch>, WindowScheduler>,
}

/// winit application running the configured experiment.
pub struct App {
    config: AppConfig,
    host: Option<Host>,
    error: Option<RunError>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            host: None,
            error: None,
        }
    }

    fn mount(&self, event_loop: &ActiveEventLoop) -> Result<Host, RunError> {
        let attrs = Window::default_attributes()
            .with_title(format!("{} - {}", self.config.title, self.config.experiment))
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        // A missing GPU leaves the window blank but keeps the app alive.
        let presenter = match pollster::block_on(Presenter::new(window.clone())) {
            Ok(presenter) => Some(presenter),
            Err(e) => {
                log::error!("presentation unavailable: {}", e);
                None
            }
        };

        let sketch = gallery::build(&self.config.experiment, &self.config.gallery_settings())?;
        let size = window.inner_size();
        let stage = Stage::new(size.width.max(1), size.height.max(1), sketch)?
            .with_input(Input::new().with_smoothing(self.config.smoothing))
            .with_clock(
                Clock::new()
                    .with_fixed_delta(self.config.fixed_delta)
                    .with_time_scale(self.config.time_scale),
            );

        let animation = AnimationLoop::new(stage, WindowScheduler::new(window.clone()));
        let stop = animation.start();
        Ok(Host {
            window,
            presenter,
            animation,
            stop,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }
        match self.mount(event_loop) {
            Ok(host) => self.host = Some(host),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                host.stop.stop();
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = host.presenter.as_mut() {
                    presenter.resize(size.width, size.height);
                }
                host.animation.with_stage(|stage| stage.resize(size.width, size.height));
            }
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed && !key.repeat =>
            {
                if let PhysicalKey::Code(code) = key.physical_key {
                    match KeyCode::from(code) {
                        KeyCode::Space => host.animation.with_stage(|stage| {
                            stage.clock_mut().toggle_pause();
                            log::info!("paused: {}", stage.clock().is_paused());
                        }),
                        KeyCode::Letter('r') => host.animation.with_stage(|stage| stage.reseed()),
                        KeyCode::Letter('s') => {
                            let dir = self.config.snapshot_dir.clone();
                            let saved = host.animation.with_stage(|stage| stage.snapshot(&dir));
                            if let Err(e) = saved {
                                log::warn!("snapshot failed: {}", e);
                            }
                        }
                        KeyCode::Escape => {
                            host.stop.stop();
                            event_loop.exit();
                            return;
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(request) = host.animation.pending() else {
                    return;
                };
                if !host.animation.on_frame(request) {
                    return;
                }
                let Some(presenter) = host.presenter.as_mut() else {
                    return;
                };
                match host.animation.with_stage(|stage| presenter.present(stage.surface())) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let (width, height) = presenter.size();
                        presenter.resize(width, height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory, stopping");
                        host.stop.stop();
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("present failed: {:?}", e),
                }
                return;
            }
            _ => {}
        }

        host.animation.with_stage(|stage| stage.input_mut().handle_event(&event));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(host) = self.host.take() {
            host.stop.stop();
            log::debug!("closing window {:?}", host.window.id());
        }
    }
}

/// Open a window and run `config.experiment` until it is closed.
pub fn run(config: AppConfig) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
