//! Error types for sketchbook.
//!
//! Failures are rare and local: a surface that cannot be allocated, a GPU
//! that cannot present, a config file that does not parse. None of them are
//! retried; callers log and carry on with a blank frame where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the raster surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// A surface cannot have a zero dimension.
    #[error("surface dimensions must be non-zero, got {width}x{height}")]
    ZeroSized {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Encoding or writing a snapshot failed.
    #[error("failed to write snapshot: {0}")]
    Snapshot(#[from] image::ImageError),
    /// The snapshot directory could not be created.
    #[error("failed to prepare snapshot directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while setting up GPU presentation.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for the window.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    /// Failed to create the GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The config file is not valid JSON for [`AppConfig`](crate::config::AppConfig).
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The requested experiment is not in the gallery.
    #[error("unknown experiment '{0}' (use --list to see the gallery)")]
    UnknownExperiment(String),
    /// A value is out of its accepted range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors that can occur when running the desktop host.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create the event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU presentation could not be initialised.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The initial surface could not be created.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
