//! Platform abstraction for the timer window
//!
//! This module defines the trait that all platform backends must implement,
//! allowing the event loop and rendering code to be platform-agnostic.
//! Backends translate native window messages into [`SurfaceEvent`]s and
//! leave every policy decision to the handler.

use gentimer_types::WindowConfig;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
compile_error!("gentimer supports X11 and Windows only");

/// Native events the timer reacts to. Everything else is handled by the
/// backend's default processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The client area needs repainting
    Paint,
    /// The user asked to close the window
    CloseRequested,
    /// The user asked to minimize the window
    MinimizeRequested,
    /// The window is gone
    Destroyed,
}

/// Configuration for creating the timer window
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Initial X position; `None` lets the platform decide
    pub x: Option<i32>,
    /// Initial Y position; `None` lets the platform decide
    pub y: Option<i32>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
    /// Window class name (Win32 class / X11 WM_CLASS)
    pub class_name: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            width: 300,
            height: 150,
            title: "Generator Timer".to_string(),
            class_name: "GeneratorTimerClass".to_string(),
        }
    }
}

impl From<&WindowConfig> for OverlayConfig {
    fn from(window: &WindowConfig) -> Self {
        Self {
            x: window.x,
            y: window.y,
            width: window.width,
            height: window.height,
            title: window.title.clone(),
            ..Default::default()
        }
    }
}

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to connect to display server
    ConnectionFailed(String),
    /// Required protocol/feature not available
    UnsupportedFeature(String),
    /// Buffer/memory allocation failed
    BufferError(String),
    /// Window class could not be registered
    ClassRegistration(String),
    /// Native window could not be created
    WindowCreation(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ConnectionFailed(s) => write!(f, "Connection failed: {}", s),
            PlatformError::UnsupportedFeature(s) => write!(f, "Unsupported feature: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::ClassRegistration(s) => {
                write!(f, "Window class registration failed: {}", s)
            }
            PlatformError::WindowCreation(s) => write!(f, "Window creation failed: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait that all platform backends must implement.
///
/// All methods are called from the thread that created the window.
pub trait OverlayPlatform: Sized {
    /// Create the window, initially hidden
    fn new(config: OverlayConfig) -> Result<Self, PlatformError>;

    /// Current client area width
    fn width(&self) -> u32;

    /// Current client area height
    fn height(&self) -> u32;

    fn show(&mut self);

    fn hide(&mut self);

    /// Raise the window and keep it above other windows
    fn pin_topmost(&mut self);

    fn minimize(&mut self);

    /// Undo a minimize (no-op if the window is not minimized)
    fn restore(&mut self);

    /// Invalidate the client area; a [`SurfaceEvent::Paint`] follows
    fn request_redraw(&mut self);

    /// Destroy the window; a [`SurfaceEvent::Destroyed`] follows
    fn destroy(&mut self);

    /// Get mutable access to the pixel buffer (RGBA format)
    /// Returns None if buffer is not ready
    fn pixel_buffer(&mut self) -> Option<&mut [u8]>;

    /// Commit the current pixel buffer to the screen
    fn commit(&mut self);

    /// Process pending native events without blocking, appending the ones
    /// the timer cares about to `events`
    fn poll_events(&mut self, events: &mut Vec<SurfaceEvent>);
}

/// Re-export the appropriate platform for the current target
#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::X11Overlay as NativeOverlay;

#[cfg(target_os = "windows")]
pub use windows::WindowsOverlay as NativeOverlay;
