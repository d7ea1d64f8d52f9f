//! gentimer window side
//!
//! Everything that runs on the UI thread.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   event_loop                        │
//! │     UI thread: commands in, native events out       │
//! ├─────────────────────────────────────────────────────┤
//! │                    handler                          │
//! │        event + timer snapshot -> action             │
//! ├─────────────────────────────────────────────────────┤
//! │                    window                           │
//! │          TimerWindow (surface + renderer)           │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                         │
//! │            tiny-skia + cosmic-text                  │
//! ├─────────────────────────────────────────────────────┤
//! │                    platform/                        │
//! │                 x11, windows                        │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod event_loop;
pub mod handler;
pub mod platform;
pub mod renderer;
pub mod utils;
pub mod window;

pub use event_loop::{UiThreadOptions, spawn_ui_thread};
pub use handler::{SurfaceAction, SurfacePolicy, handle_event};
pub use platform::{NativeOverlay, OverlayConfig, OverlayPlatform, PlatformError, SurfaceEvent};
pub use renderer::Renderer;
pub use window::{TextStyle, TimerWindow};
