//! gentimer core
//!
//! Everything that coordinates the timer across threads, independent of any
//! window system:
//!
//! - [`timer`]: mutex-guarded start instant + visibility
//! - [`ticker`]: the 1 Hz redraw driver
//! - [`lifecycle`]: one-shot shutdown broadcast
//! - [`ui`]: fire-and-forget commands to the UI thread and the readiness gate
//! - [`control`]: start / reset / hide

pub mod config;
pub mod control;
pub mod error;
pub mod lifecycle;
pub mod ticker;
pub mod timer;
pub mod ui;

#[cfg(test)]
mod testing;

pub use config::AppConfigExt;
pub use control::{Ack, Controller};
pub use error::{ConfigError, ControlError, DispatchError};
pub use lifecycle::Shutdown;
pub use ticker::{DEFAULT_TICK_INTERVAL, TickDriver};
pub use timer::{SharedTimer, TimerSnapshot, format_elapsed};
pub use ui::{CommandSender, UiCommand, UiDispatcher, UiLink, command_channel};
