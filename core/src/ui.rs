//! Commands from worker threads to the UI thread
//!
//! Only the UI thread touches the native window. Everyone else sends a
//! `UiCommand` and returns immediately; the UI thread drains the channel
//! between native events.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, OnceLock};

use crate::error::DispatchError;

/// Requests the UI thread performs on the timer window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Make the window visible (followed by a repaint)
    Show,
    /// Hide the window
    Hide,
    /// Raise the window and keep it above other windows
    PinTopmost,
    /// Invalidate the client area so a paint event follows
    Redraw,
    /// Destroy the window, ending the UI loop
    Quit,
}

/// Fire-and-forget delivery of commands to the UI thread
pub trait UiDispatcher: Send + Sync {
    fn dispatch(&self, command: UiCommand) -> Result<(), DispatchError>;
}

/// Channel-backed dispatcher handed out by [`command_channel`]
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<UiCommand>,
}

impl UiDispatcher for CommandSender {
    fn dispatch(&self, command: UiCommand) -> Result<(), DispatchError> {
        self.tx
            .send(command)
            .map_err(|_| DispatchError::Disconnected)
    }
}

/// Create the command channel. The receiver belongs to the UI thread.
pub fn command_channel() -> (CommandSender, Receiver<UiCommand>) {
    let (tx, rx) = mpsc::channel();
    (CommandSender { tx }, rx)
}

// ─────────────────────────────────────────────────────────────────────────────
// UI Link (readiness gate)
// ─────────────────────────────────────────────────────────────────────────────

/// Shared slot holding the dispatcher for the single timer window.
///
/// Empty until the window has been created; filled exactly once.
#[derive(Clone, Default)]
pub struct UiLink {
    slot: Arc<OnceLock<Arc<dyn UiDispatcher>>>,
}

impl fmt::Debug for UiLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiLink")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl UiLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the window's dispatcher. Returns `false` if one was already attached.
    pub fn attach(&self, dispatcher: Arc<dyn UiDispatcher>) -> bool {
        let attached = self.slot.set(dispatcher).is_ok();
        if attached {
            tracing::debug!("UI surface attached");
        } else {
            tracing::warn!("UI surface already attached, ignoring second attach");
        }
        attached
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn dispatcher(&self) -> Option<Arc<dyn UiDispatcher>> {
        self.slot.get().cloned()
    }
}
