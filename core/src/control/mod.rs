//! Control plane: start / reset / hide
//!
//! Each operation mutates the shared timer, enqueues the UI commands it needs
//! and returns without waiting for the window to react. Operations refuse to
//! run until the timer window has been attached to the `UiLink`.


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::ControlError;
use crate::lifecycle::Shutdown;
use crate::ticker::TickDriver;
use crate::timer::SharedTimer;
use crate::ui::{UiCommand, UiDispatcher, UiLink};

/// Successful outcome of a control operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Started,
    Reset,
    Hidden,
}

impl Ack {
    /// Human-readable confirmation returned to API clients
    pub fn message(&self) -> &'static str {
        match self {
            Ack::Started => "Timer started",
            Ack::Reset => "Timer reset",
            Ack::Hidden => "Timer hidden",
        }
    }
}

pub struct Controller {
    timer: SharedTimer,
    ui: UiLink,
    shutdown: Shutdown,
    ticker: Mutex<TickDriver>,
}

impl Controller {
    pub fn new(
        timer: SharedTimer,
        ui: UiLink,
        shutdown: Shutdown,
        tick_interval: Duration,
    ) -> Self {
        Self {
            timer,
            ui,
            shutdown,
            ticker: Mutex::new(TickDriver::new(tick_interval)),
        }
    }

    pub fn timer(&self) -> &SharedTimer {
        &self.timer
    }

    fn dispatcher(&self) -> Result<Arc<dyn UiDispatcher>, ControlError> {
        self.ui.dispatcher().ok_or(ControlError::SurfaceNotReady)
    }

    // Each operation writes the timer and queues its commands as one step
    // under the timer lock. A failed dispatch leaves the state untouched.

    /// Start (or restart) the timer from zero and show it on top
    pub async fn start(&self) -> Result<Ack, ControlError> {
        let ui = self.dispatcher()?;

        self.timer.start_with(|_| {
            ui.dispatch(UiCommand::Show)?;
            ui.dispatch(UiCommand::PinTopmost)
        })?;

        // Held across the restart so concurrent starts cannot interleave stop/spawn
        let mut ticker = self.ticker.lock().await;
        ticker
            .start(self.timer.clone(), ui, self.shutdown.clone())
            .await;

        tracing::info!("Timer started");
        Ok(Ack::Started)
    }

    /// Restart the count from zero without changing visibility
    pub async fn reset(&self) -> Result<Ack, ControlError> {
        let ui = self.dispatcher()?;

        let snapshot = self
            .timer
            .reset_with(|_| ui.dispatch(UiCommand::Redraw))?;

        tracing::info!(visible = snapshot.visible, "Timer reset");
        Ok(Ack::Reset)
    }

    /// Hide the timer; the ticker keeps running but stops requesting redraws
    pub async fn hide(&self) -> Result<Ack, ControlError> {
        let ui = self.dispatcher()?;

        self.timer.hide_with(|_| ui.dispatch(UiCommand::Hide))?;

        tracing::info!("Timer hidden");
        Ok(Ack::Hidden)
    }

    /// Ask the UI thread to close the window. Falls back to raising the
    /// shutdown signal directly when no window is reachable.
    pub fn request_quit(&self) {
        let delivered = self
            .ui
            .dispatcher()
            .is_some_and(|ui| ui.dispatch(UiCommand::Quit).is_ok());
        if !delivered {
            self.shutdown.trigger();
        }
    }

    pub async fn ticker_running(&self) -> bool {
        self.ticker.lock().await.is_running()
    }

    /// Stop the tick driver and wait for it
    pub async fn stop_ticker(&self) {
        self.ticker.lock().await.stop().await;
    }
}
