//! The UI thread: owns the timer window and runs its event loop
//!
//! The window is created on the thread that runs the loop (required for
//! Win32, where an HWND is bound to its creating thread). Commands from the
//! control plane arrive on a channel and are drained between native events.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gentimer_core::{CommandSender, SharedTimer, Shutdown, UiCommand, command_channel};
use gentimer_types::AppConfig;

use crate::handler::{SurfaceAction, SurfacePolicy, handle_event};
use crate::platform::{OverlayPlatform, PlatformError};
use crate::window::TimerWindow;

/// Knobs for the UI loop
#[derive(Debug, Clone, Copy)]
pub struct UiThreadOptions {
    pub policy: SurfacePolicy,
    /// Longest time the loop blocks on the command channel before pumping
    /// native events again
    pub poll_interval: Duration,
}

impl From<&AppConfig> for UiThreadOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            policy: SurfacePolicy::from(&config.window),
            poll_interval: Duration::from_millis(config.ui_poll_ms.max(1)),
        }
    }
}

/// Spawn the UI thread, creating the window through `create`.
///
/// Blocks until the window exists. On success returns the command sender to
/// attach to the control plane, plus the thread handle. When the loop ends
/// for any reason the thread raises `shutdown`.
pub fn spawn_ui_thread<P, F>(
    create: F,
    timer: SharedTimer,
    options: UiThreadOptions,
    shutdown: Shutdown,
) -> Result<(CommandSender, JoinHandle<()>), PlatformError>
where
    P: OverlayPlatform,
    F: FnOnce() -> Result<TimerWindow<P>, PlatformError> + Send + 'static,
{
    let (tx, rx) = command_channel();
    let (confirm_tx, confirm_rx) = mpsc::channel::<Result<(), PlatformError>>();

    let handle = thread::Builder::new()
        .name("gentimer-ui".to_string())
        .spawn(move || {
            let window = match create() {
                Ok(window) => {
                    let _ = confirm_tx.send(Ok(()));
                    window
                }
                Err(e) => {
                    let _ = confirm_tx.send(Err(e));
                    return;
                }
            };

            run_event_loop(window, rx, &timer, options);
            tracing::info!("UI loop ended");
            shutdown.trigger();
        })
        .map_err(|e| PlatformError::Other(format!("Failed to spawn UI thread: {}", e)))?;

    match confirm_rx.recv() {
        Ok(Ok(())) => {
            tracing::debug!("Timer window created");
            Ok((tx, handle))
        }
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(PlatformError::Other(
                "UI thread exited before creating the window".to_string(),
            ))
        }
    }
}

fn run_event_loop<P: OverlayPlatform>(
    mut window: TimerWindow<P>,
    rx: Receiver<UiCommand>,
    timer: &SharedTimer,
    options: UiThreadOptions,
) {
    let mut events = Vec::new();
    let mut quitting = false;

    loop {
        match rx.recv_timeout(options.poll_interval) {
            Ok(command) => {
                apply_command(&mut window, command, &mut quitting);
                while let Ok(command) = rx.try_recv() {
                    apply_command(&mut window, command, &mut quitting);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("Command channel closed, leaving UI loop");
                return;
            }
        }

        window.platform_mut().poll_events(&mut events);
        for event in events.drain(..) {
            let snapshot = timer.read();
            let action = handle_event(event, &snapshot, &options.policy, Instant::now());
            match action {
                SurfaceAction::Render(text) => {
                    window.paint(&text);
                }
                SurfaceAction::Skip | SurfaceAction::Ignore => {}
                SurfaceAction::Destroy => {
                    tracing::info!("Close requested, destroying timer window");
                    quitting = true;
                    window.platform_mut().destroy();
                }
                SurfaceAction::Minimize => window.platform_mut().minimize(),
                SurfaceAction::Restore => {
                    let platform = window.platform_mut();
                    platform.restore();
                    platform.request_redraw();
                }
                SurfaceAction::Quit => return,
            }
        }
    }
}

fn apply_command<P: OverlayPlatform>(
    window: &mut TimerWindow<P>,
    command: UiCommand,
    quitting: &mut bool,
) {
    if *quitting {
        return;
    }
    let platform = window.platform_mut();
    match command {
        UiCommand::Show => {
            platform.show();
            platform.request_redraw();
        }
        UiCommand::Hide => platform.hide(),
        UiCommand::PinTopmost => platform.pin_topmost(),
        UiCommand::Redraw => platform.request_redraw(),
        UiCommand::Quit => {
            *quitting = true;
            platform.destroy();
        }
    }
}

#[cfg(test)]
mod loop_tests;
