//! Test doubles shared by the core test modules

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::DispatchError;
use crate::ui::{UiCommand, UiDispatcher};

/// Dispatcher that records every command instead of delivering it
#[derive(Default)]
pub struct RecordingDispatcher {
    commands: Mutex<Vec<UiCommand>>,
    disconnected: AtomicBool,
}

impl RecordingDispatcher {
    pub fn commands(&self) -> Vec<UiCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, command: UiCommand) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == command)
            .count()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    /// Make every later dispatch fail as if the UI thread had exited
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

impl UiDispatcher for RecordingDispatcher {
    fn dispatch(&self, command: UiCommand) -> Result<(), DispatchError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(DispatchError::Disconnected);
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

/// Dispatcher that parks the first `gated` command until released, so a test
/// can run another operation while one is mid-dispatch
pub struct GatedDispatcher {
    inner: RecordingDispatcher,
    gated: UiCommand,
    entered: Mutex<Option<Sender<()>>>,
    release: Mutex<Receiver<()>>,
}

/// Test-side ends of a [`GatedDispatcher`]
pub struct Gate {
    /// Receives once the gated command is being dispatched
    pub entered: Receiver<()>,
    /// Send to let the gated command through
    pub release: Sender<()>,
}

impl GatedDispatcher {
    pub fn new(gated: UiCommand) -> (Self, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let dispatcher = Self {
            inner: RecordingDispatcher::default(),
            gated,
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(release_rx),
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (dispatcher, gate)
    }

    pub fn commands(&self) -> Vec<UiCommand> {
        self.inner.commands()
    }
}

impl UiDispatcher for GatedDispatcher {
    fn dispatch(&self, command: UiCommand) -> Result<(), DispatchError> {
        if command == self.gated {
            let entered = self.entered.lock().unwrap().take();
            if let Some(entered) = entered {
                entered.send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
            }
        }
        self.inner.dispatch(command)
    }
}
