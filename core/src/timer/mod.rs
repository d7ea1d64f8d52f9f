//! Shared timer state
//!
//! A single start instant plus a visibility flag, written by the control plane
//! and read by the paint path and the redraw ticker. Every access goes through
//! one mutex so readers always see a pair written by a single call.

mod format;

pub use format::format_elapsed;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A consistent copy of the timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerSnapshot {
    /// When the timer was last started or reset
    pub started_at: Option<Instant>,
    pub visible: bool,
}

impl TimerSnapshot {
    /// Elapsed time at `now`, if the timer has been started
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.started_at
            .map(|started| now.saturating_duration_since(started))
    }

    /// Text to render at `now`. `None` means nothing should be drawn.
    pub fn elapsed_text(&self, now: Instant) -> Option<String> {
        if !self.visible {
            return None;
        }
        self.elapsed(now).map(format_elapsed)
    }
}

/// Process-wide timer state, cheap to clone and share across threads
#[derive(Debug, Clone, Default)]
pub struct SharedTimer {
    inner: Arc<Mutex<TimerSnapshot>>,
}

impl SharedTimer {
    /// Create a hidden, never-started timer
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TimerSnapshot> {
        // The guarded value is plain data and valid after any panic
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Change the state and publish the result as one step.
    ///
    /// `change` runs on a copy; `publish` (typically queueing UI commands)
    /// sees the new state. Both run under the lock, so every other writer and
    /// reader observes the write and its commands in the same order. The copy
    /// is stored only if `publish` succeeds.
    pub fn apply_with<E>(
        &self,
        change: impl FnOnce(&mut TimerSnapshot),
        publish: impl FnOnce(&TimerSnapshot) -> Result<(), E>,
    ) -> Result<TimerSnapshot, E> {
        let mut state = self.lock();
        let mut next = *state;
        change(&mut next);
        publish(&next)?;
        *state = next;
        Ok(next)
    }

    /// Record the current instant as the start and make the timer visible
    pub fn start_with<E>(
        &self,
        publish: impl FnOnce(&TimerSnapshot) -> Result<(), E>,
    ) -> Result<TimerSnapshot, E> {
        self.apply_with(
            |state| {
                state.started_at = Some(Instant::now());
                state.visible = true;
            },
            publish,
        )
    }

    /// Record the current instant as the start, leaving visibility alone
    pub fn reset_with<E>(
        &self,
        publish: impl FnOnce(&TimerSnapshot) -> Result<(), E>,
    ) -> Result<TimerSnapshot, E> {
        self.apply_with(|state| state.started_at = Some(Instant::now()), publish)
    }

    /// Hide without touching the start instant
    pub fn hide_with<E>(
        &self,
        publish: impl FnOnce(&TimerSnapshot) -> Result<(), E>,
    ) -> Result<TimerSnapshot, E> {
        self.apply_with(|state| state.visible = false, publish)
    }

    pub fn read(&self) -> TimerSnapshot {
        *self.lock()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }
}
