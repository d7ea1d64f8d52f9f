//! Periodic redraw driver
//!
//! While running, asks the UI thread to repaint once per period if the timer
//! is visible. At most one tick task exists per driver: `start` stops and
//! joins the previous task before spawning a new one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lifecycle::Shutdown;
use crate::timer::SharedTimer;
use crate::ui::{UiCommand, UiDispatcher};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the running tick task
struct TickerHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
    generation: u64,
}

pub struct TickDriver {
    period: Duration,
    active: Option<TickerHandle>,
    generation: u64,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            active: None,
            generation: 0,
        }
    }

    /// Whether a tick task is alive (it may have exited on its own after shutdown)
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Stop any running task, then spawn a fresh one
    pub async fn start(
        &mut self,
        timer: SharedTimer,
        ui: Arc<dyn UiDispatcher>,
        shutdown: Shutdown,
    ) {
        self.stop().await;

        self.generation += 1;
        let generation = self.generation;
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_ticker(
            self.period,
            generation,
            timer,
            ui,
            shutdown,
            stop_rx,
        ));

        tracing::debug!(
            generation,
            period_ms = self.period.as_millis() as u64,
            "Tick driver started"
        );
        self.active = Some(TickerHandle {
            stop_tx,
            task,
            generation,
        });
    }

    /// Stop the running task and wait for it to finish
    pub async fn stop(&mut self) {
        let Some(handle) = self.active.take() else {
            return;
        };

        // The task may already have exited (shutdown); a failed send is fine
        let _ = handle.stop_tx.send(());
        if let Err(e) = handle.task.await {
            tracing::warn!(
                generation = handle.generation,
                error = %e,
                "Tick task ended abnormally"
            );
        } else {
            tracing::debug!(generation = handle.generation, "Tick driver stopped");
        }
    }
}

async fn run_ticker(
    period: Duration,
    generation: u64,
    timer: SharedTimer,
    ui: Arc<dyn UiDispatcher>,
    shutdown: Shutdown,
    mut stop_rx: oneshot::Receiver<()>,
) {
    // First tick one full period after start
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let stopped = shutdown.wait();
    tokio::pin!(stopped);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = &mut stopped => {
                tracing::debug!(generation, "Tick driver exiting on shutdown");
                break;
            }
            _ = interval.tick() => {
                if !timer.is_visible() {
                    continue;
                }
                if ui.dispatch(UiCommand::Redraw).is_err() {
                    tracing::debug!(generation, "UI gone, tick driver exiting");
                    break;
                }
            }
        }
    }
}
