//! Tests for the UI thread using an in-memory platform

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use gentimer_core::{CommandSender, SharedTimer, Shutdown, UiCommand, UiDispatcher};
use gentimer_types::{CloseBehavior, MinimizeBehavior, WindowConfig};

use super::{UiThreadOptions, spawn_ui_thread};
use crate::handler::SurfacePolicy;
use crate::platform::{OverlayConfig, OverlayPlatform, PlatformError, SurfaceEvent};
use crate::renderer::Renderer;
use crate::window::TimerWindow;

#[derive(Default)]
struct FakeState {
    calls: Vec<&'static str>,
    pending: Vec<SurfaceEvent>,
    shown: bool,
    no_buffer: bool,
}

#[derive(Clone, Default)]
struct FakeHandle(Arc<Mutex<FakeState>>);

impl FakeHandle {
    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().calls.clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn inject(&self, event: SurfaceEvent) {
        self.0.lock().unwrap().pending.push(event);
    }

    fn is_shown(&self) -> bool {
        self.0.lock().unwrap().shown
    }

    fn withhold_buffer(&self, withheld: bool) {
        self.0.lock().unwrap().no_buffer = withheld;
    }
}

struct FakePlatform {
    state: FakeHandle,
    pixels: Vec<u8>,
}

impl FakePlatform {
    fn record(&self, call: &'static str) {
        self.state.0.lock().unwrap().calls.push(call);
    }
}

impl OverlayPlatform for FakePlatform {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            state: FakeHandle::default(),
            pixels: vec![0; (config.width * config.height * 4) as usize],
        })
    }

    fn width(&self) -> u32 {
        30
    }

    fn height(&self) -> u32 {
        10
    }

    fn show(&mut self) {
        self.record("show");
        self.state.0.lock().unwrap().shown = true;
    }

    fn hide(&mut self) {
        self.record("hide");
        self.state.0.lock().unwrap().shown = false;
    }

    fn pin_topmost(&mut self) {
        self.record("pin");
    }

    fn minimize(&mut self) {
        self.record("minimize");
    }

    fn restore(&mut self) {
        self.record("restore");
    }

    fn request_redraw(&mut self) {
        self.record("redraw");
    }

    fn destroy(&mut self) {
        self.record("destroy");
        self.state.0.lock().unwrap().pending.push(SurfaceEvent::Destroyed);
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        self.record("buffer");
        if self.state.0.lock().unwrap().no_buffer {
            return None;
        }
        Some(&mut self.pixels)
    }

    fn commit(&mut self) {
        self.record("commit");
    }

    fn poll_events(&mut self, events: &mut Vec<SurfaceEvent>) {
        events.append(&mut self.state.0.lock().unwrap().pending);
    }
}

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(5));
    }
}

struct Harness {
    tx: CommandSender,
    handle: JoinHandle<()>,
    fake: FakeHandle,
    shutdown: Shutdown,
    timer: SharedTimer,
}

fn spawn_with(policy: SurfacePolicy) -> Harness {
    let fake = FakeHandle::default();
    let shutdown = Shutdown::new();
    let timer = SharedTimer::new();
    let options = UiThreadOptions {
        policy,
        poll_interval: Duration::from_millis(2),
    };

    let thread_fake = fake.clone();
    let (tx, handle) = spawn_ui_thread(
        move || {
            let config = WindowConfig {
                width: 30,
                height: 10,
                ..Default::default()
            };
            let mut platform = FakePlatform::new(OverlayConfig::from(&config))?;
            platform.state = thread_fake;
            Ok(TimerWindow::with_platform(platform, &config))
        },
        timer.clone(),
        options,
        shutdown.clone(),
    )
    .unwrap();

    Harness {
        tx,
        handle,
        fake,
        shutdown,
        timer,
    }
}

/// Whether this machine can shape the timer text at all
fn fonts_available() -> bool {
    let config = WindowConfig::default();
    Renderer::new(config.font_family)
        .measure_text("00:00:00", config.font_size)
        .0
        > 0.0
}

#[test]
fn test_commands_reach_platform() {
    let h = spawn_with(SurfacePolicy::default());

    h.tx.dispatch(UiCommand::Show).unwrap();
    h.tx.dispatch(UiCommand::PinTopmost).unwrap();
    wait_until("pin", || h.fake.count("pin") == 1);
    assert_eq!(&h.fake.calls()[..3], &["show", "redraw", "pin"]);
    assert!(h.fake.is_shown());

    h.tx.dispatch(UiCommand::Hide).unwrap();
    wait_until("hide", || !h.fake.is_shown());

    h.tx.dispatch(UiCommand::Redraw).unwrap();
    wait_until("redraw", || h.fake.count("redraw") == 2);

    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();
}

#[test]
fn test_quit_destroys_window_and_raises_shutdown() {
    let h = spawn_with(SurfacePolicy::default());

    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();

    assert_eq!(h.fake.count("destroy"), 1);
    assert!(h.shutdown.is_triggered());
    assert!(h.tx.dispatch(UiCommand::Redraw).is_err());
}

#[test]
fn test_close_allowed_ends_loop() {
    let h = spawn_with(SurfacePolicy::default());

    h.fake.inject(SurfaceEvent::CloseRequested);
    h.handle.join().unwrap();

    assert_eq!(h.fake.count("destroy"), 1);
    assert!(h.shutdown.is_triggered());
}

#[test]
fn test_close_suppressed_keeps_window() {
    let h = spawn_with(SurfacePolicy {
        close: CloseBehavior::Suppress,
        ..Default::default()
    });

    h.fake.inject(SurfaceEvent::CloseRequested);
    h.tx.dispatch(UiCommand::Show).unwrap();
    wait_until("show", || h.fake.is_shown());

    assert_eq!(h.fake.count("destroy"), 0);
    assert!(!h.shutdown.is_triggered());

    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();
}

#[test]
fn test_minimize_follows_policy() {
    let h = spawn_with(SurfacePolicy::default());
    h.fake.inject(SurfaceEvent::MinimizeRequested);
    wait_until("minimize", || h.fake.count("minimize") == 1);
    assert_eq!(h.fake.count("restore"), 0);
    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();

    let h = spawn_with(SurfacePolicy {
        minimize: MinimizeBehavior::Suppress,
        ..Default::default()
    });
    h.fake.inject(SurfaceEvent::MinimizeRequested);
    wait_until("restore", || h.fake.count("restore") == 1);
    assert_eq!(h.fake.count("minimize"), 0);
    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();
}

#[test]
fn test_paint_before_start_draws_nothing() {
    let h = spawn_with(SurfacePolicy::default());

    h.fake.inject(SurfaceEvent::Paint);
    h.tx.dispatch(UiCommand::Redraw).unwrap();
    wait_until("redraw", || h.fake.count("redraw") == 1);
    // Give the loop a few more turns to handle the paint
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(h.fake.count("buffer"), 0);
    assert_eq!(h.fake.count("commit"), 0);

    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();
}

#[test]
fn test_paint_of_started_timer_reaches_window() {
    let h = spawn_with(SurfacePolicy::default());
    h.timer.start_with(|_| Ok::<_, ()>(())).unwrap();

    h.fake.inject(SurfaceEvent::Paint);
    wait_until("paint", || h.fake.count("buffer") == 1);
    // Without fonts the empty-measure skip path is taken instead
    let expected = usize::from(fonts_available());
    wait_until("commit", || h.fake.count("commit") == expected);

    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();
    assert_eq!(h.fake.count("commit"), expected);
}

#[test]
fn test_paint_without_buffer_retries_on_next_paint() {
    let h = spawn_with(SurfacePolicy::default());
    h.timer.start_with(|_| Ok::<_, ()>(())).unwrap();
    h.fake.withhold_buffer(true);

    h.fake.inject(SurfaceEvent::Paint);
    wait_until("first paint", || h.fake.count("buffer") == 1);
    assert_eq!(h.fake.count("commit"), 0);

    h.fake.withhold_buffer(false);
    h.fake.inject(SurfaceEvent::Paint);
    wait_until("second paint", || h.fake.count("buffer") == 2);
    let expected = usize::from(fonts_available());
    wait_until("commit", || h.fake.count("commit") == expected);

    h.tx.dispatch(UiCommand::Quit).unwrap();
    h.handle.join().unwrap();
}

#[test]
fn test_dropped_sender_ends_loop() {
    let h = spawn_with(SurfacePolicy::default());
    drop(h.tx);
    h.handle.join().unwrap();
    assert!(h.shutdown.is_triggered());
}

#[test]
fn test_factory_failure_is_reported() {
    let shutdown = Shutdown::new();
    let result = spawn_ui_thread::<FakePlatform, _>(
        || Err(PlatformError::ConnectionFailed("no display".to_string())),
        SharedTimer::new(),
        UiThreadOptions {
            policy: SurfacePolicy::default(),
            poll_interval: Duration::from_millis(2),
        },
        shutdown.clone(),
    );

    assert!(matches!(result, Err(PlatformError::ConnectionFailed(_))));
    assert!(!shutdown.is_triggered());
}
