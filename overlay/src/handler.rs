//! Decides how the timer window reacts to native events
//!
//! Kept free of any window system so every rule can be tested directly.

use std::time::Instant;

use gentimer_core::TimerSnapshot;
use gentimer_types::{CloseBehavior, MinimizeBehavior, WindowConfig};

use crate::platform::SurfaceEvent;

/// User-facing window policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfacePolicy {
    pub close: CloseBehavior,
    pub minimize: MinimizeBehavior,
}

impl From<&WindowConfig> for SurfacePolicy {
    fn from(config: &WindowConfig) -> Self {
        Self {
            close: config.close_behavior,
            minimize: config.minimize_behavior,
        }
    }
}

/// What the UI loop should do in response to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Draw this text
    Render(String),
    /// Nothing to draw this cycle
    Skip,
    /// Destroy the window
    Destroy,
    /// Let the minimize go through
    Minimize,
    /// Undo the minimize and stay on screen
    Restore,
    /// Leave the UI loop
    Quit,
    /// Refuse the request
    Ignore,
}

pub fn handle_event(
    event: SurfaceEvent,
    timer: &TimerSnapshot,
    policy: &SurfacePolicy,
    now: Instant,
) -> SurfaceAction {
    match event {
        SurfaceEvent::Paint => match timer.elapsed_text(now) {
            Some(text) => SurfaceAction::Render(text),
            None => SurfaceAction::Skip,
        },
        SurfaceEvent::CloseRequested => match policy.close {
            CloseBehavior::Allow => SurfaceAction::Destroy,
            CloseBehavior::Suppress => SurfaceAction::Ignore,
        },
        SurfaceEvent::MinimizeRequested => match policy.minimize {
            MinimizeBehavior::Allow => SurfaceAction::Minimize,
            MinimizeBehavior::Suppress => SurfaceAction::Restore,
        },
        SurfaceEvent::Destroyed => SurfaceAction::Quit,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn running(secs: u64, now: Instant) -> TimerSnapshot {
        TimerSnapshot {
            started_at: Some(now - Duration::from_secs(secs)),
            visible: true,
        }
    }

    #[test]
    fn test_paint_renders_elapsed_time() {
        let now = Instant::now() + Duration::from_secs(7200);
        let action = handle_event(
            SurfaceEvent::Paint,
            &running(3605, now),
            &SurfacePolicy::default(),
            now,
        );
        assert_eq!(action, SurfaceAction::Render("01:00:05".to_string()));
    }

    #[test]
    fn test_paint_while_hidden_skips() {
        let now = Instant::now() + Duration::from_secs(60);
        let mut timer = running(10, now);
        timer.visible = false;
        let action = handle_event(SurfaceEvent::Paint, &timer, &SurfacePolicy::default(), now);
        assert_eq!(action, SurfaceAction::Skip);
    }

    #[test]
    fn test_paint_before_start_skips() {
        let action = handle_event(
            SurfaceEvent::Paint,
            &TimerSnapshot::default(),
            &SurfacePolicy::default(),
            Instant::now(),
        );
        assert_eq!(action, SurfaceAction::Skip);
    }

    #[test]
    fn test_close_follows_policy() {
        let timer = TimerSnapshot::default();
        let now = Instant::now();

        let allow = SurfacePolicy::default();
        assert_eq!(
            handle_event(SurfaceEvent::CloseRequested, &timer, &allow, now),
            SurfaceAction::Destroy
        );

        let suppress = SurfacePolicy {
            close: CloseBehavior::Suppress,
            ..Default::default()
        };
        assert_eq!(
            handle_event(SurfaceEvent::CloseRequested, &timer, &suppress, now),
            SurfaceAction::Ignore
        );
    }

    #[test]
    fn test_minimize_follows_policy() {
        let timer = TimerSnapshot::default();
        let now = Instant::now();

        let allow = SurfacePolicy::default();
        assert_eq!(
            handle_event(SurfaceEvent::MinimizeRequested, &timer, &allow, now),
            SurfaceAction::Minimize
        );

        let suppress = SurfacePolicy {
            minimize: MinimizeBehavior::Suppress,
            ..Default::default()
        };
        assert_eq!(
            handle_event(SurfaceEvent::MinimizeRequested, &timer, &suppress, now),
            SurfaceAction::Restore
        );
    }

    #[test]
    fn test_destroy_quits_regardless_of_policy() {
        let policy = SurfacePolicy {
            close: CloseBehavior::Suppress,
            minimize: MinimizeBehavior::Suppress,
        };
        assert_eq!(
            handle_event(
                SurfaceEvent::Destroyed,
                &TimerSnapshot::default(),
                &policy,
                Instant::now()
            ),
            SurfaceAction::Quit
        );
    }

    #[test]
    fn test_policy_from_config() {
        let config = WindowConfig {
            close_behavior: CloseBehavior::Suppress,
            ..Default::default()
        };
        let policy = SurfacePolicy::from(&config);
        assert_eq!(policy.close, CloseBehavior::Suppress);
        assert_eq!(policy.minimize, MinimizeBehavior::Allow);
    }
}
