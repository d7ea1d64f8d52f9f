//! Shared configuration types for gentimer
//!
//! This crate contains serializable configuration types that are shared between
//! the control side (gentimer-core) and the window side (gentimer-overlay).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Window Behavior
// ─────────────────────────────────────────────────────────────────────────────

/// What happens when the user asks the window manager to close the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseBehavior {
    /// Destroy the window, which ends the process
    #[default]
    Allow,
    /// Ignore the request and keep the window pinned
    Suppress,
}

/// What happens when the user asks the window manager to minimize the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimizeBehavior {
    /// Minimize normally
    #[default]
    Allow,
    /// Keep the window restored and visible
    Suppress,
}

/// Where the elapsed time text is placed inside the client area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    /// Centered horizontally and vertically
    #[default]
    Centered,
    /// Top-left corner of the text at `WindowConfig::fixed_text_x/y`
    Fixed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Config
// ─────────────────────────────────────────────────────────────────────────────

/// Appearance and placement of the timer window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Screen position; `None` lets the platform pick
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f32,
    /// RGBA
    pub text_color: [u8; 4],
    /// RGBA
    pub background_color: [u8; 4],
    pub text_position: TextPosition,
    pub fixed_text_x: f32,
    pub fixed_text_y: f32,
    pub close_behavior: CloseBehavior,
    pub minimize_behavior: MinimizeBehavior,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Generator Timer".to_string(),
            x: None,
            y: None,
            width: 300,
            height: 150,
            font_family: "Arial".to_string(),
            font_size: 48.0,
            text_color: [0, 0, 0, 255],
            background_color: [255, 255, 255, 255],
            text_position: TextPosition::Centered,
            fixed_text_x: 10.0,
            fixed_text_y: 10.0,
            close_behavior: CloseBehavior::Allow,
            minimize_behavior: MinimizeBehavior::Allow,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Config
// ─────────────────────────────────────────────────────────────────────────────

/// Control plane listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1997,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub window: WindowConfig,
    /// Period of the redraw ticker
    pub tick_interval_ms: u64,
    /// Upper bound on how long the UI thread waits for commands before
    /// pumping native window events again
    pub ui_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            window: WindowConfig::default(),
            tick_interval_ms: 1000,
            ui_poll_ms: 16,
        }
    }
}
