//! The timer window: a platform surface plus its renderer

use gentimer_types::{TextPosition, WindowConfig};
use tiny_skia::Color;

use crate::platform::{NativeOverlay, OverlayConfig, OverlayPlatform, PlatformError};
use crate::renderer::Renderer;
use crate::utils::{color_from_rgba, text_origin};

/// Baseline offset as a fraction of the measured line height
const BASELINE_RATIO: f32 = 0.8;

/// Resolved drawing parameters
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font_size: f32,
    pub text_color: Color,
    pub background: Color,
    pub position: TextPosition,
    pub fixed_origin: (f32, f32),
}

impl From<&WindowConfig> for TextStyle {
    fn from(config: &WindowConfig) -> Self {
        Self {
            font_size: config.font_size,
            text_color: color_from_rgba(config.text_color),
            background: color_from_rgba(config.background_color),
            position: config.text_position,
            fixed_origin: (config.fixed_text_x, config.fixed_text_y),
        }
    }
}

/// A timer window with its own renderer
pub struct TimerWindow<P: OverlayPlatform = NativeOverlay> {
    platform: P,
    renderer: Renderer,
    style: TextStyle,
}

impl TimerWindow<NativeOverlay> {
    /// Create the native window, initially hidden
    pub fn new(config: &WindowConfig) -> Result<Self, PlatformError> {
        let platform = NativeOverlay::new(OverlayConfig::from(config))?;
        Ok(Self::with_platform(platform, config))
    }
}

impl<P: OverlayPlatform> TimerWindow<P> {
    pub fn with_platform(platform: P, config: &WindowConfig) -> Self {
        Self {
            platform,
            renderer: Renderer::new(config.font_family.clone()),
            style: TextStyle::from(config),
        }
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Draw `text` over the background and push it to the screen.
    ///
    /// Returns false when nothing was committed: the buffer is not ready or
    /// the text could not be shaped. Both are transient; the next paint
    /// retries.
    pub fn paint(&mut self, text: &str) -> bool {
        let width = self.platform.width();
        let height = self.platform.height();
        let Some(buffer) = self.platform.pixel_buffer() else {
            tracing::debug!("Pixel buffer not ready, skipping paint");
            return false;
        };

        let (text_w, text_h) = self.renderer.measure_text(text, self.style.font_size);
        if text_w <= 0.0 {
            tracing::debug!(text, "Text measured empty, skipping paint");
            return false;
        }

        self.renderer
            .clear(buffer, width, height, self.style.background);

        let (x, top) = text_origin(
            self.style.position,
            (width as f32, height as f32),
            (text_w, text_h),
            self.style.fixed_origin,
        );
        let baseline = top + text_h * BASELINE_RATIO;

        self.renderer.draw_text(
            buffer,
            width,
            height,
            text,
            x,
            baseline,
            self.style.font_size,
            self.style.text_color,
        );

        self.platform.commit();
        true
    }
}
