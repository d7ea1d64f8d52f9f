//! Small helpers shared by the window and its tests

use gentimer_types::TextPosition;
use tiny_skia::Color;

/// Convert [u8; 4] RGBA array to tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Top-left corner of the text box.
///
/// `Centered` places a `text` sized box in the middle of `area`, clamped so
/// oversized text starts at the left/top edge. `Fixed` ignores the sizes.
pub fn text_origin(
    position: TextPosition,
    area: (f32, f32),
    text: (f32, f32),
    fixed: (f32, f32),
) -> (f32, f32) {
    match position {
        TextPosition::Centered => (
            ((area.0 - text.0) / 2.0).max(0.0),
            ((area.1 - text.1) / 2.0).max(0.0),
        ),
        TextPosition::Fixed => fixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_rgba() {
        let color = color_from_rgba([255, 0, 0, 255]);
        assert_eq!(color.red(), 1.0);
        assert_eq!(color.green(), 0.0);
        assert_eq!(color.alpha(), 1.0);
    }

    #[test]
    fn test_centered_origin() {
        let origin = text_origin(
            TextPosition::Centered,
            (300.0, 150.0),
            (200.0, 50.0),
            (10.0, 10.0),
        );
        assert_eq!(origin, (50.0, 50.0));
    }

    #[test]
    fn test_centered_origin_clamps_oversized_text() {
        let origin = text_origin(
            TextPosition::Centered,
            (100.0, 40.0),
            (180.0, 60.0),
            (10.0, 10.0),
        );
        assert_eq!(origin, (0.0, 0.0));
    }

    #[test]
    fn test_fixed_origin() {
        let origin = text_origin(
            TextPosition::Fixed,
            (300.0, 150.0),
            (200.0, 50.0),
            (10.0, 12.0),
        );
        assert_eq!(origin, (10.0, 12.0));
    }
}
