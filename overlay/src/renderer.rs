//! Software renderer using tiny-skia and cosmic-text
//!
//! All rendering is done on the CPU and produces an RGBA pixel buffer that the
//! platform backend converts and pushes to the window.
use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache, Weight,
};
use tiny_skia::{Color, PixmapMut};

/// Maximum entries in the text shaping cache (LRU eviction when exceeded).
/// The timer string changes every second, so only recent entries matter.
const TEXT_CACHE_MAX_ENTRIES: usize = 64;

/// Cached result of text shaping
struct CachedText {
    /// Pre-shaped glyphs ready for rendering
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
    /// LRU tracking: incremented on each access
    last_used: u64,
}

/// Key for text cache: (text content, font size rounded to tenths)
type TextCacheKey = (String, u32);

/// A software renderer for the timer text
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    font_family: String,
    /// Cache of shaped text to avoid re-shaping on every repaint
    text_cache: HashMap<TextCacheKey, CachedText>,
    /// Counter for LRU tracking
    cache_access_counter: u64,
}

impl Renderer {
    /// Create a renderer drawing bold text in `font_family`. Unknown families
    /// fall back to whatever the system font database offers.
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            font_family: font_family.into(),
            text_cache: HashMap::with_capacity(TEXT_CACHE_MAX_ENTRIES),
            cache_access_counter: 0,
        }
    }

    /// Evict least recently used entries if cache is too large
    fn evict_lru_if_needed(&mut self) {
        if self.text_cache.len() <= TEXT_CACHE_MAX_ENTRIES {
            return;
        }

        // Remove ~25% of cache, oldest first
        let target_size = TEXT_CACHE_MAX_ENTRIES * 3 / 4;
        let mut entries: Vec<_> = self
            .text_cache
            .iter()
            .map(|(k, v)| (k.clone(), v.last_used))
            .collect();
        entries.sort_by_key(|(_, last_used)| *last_used);

        for (key, _) in entries
            .into_iter()
            .take(self.text_cache.len() - target_size)
        {
            self.text_cache.remove(&key);
        }
    }

    /// Find cached entry by borrowed key (avoids String allocation on hit)
    fn find_cached(&mut self, text: &str, font_size_key: u32) -> Option<&mut CachedText> {
        self.text_cache
            .iter_mut()
            .find(|(k, _)| k.0 == text && k.1 == font_size_key)
            .map(|(_, v)| v)
    }

    /// Ensure text is cached, shaping if needed. Returns (width, height).
    fn ensure_cached(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let font_size_key = (font_size * 10.0).round() as u32;

        self.cache_access_counter += 1;
        let current_access = self.cache_access_counter;

        if let Some(cached) = self.find_cached(text, font_size_key) {
            cached.last_used = current_access;
            return (cached.width, cached.height);
        }

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut text_buffer = Buffer::new(&mut self.font_system, metrics);

        let attrs = Attrs::new()
            .family(Family::Name(&self.font_family))
            .weight(Weight::BOLD);
        text_buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        text_buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;

        for run in text_buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            glyphs.extend(run.glyphs.iter().cloned());
        }

        self.text_cache.insert(
            (text.to_string(), font_size_key),
            CachedText {
                glyphs,
                width,
                height,
                last_used: current_access,
            },
        );
        self.evict_lru_if_needed();

        (width, height)
    }

    /// Get cached glyphs for drawing. Must call ensure_cached first.
    fn get_cached_glyphs(&mut self, text: &str, font_size: f32) -> Vec<LayoutGlyph> {
        let font_size_key = (font_size * 10.0).round() as u32;
        self.find_cached(text, font_size_key)
            .map(|c| c.glyphs.clone())
            .unwrap_or_default()
    }

    /// Clear a pixel buffer with a color
    pub fn clear(&self, buffer: &mut [u8], width: u32, height: u32, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) {
            pixmap.fill(color);
        }
    }

    /// Draw text with its baseline at (`x`, `baseline`)
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        baseline: f32,
        font_size: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };

        let _ = self.ensure_cached(text, font_size);
        let glyphs = self.get_cached_glyphs(text, font_size);

        let text_color = CosmicColor::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        for glyph in &glyphs {
            let physical_glyph = glyph.physical((x, baseline), 1.0);

            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical_glyph.cache_key)
            {
                let glyph_x = physical_glyph.x + image.placement.left;
                let glyph_y = physical_glyph.y - image.placement.top;

                draw_glyph_to_pixmap(
                    &mut pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    glyph_x,
                    glyph_y,
                    text_color,
                );
            }
        }
    }

    /// Measure text dimensions (uses shaping cache)
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.ensure_cached(text, font_size)
    }
}

/// Draw a glyph coverage mask onto a pixmap with alpha blending
fn draw_glyph_to_pixmap(
    pixmap: &mut PixmapMut,
    glyph_data: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= pixmap_height {
            continue;
        }

        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let glyph_idx = (gy as u32 * glyph_width + gx as u32) as usize;
            let Some(&alpha) = glyph_data.get(glyph_idx) else {
                continue;
            };
            if alpha == 0 {
                continue;
            }

            let pixel_idx = ((py as u32 * pixmap_width as u32 + px as u32) * 4) as usize;
            if pixel_idx + 3 >= data.len() {
                continue;
            }

            let src_a = (alpha as u32 * color.a() as u32) / 255;
            let inv_a = 255 - src_a;

            data[pixel_idx] =
                ((color.r() as u32 * src_a + data[pixel_idx] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 1] =
                ((color.g() as u32 * src_a + data[pixel_idx + 1] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 2] =
                ((color.b() as u32 * src_a + data[pixel_idx + 2] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 3] = (src_a + (data[pixel_idx + 3] as u32 * inv_a) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_fills_every_pixel() {
        let renderer = Renderer::new("Arial");
        let mut buffer = vec![0u8; 4 * 3 * 4];
        renderer.clear(&mut buffer, 4, 3, Color::from_rgba8(255, 255, 255, 255));
        assert!(buffer.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_clear_ignores_mismatched_buffer() {
        let renderer = Renderer::new("Arial");
        let mut buffer = vec![7u8; 10];
        renderer.clear(&mut buffer, 4, 3, Color::WHITE);
        assert!(buffer.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_glyph_blend_respects_bounds() {
        let mut data = vec![255u8; 2 * 2 * 4];
        let mut pixmap = PixmapMut::from_bytes(&mut data, 2, 2).unwrap();
        // 2x2 opaque mask placed half outside the pixmap
        draw_glyph_to_pixmap(
            &mut pixmap,
            &[255, 255, 255, 255],
            2,
            2,
            1,
            -1,
            CosmicColor::rgba(0, 0, 0, 255),
        );

        // Only pixel (1, 0) is covered
        assert_eq!(&data[4..8], &[0, 0, 0, 255]);
        assert_eq!(&data[0..4], &[255, 255, 255, 255]);
        assert_eq!(&data[8..16], &[255u8; 8]);
    }

    #[test]
    fn test_glyph_blend_partial_coverage() {
        let mut data = vec![255u8; 4];
        let mut pixmap = PixmapMut::from_bytes(&mut data, 1, 1).unwrap();
        draw_glyph_to_pixmap(
            &mut pixmap,
            &[0],
            1,
            1,
            0,
            0,
            CosmicColor::rgba(0, 0, 0, 255),
        );
        assert_eq!(data, vec![255u8; 4], "zero coverage leaves pixel untouched");
    }
}
