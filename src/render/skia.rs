//! Software canvas using tiny-skia for shapes and fontdue for glyphs.

use std::collections::HashMap;

use fontdue::{Font, FontSettings, Metrics};
use tiny_skia::{Color, Paint, Pixmap, Rect as SkRect, Transform};
use tracing::warn;

use super::{Canvas, Present, Rgba};
use crate::error::RenderError;
use crate::overlay::geometry::{Point, Rect, Size};

/// A rasterized glyph: coverage bitmap plus placement metrics.
struct Glyph {
    metrics: Metrics,
    coverage: Vec<u8>,
}

struct LoadedFont {
    font: Font,
    size: f32,
    ascent: f32,
    glyphs: HashMap<char, Glyph>,
}

impl LoadedFont {
    fn glyph(&mut self, c: char) -> &Glyph {
        let Self {
            font, size, glyphs, ..
        } = self;
        glyphs.entry(c).or_insert_with(|| {
            let (metrics, coverage) = font.rasterize(c, *size);
            Glyph { metrics, coverage }
        })
    }
}

pub struct SkiaCanvas<P> {
    pixmap: Pixmap,
    font: Option<LoadedFont>,
    missing_font_logged: bool,
    presenter: P,
}

impl<P: Present> SkiaCanvas<P> {
    pub fn new(width: u32, height: u32, presenter: P) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        Ok(Self {
            pixmap,
            font: None,
            missing_font_logged: false,
            presenter,
        })
    }

    /// Parse `bytes` as a TTF/OTF font and use it at `size` pixels.
    pub fn with_font(mut self, bytes: &[u8], size: f32) -> Result<Self, RenderError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let ascent = font
            .horizontal_line_metrics(size)
            .map(|m| m.ascent)
            .unwrap_or(size);
        self.font = Some(LoadedFont {
            font,
            size,
            ascent,
            glyphs: HashMap::new(),
        });
        Ok(self)
    }

    /// Premultiplied RGBA pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p = self.pixmap.pixel(x, y)?;
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    fn blend_coverage(&mut self, left: i32, top: i32, glyph_w: usize, coverage: &[u8], color: Rgba) {
        let width = self.pixmap.width() as i32;
        let height = self.pixmap.height() as i32;
        let data = self.pixmap.data_mut();

        for (row, line) in coverage.chunks(glyph_w.max(1)).enumerate() {
            let y = top + row as i32;
            if y < 0 || y >= height {
                continue;
            }
            for (col, &cov) in line.iter().enumerate() {
                let x = left + col as i32;
                if cov == 0 || x < 0 || x >= width {
                    continue;
                }
                let alpha = u32::from(cov) * u32::from(color.a) / 255;
                let offset = ((y * width + x) * 4) as usize;
                let inv = 255 - alpha;
                let src = [color.r, color.g, color.b];
                for (i, channel) in src.iter().enumerate() {
                    let s = u32::from(*channel) * alpha / 255;
                    let d = u32::from(data[offset + i]) * inv / 255;
                    data[offset + i] = (s + d).min(255) as u8;
                }
                let da = u32::from(data[offset + 3]) * inv / 255;
                data[offset + 3] = (alpha + da).min(255) as u8;
            }
        }
    }
}

fn sk_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

impl<P: Present> Canvas for SkiaCanvas<P> {
    fn begin_frame(&mut self) {}

    fn clear(&mut self, color: Rgba) {
        self.pixmap.fill(sk_color(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        // Clip before converting; tiny-skia widens spans that start off-surface.
        let surface = Size::new(self.pixmap.width() as i32, self.pixmap.height() as i32);
        let Some(rect) = rect.clip(surface).and_then(|r| {
            SkRect::from_xywh(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
        }) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(sk_color(color));
        paint.anti_alias = false;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn draw_text(&mut self, text: &str, origin: Point, color: Rgba) {
        let Some(mut font) = self.font.take() else {
            if !self.missing_font_logged {
                warn!("no font loaded; text is not drawn");
                self.missing_font_logged = true;
            }
            return;
        };

        let baseline = origin.y as f32 + font.ascent;
        let mut pen = origin.x as f32;
        let mut previous = None;
        for c in text.chars() {
            if let Some(prev) = previous {
                pen += font.font.horizontal_kern(prev, c, font.size).unwrap_or(0.0);
            }
            let glyph = font.glyph(c);
            let left = (pen + glyph.metrics.xmin as f32).round() as i32;
            let top = (baseline - glyph.metrics.ymin as f32 - glyph.metrics.height as f32).round()
                as i32;
            self.blend_coverage(left, top, glyph.metrics.width, &glyph.coverage, color);
            pen += glyph.metrics.advance_width;
            previous = Some(c);
        }

        self.font = Some(font);
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.presenter
            .present(self.pixmap.data(), self.pixmap.width(), self.pixmap.height())
    }
}
