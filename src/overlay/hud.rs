//! Crosshair and telemetry text stack drawn each frame.

use std::time::Duration;

use super::geometry::{Point, Rect, Size};
use crate::config::HudConfig;
use crate::error::RenderError;
use crate::render::{Canvas, Rgba};
use crate::telemetry::TelemetrySnapshot;

/// Number of text lines in the stack.
pub const LINE_COUNT: usize = 5;

/// Inputs for one frame, gathered by the render loop.
#[derive(Clone, Copy, Debug)]
pub struct HudFrame<'a> {
    pub cursor: Point,
    pub size: Size,
    pub frame_time: Duration,
    pub telemetry: &'a TelemetrySnapshot,
}

/// Horizontal and vertical strips centered on `cursor`, in that order.
pub fn crosshair(cursor: Point, size: Size, thickness: i32) -> [Rect; 2] {
    let half = thickness / 2;
    [
        Rect::new(0, cursor.y - half, size.width, thickness),
        Rect::new(cursor.x - half, 0, thickness, size.height),
    ]
}

/// Top-left corner of the first text line, just below-right of the
/// crosshair intersection.
pub fn text_anchor(cursor: Point, config: &HudConfig) -> Point {
    cursor.offset(config.thickness + config.text_gap, config.thickness)
}

/// Instantaneous frame rate for a single frame, two decimals, unsmoothed.
pub fn format_fps(frame_time: Duration) -> String {
    format!("{:.2}", 1.0 / frame_time.as_secs_f64())
}

/// The five lines in display order: x, y, fps, cpu, ram.
pub fn text_lines(frame: &HudFrame<'_>) -> [String; LINE_COUNT] {
    [
        format!("mouse x - {}", frame.cursor.x),
        format!("mouse y - {}", frame.cursor.y),
        format!("fps - {}", format_fps(frame.frame_time)),
        format!("cpu - {}", frame.telemetry.cpu),
        format!("ram - {}", frame.telemetry.ram),
    ]
}

/// Vertical offset of line `index` from the anchor.
pub fn line_offset(index: usize, spacing: i32) -> i32 {
    index as i32 * spacing
}

/// Issue every draw call for one frame, from clear to end.
pub fn draw<C: Canvas + ?Sized>(
    canvas: &mut C,
    frame: &HudFrame<'_>,
    config: &HudConfig,
) -> Result<(), RenderError> {
    canvas.begin_frame();
    canvas.clear(Rgba::TRANSPARENT);

    for strip in crosshair(frame.cursor, frame.size, config.thickness) {
        canvas.fill_rect(strip, config.strip_color);
    }

    let anchor = text_anchor(frame.cursor, config);
    for (i, line) in text_lines(frame).iter().enumerate() {
        let origin = anchor.offset(0, line_offset(i, config.line_spacing));
        canvas.draw_text(line, origin, config.text_color);
    }

    canvas.end_frame()
}
