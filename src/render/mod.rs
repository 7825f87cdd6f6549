//! Drawing backend for the overlay.
//!
//! The HUD only talks to [`Canvas`]; the software implementation rasterizes
//! into a premultiplied RGBA buffer and hands it to a [`Present`] sink.

pub mod skia;

#[cfg(windows)]
pub mod layered;

use crate::error::RenderError;
use crate::overlay::geometry::{Point, Rect};

pub use skia::SkiaCanvas;

/// Straight (non-premultiplied) RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Immediate-mode drawing surface used once per frame.
pub trait Canvas {
    fn begin_frame(&mut self);

    fn clear(&mut self, color: Rgba);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Draw `text` with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, color: Rgba);

    /// Finish the frame and push it to the screen.
    fn end_frame(&mut self) -> Result<(), RenderError>;
}

/// Receives finished frames as premultiplied RGBA rows, top-down.
pub trait Present {
    fn present(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<(), RenderError>;
}
