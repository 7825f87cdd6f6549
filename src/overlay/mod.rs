pub mod geometry;
pub mod hud;
pub mod render_loop;

#[cfg(windows)]
pub mod app;

pub use hud::HudFrame;
pub use render_loop::{FrameClock, FrameDrops, FrameReport, RenderLoop};
