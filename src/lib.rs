pub mod config;
pub mod desktop;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod render;
pub mod telemetry;

#[cfg(windows)]
pub mod tray;

pub use config::OverlayConfig;
