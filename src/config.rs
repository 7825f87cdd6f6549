use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::render::Rgba;

/// Environment variable naming the font file used for the text stack.
pub const FONT_ENV: &str = "SYSINFO_WALLPAPER_FONT";
/// Environment variable keeping the overlay hit-testable when truthy.
pub const CLICKABLE_ENV: &str = "SYSINFO_WALLPAPER_CLICKABLE";

/// Parameters for the one-shot desktop attachment.
#[derive(Clone, Debug)]
pub struct AttachConfig {
    /// How long to wait for the desktop host to spawn its worker surface.
    pub spawn_timeout: Duration,
    /// Keep the overlay hit-testable instead of click-through.
    pub clickable: bool,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            spawn_timeout: Duration::from_millis(1000),
            clickable: false,
        }
    }
}

/// Crosshair and text stack appearance.
#[derive(Clone, Debug)]
pub struct HudConfig {
    /// Width of both crosshair strips.
    pub thickness: i32,
    /// Vertical distance between text lines.
    pub line_spacing: i32,
    /// Extra horizontal gap between the vertical strip and the text.
    pub text_gap: i32,
    pub font_size: f32,
    pub strip_color: Rgba,
    pub text_color: Rgba,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            thickness: 10,
            line_spacing: 40,
            text_gap: 10,
            font_size: 28.0,
            strip_color: Rgba::WHITE,
            text_color: Rgba::WHITE,
        }
    }
}

/// Everything the overlay needs at startup.
#[derive(Clone, Debug)]
pub struct OverlayConfig {
    pub attach: AttachConfig,
    pub hud: HudConfig,
    /// How often CPU and RAM are sampled.
    pub telemetry_interval: Duration,
    /// Deadline between event-loop wakeups.
    pub frame_interval: Duration,
    pub font_path: PathBuf,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            attach: AttachConfig::default(),
            hud: HudConfig::default(),
            telemetry_interval: Duration::from_millis(500),
            frame_interval: Duration::from_secs(1) / 60,
            font_path: default_font_path(),
        }
    }
}

impl OverlayConfig {
    /// Defaults with the environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env::var_os(FONT_ENV).filter(|p| !p.is_empty()) {
            config.font_path = PathBuf::from(path);
        }
        if let Ok(value) = env::var(CLICKABLE_ENV) {
            config.attach.clickable = is_truthy(&value);
        }
        config
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn default_font_path() -> PathBuf {
    let windir = env::var_os("WINDIR").unwrap_or_else(|| r"C:\Windows".into());
    PathBuf::from(windir).join("Fonts").join("segoeuib.ttf")
}
