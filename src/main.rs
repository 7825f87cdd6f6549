#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use sysinfo_wallpaper::{OverlayConfig, logging};

fn main() -> anyhow::Result<()> {
    logging::init();
    tracing::info!("=== SystemInfoWallpaper ===");

    let config = OverlayConfig::from_env();
    tracing::debug!(?config, "configuration loaded");

    run(config)
}

#[cfg(windows)]
fn run(config: OverlayConfig) -> anyhow::Result<()> {
    sysinfo_wallpaper::overlay::app::run(config)
}

#[cfg(not(windows))]
fn run(_config: OverlayConfig) -> anyhow::Result<()> {
    anyhow::bail!("the desktop background overlay needs the Windows desktop shell")
}
