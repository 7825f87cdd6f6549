//! Event-loop host: creates the overlay window, attaches it to the desktop,
//! then drives the render loop until the tray asks to exit.

use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::platform::windows::WindowAttributesExtWindows;
use winit::window::{Window, WindowId as WinitWindowId, WindowLevel};

use super::geometry::Size;
use super::render_loop::{FrameDrops, FrameReport, RenderLoop};
use crate::config::OverlayConfig;
use crate::desktop::win32::Win32WindowManager;
use crate::desktop::{DesktopAttacher, WindowId, WindowManager};
use crate::render::SkiaCanvas;
use crate::render::layered::LayeredPresenter;
use crate::telemetry::{SharedSnapshot, SysinfoSource, TelemetrySampler};
use crate::tray::{Tray, spawn_tray};

/// Requests delivered to the event loop from other threads.
#[derive(Debug, Clone, Copy)]
pub enum OverlayEvent {
    Exit,
}

type OverlayRenderLoop = RenderLoop<Win32WindowManager, SkiaCanvas<LayeredPresenter>>;

pub struct OverlayApp {
    config: OverlayConfig,
    proxy: EventLoopProxy<OverlayEvent>,
    window: Option<Window>,
    render: Option<OverlayRenderLoop>,
    sampler: Option<TelemetrySampler>,
    tray: Option<Tray>,
    drops: FrameDrops,
    next_frame: Instant,
    failure: Option<anyhow::Error>,
}

fn native_id(window: &Window) -> Result<WindowId> {
    let handle = window
        .window_handle()
        .context("overlay window has no native handle")?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Ok(WindowId(h.hwnd.get())),
        other => Err(anyhow!("unexpected window handle kind: {other:?}")),
    }
}

impl OverlayApp {
    pub fn new(config: OverlayConfig, proxy: EventLoopProxy<OverlayEvent>) -> Self {
        Self {
            config,
            proxy,
            window: None,
            render: None,
            sampler: None,
            tray: None,
            drops: FrameDrops::default(),
            next_frame: Instant::now(),
            failure: None,
        }
    }

    /// The error that stopped startup, if any.
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        // winit re-applies its own styles on most setters, so the window is
        // configured fully here and never touched through winit afterwards.
        let attributes = Window::default_attributes()
            .with_title("SystemInfoWallpaper")
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_skip_taskbar(true)
            .with_active(false);
        let window = event_loop
            .create_window(attributes)
            .context("failed to create overlay window")?;
        let overlay = native_id(&window)?;

        let wm = Win32WindowManager;
        let attachment = DesktopAttacher::new(wm, self.config.attach.clone())
            .attach(overlay)
            .context("cannot attach overlay to the desktop")?;

        let size = attachment
            .bounds
            .map(|b| b.size())
            .or_else(|| wm.client_size(overlay))
            .filter(|s| s.width > 0 && s.height > 0)
            .unwrap_or(Size::new(1920, 1080));
        let (width, height) = (size.width as u32, size.height as u32);

        let presenter = LayeredPresenter::new(overlay, width, height)?;
        let mut canvas = SkiaCanvas::new(width, height, presenter)?;
        match std::fs::read(&self.config.font_path) {
            Ok(font) => canvas = canvas.with_font(&font, self.config.hud.font_size)?,
            Err(e) => warn!(
                path = %self.config.font_path.display(),
                "cannot read font, drawing crosshair only: {e}"
            ),
        }

        let telemetry = SharedSnapshot::new();
        let sampler = TelemetrySampler::spawn(
            SysinfoSource::new(),
            self.config.telemetry_interval,
            telemetry.clone(),
        )
        .context("cannot start telemetry sampler")?;

        let proxy = self.proxy.clone();
        let tray = spawn_tray(move || {
            let _ = proxy.send_event(OverlayEvent::Exit);
        })
        .context("cannot start tray thread")?;

        let now = Instant::now();
        self.render = Some(RenderLoop::new(
            wm,
            overlay,
            canvas,
            telemetry,
            self.config.hud.clone(),
            size,
            now,
        ));
        self.next_frame = now;
        self.sampler = Some(sampler);
        self.tray = Some(tray);
        self.window = Some(window);
        info!(width, height, "overlay running");
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.render = None;
        drop(self.sampler.take());
        if let Some(mut tray) = self.tray.take() {
            tray.close();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler<OverlayEvent> for OverlayApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            error!("startup failed: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: OverlayEvent) {
        match event {
            OverlayEvent::Exit => {
                info!("exiting");
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WinitWindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested | WindowEvent::Destroyed = event {
            // Also reached when the desktop host is torn down with its children.
            info!(?event, "overlay window closed");
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render) = self.render.as_mut() else {
            return;
        };

        let now = Instant::now();
        if now >= self.next_frame {
            let result = render.tick(now);
            match (self.drops.record(result.is_ok()), result) {
                (FrameReport::FirstDrop, Err(e)) => warn!("frame dropped: {e}"),
                (FrameReport::RepeatDrop(run), Err(e)) => debug!(run, "frame dropped: {e}"),
                (FrameReport::Recovered(run), _) => info!(run, "frames recovered"),
                _ => {}
            }
            self.next_frame = now + self.config.frame_interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

/// Run the overlay until the tray "Exit" command.
pub fn run(config: OverlayConfig) -> Result<()> {
    let event_loop = EventLoop::<OverlayEvent>::with_user_event()
        .build()
        .context("cannot create event loop")?;
    let mut app = OverlayApp::new(config, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    match app.take_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
