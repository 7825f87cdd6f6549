use tracing::{debug, info, warn};

use super::bounded::call_with_timeout;
use super::locator::locate_background_surface;
use super::{
    DESKTOP_HOST_CLASS, ExStyle, SendOutcome, WM_SPAWN_WORKER, WindowId, WindowManager, ZOrder,
};
use crate::config::AttachConfig;
use crate::error::{AttachError, PlatformError};
use crate::overlay::geometry::Rect;

/// Result of attaching the overlay to the desktop background layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Desktop host the overlay is now parented onto.
    pub host: WindowId,
    /// First top-level window hosting the desktop icon view.
    pub icon_host: Option<WindowId>,
    /// Background worker surface; hidden, never drawn on.
    pub worker_surface: Option<WindowId>,
    pub spawn: SendOutcome,
    /// Overlay bounds applied from the primary display.
    pub bounds: Option<Rect>,
    /// Every restyle and reparent call succeeded.
    pub styled: bool,
}

impl Attachment {
    /// The overlay may be floating as an ordinary top-most window.
    pub fn is_degraded(&self) -> bool {
        self.worker_surface.is_none() || !self.styled
    }
}

/// Runs the one-shot attachment sequence against a window manager.
pub struct DesktopAttacher<W> {
    wm: W,
    config: AttachConfig,
}

impl<W> DesktopAttacher<W>
where
    W: WindowManager + Clone + Send + 'static,
{
    pub fn new(wm: W, config: AttachConfig) -> Self {
        Self { wm, config }
    }

    /// Parent `overlay` onto the desktop host and make it a click-through,
    /// task-switcher-invisible background surface.
    ///
    /// Only a missing desktop host is an error. Every later failure is
    /// logged and reported through [`Attachment`].
    pub fn attach(&self, overlay: WindowId) -> Result<Attachment, AttachError> {
        let host = self
            .wm
            .find_window(DESKTOP_HOST_CLASS)
            .ok_or(AttachError::HostNotFound {
                class: DESKTOP_HOST_CLASS,
            })?;
        debug!(?host, "found desktop host");

        let spawn = self.spawn_worker(host);

        let location = locate_background_surface(&self.wm);
        match location.icon_host {
            Some(icon_host) => debug!(?icon_host, "found icon host"),
            None => warn!("no window hosts the desktop icon view; overlay will not sit behind icons"),
        }

        match location.worker_surface {
            Some(surface) => {
                debug!(?surface, "hiding worker surface");
                self.best_effort("hide worker surface", self.wm.hide_async(surface));
            }
            None => warn!("worker surface not found; attachment is degraded"),
        }

        let mut styled = true;
        let bounds = self.wm.primary_display_bounds();
        if bounds.is_none() {
            warn!("primary display bounds unavailable; keeping current overlay size");
        }

        styled &= self.best_effort("remove border", self.wm.set_borderless(overlay));
        styled &= self.best_effort(
            "size to primary display",
            self.wm.set_position(overlay, ZOrder::Topmost, bounds),
        );
        styled &= self.best_effort("reparent onto desktop host", self.wm.set_parent(overlay, host));
        styled &= self.best_effort("apply extended style", self.apply_ex_style(overlay));
        styled &= self.best_effort(
            "extend frame",
            self.wm.extend_frame_into_client_area(overlay),
        );
        styled &= self.best_effort(
            "raise to top-most",
            self.wm.set_position(overlay, ZOrder::Topmost, None),
        );

        let attachment = Attachment {
            host,
            icon_host: location.icon_host,
            worker_surface: location.worker_surface,
            spawn,
            bounds,
            styled,
        };
        if attachment.is_degraded() {
            warn!(?attachment, "overlay attached in degraded mode");
        } else {
            info!(?host, ?overlay, "overlay attached to desktop background");
        }
        Ok(attachment)
    }

    /// Ask the host to create its worker surface, waiting no longer than the
    /// configured bound even if the native call itself hangs.
    fn spawn_worker(&self, host: WindowId) -> SendOutcome {
        let timeout = self.config.spawn_timeout;
        let wm = self.wm.clone();
        let outcome = call_with_timeout(timeout, move || {
            wm.send_message_timeout(host, WM_SPAWN_WORKER, timeout)
        })
        .unwrap_or(SendOutcome::TimedOut);

        if outcome != SendOutcome::Delivered {
            warn!(?outcome, ?timeout, "desktop host did not confirm worker spawn; continuing");
        }
        outcome
    }

    fn apply_ex_style(&self, overlay: WindowId) -> Result<(), PlatformError> {
        // Layered is always needed: frames are presented with UpdateLayeredWindow.
        let mut style = self.wm.ex_style(overlay)? | ExStyle::TOOLWINDOW | ExStyle::LAYERED;
        if !self.config.clickable {
            style = style | ExStyle::TRANSPARENT;
        }
        self.wm.set_ex_style(overlay, style)
    }

    fn best_effort(&self, step: &str, result: Result<(), PlatformError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(step, "attachment step failed: {e}");
                false
            }
        }
    }
}
