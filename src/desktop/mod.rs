//! Desktop shell integration: finding the background surface behind the
//! desktop icons and parenting the overlay window onto it.

pub mod attach;
pub mod bounded;
pub mod locator;

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;

use std::ops::BitOr;
use std::time::Duration;

use crate::error::PlatformError;
use crate::overlay::geometry::{Point, Rect, Size};

pub use attach::{Attachment, DesktopAttacher};
pub use locator::{SurfaceLocation, locate_background_surface};

/// Class name of the desktop host window owned by the shell.
pub const DESKTOP_HOST_CLASS: &str = "Progman";
/// Class name of the icon view that lives inside the icon-hosting window.
pub const ICON_VIEW_CLASS: &str = "SHELLDLL_DefView";
/// Class name of the background surface the host spawns on request.
pub const WORKER_SURFACE_CLASS: &str = "WorkerW";
/// Undocumented message asking the desktop host to spawn its worker surface.
pub const WM_SPAWN_WORKER: u32 = 0x052C;

/// Opaque native window handle, stored as an integer so it can cross threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct WindowId(pub isize);

impl WindowId {
    pub const NULL: WindowId = WindowId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Extended window style bits the overlay cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ExStyle(pub u32);

impl ExStyle {
    /// Click-through: hit testing falls to whatever sits underneath.
    pub const TRANSPARENT: ExStyle = ExStyle(0x0000_0020);
    /// Excluded from alt-tab and the taskbar.
    pub const TOOLWINDOW: ExStyle = ExStyle(0x0000_0080);
    /// Composited with per-pixel alpha.
    pub const LAYERED: ExStyle = ExStyle(0x0008_0000);

    pub fn contains(self, other: ExStyle) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ExStyle {
    type Output = ExStyle;

    fn bitor(self, rhs: ExStyle) -> ExStyle {
        ExStyle(self.0 | rhs.0)
    }
}

/// Where a window goes in the z-order when repositioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZOrder {
    Topmost,
}

/// Outcome of a timeout-bounded message send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The target processed the message.
    Delivered,
    /// The target did not answer within the bound.
    TimedOut,
    /// The send itself failed (invalid handle, hung target).
    Failed,
}

/// The window-manager operations the overlay needs from the OS.
///
/// Everything the attacher and render loop touch natively goes through
/// this trait so the attachment sequence can be driven by a fake in tests.
pub trait WindowManager {
    /// Top-level window by class name.
    fn find_window(&self, class: &str) -> Option<WindowId>;

    /// First window of `class` under `parent` (or among top-level windows
    /// when `parent` is `None`), starting after `after`.
    fn find_window_ex(
        &self,
        parent: Option<WindowId>,
        after: Option<WindowId>,
        class: &str,
    ) -> Option<WindowId>;

    /// Top-level windows in z-order. Consumers may stop early; nothing past
    /// the last item pulled is queried.
    fn top_level_windows(&self) -> Box<dyn Iterator<Item = WindowId> + '_>;

    /// Send `msg` to `target`, giving up after `timeout`.
    fn send_message_timeout(&self, target: WindowId, msg: u32, timeout: Duration) -> SendOutcome;

    fn ex_style(&self, window: WindowId) -> Result<ExStyle, PlatformError>;

    fn set_ex_style(&self, window: WindowId, style: ExStyle) -> Result<(), PlatformError>;

    /// Strip caption and border, leaving a bare popup.
    fn set_borderless(&self, window: WindowId) -> Result<(), PlatformError>;

    /// Move in z-order. `bounds: None` keeps the current position and size.
    fn set_position(
        &self,
        window: WindowId,
        order: ZOrder,
        bounds: Option<Rect>,
    ) -> Result<(), PlatformError>;

    fn set_parent(&self, child: WindowId, parent: WindowId) -> Result<(), PlatformError>;

    /// Hide without waiting for the owning thread.
    fn hide_async(&self, window: WindowId) -> Result<(), PlatformError>;

    /// Extend the compositor frame over the whole client area.
    fn extend_frame_into_client_area(&self, window: WindowId) -> Result<(), PlatformError>;

    fn primary_display_bounds(&self) -> Option<Rect>;

    /// Cursor position relative to the client area of `window`.
    fn cursor_position(&self, window: WindowId) -> Option<Point>;

    fn client_size(&self, window: WindowId) -> Option<Size>;
}
