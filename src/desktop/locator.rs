use super::{ICON_VIEW_CLASS, WORKER_SURFACE_CLASS, WindowId, WindowManager};

/// What the enumeration pass found behind the desktop icons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceLocation {
    /// First top-level window that hosts the icon view.
    pub icon_host: Option<WindowId>,
    /// `WorkerW` sibling following the icon host in z-order.
    pub worker_surface: Option<WindowId>,
}

/// Find the icon-hosting window and the worker surface next to it.
///
/// Only the first top-level window with an icon-view child counts; the
/// enumeration is not pulled any further once it is found.
pub fn locate_background_surface<W: WindowManager + ?Sized>(wm: &W) -> SurfaceLocation {
    let icon_host = wm
        .top_level_windows()
        .find(|&candidate| wm.find_window_ex(Some(candidate), None, ICON_VIEW_CLASS).is_some());

    let worker_surface =
        icon_host.and_then(|host| wm.find_window_ex(None, Some(host), WORKER_SURFACE_CLASS));

    SurfaceLocation {
        icon_host,
        worker_surface,
    }
}
