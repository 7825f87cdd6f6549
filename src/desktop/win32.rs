use std::ffi::c_void;
use std::time::Duration;

use windows::Win32::Foundation::{
    ERROR_TIMEOUT, GetLastError, HWND, LPARAM, POINT, RECT, WPARAM,
};
use windows::Win32::Graphics::Dwm::DwmExtendFrameIntoClientArea;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromPoint, ScreenToClient,
};
use windows::Win32::UI::Controls::MARGINS;
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, FindWindowW, GW_HWNDNEXT, GWL_EXSTYLE, GWL_STYLE, GetClientRect, GetCursorPos,
    GetTopWindow, GetWindow, GetWindowLongPtrW, HWND_TOPMOST, SMTO_ABORTIFHUNG, SMTO_NORMAL,
    SW_HIDE, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    SWP_NOZORDER, SendMessageTimeoutW, SetParent, SetWindowLongPtrW, SetWindowPos,
    ShowWindowAsync, WS_BORDER, WS_CAPTION, WS_DLGFRAME, WS_MAXIMIZEBOX, WS_MINIMIZEBOX, WS_POPUP,
    WS_SYSMENU, WS_THICKFRAME,
};
use windows::core::PCWSTR;

use super::{ExStyle, SendOutcome, WindowId, WindowManager, ZOrder};
use crate::error::PlatformError;
use crate::overlay::geometry::{Point, Rect, Size};

// ─── Handle conversion ───────────────────────────────────────────────────

/// Native handle for a [`WindowId`].
pub fn hwnd(id: WindowId) -> HWND {
    HWND(id.0 as *mut c_void)
}

/// Portable id for a native handle; the pointer value is kept as-is.
pub fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as isize)
}

/// Convert a &str to a null-terminated wide string
pub fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn non_null(handle: HWND) -> Option<WindowId> {
    (!handle.is_invalid()).then(|| window_id(handle))
}

/// Reject null ids before they reach an API that would act on the desktop.
fn checked(id: WindowId) -> Result<HWND, PlatformError> {
    if id.is_null() {
        Err(PlatformError::NullHandle)
    } else {
        Ok(hwnd(id))
    }
}

// ─── Enumeration ─────────────────────────────────────────────────────────

/// The live Win32 window manager.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32WindowManager;

/// Walks top-level windows in z-order, one `GetWindow` call per item.
struct TopLevelWindows {
    current: Option<HWND>,
    started: bool,
}

impl Iterator for TopLevelWindows {
    type Item = WindowId;

    fn next(&mut self) -> Option<WindowId> {
        let next = if self.started {
            let current = self.current?;
            unsafe { GetWindow(current, GW_HWNDNEXT) }.ok()
        } else {
            self.started = true;
            unsafe { GetTopWindow(None) }.ok()
        };
        self.current = next.filter(|h| !h.is_invalid());
        self.current.map(window_id)
    }
}

// ─── Window manager ──────────────────────────────────────────────────────

impl WindowManager for Win32WindowManager {
    fn find_window(&self, class: &str) -> Option<WindowId> {
        let class = wide_string(class);
        unsafe { FindWindowW(PCWSTR(class.as_ptr()), PCWSTR::null()) }
            .ok()
            .and_then(non_null)
    }

    fn find_window_ex(
        &self,
        parent: Option<WindowId>,
        after: Option<WindowId>,
        class: &str,
    ) -> Option<WindowId> {
        let class = wide_string(class);
        unsafe {
            FindWindowExW(
                parent.map(hwnd),
                after.map(hwnd),
                PCWSTR(class.as_ptr()),
                PCWSTR::null(),
            )
        }
        .ok()
        .and_then(non_null)
    }

    fn top_level_windows(&self) -> Box<dyn Iterator<Item = WindowId> + '_> {
        Box::new(TopLevelWindows {
            current: None,
            started: false,
        })
    }

    /// `SMTO_ABORTIFHUNG` returns at once for a host already marked hung;
    /// otherwise the call waits at most `timeout`.
    fn send_message_timeout(&self, target: WindowId, msg: u32, timeout: Duration) -> SendOutcome {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let mut result = 0usize;
        let sent = unsafe {
            SendMessageTimeoutW(
                hwnd(target),
                msg,
                WPARAM(0),
                LPARAM(0),
                SMTO_NORMAL | SMTO_ABORTIFHUNG,
                millis,
                Some(&mut result),
            )
        };
        if sent.0 != 0 {
            SendOutcome::Delivered
        } else if unsafe { GetLastError() } == ERROR_TIMEOUT {
            SendOutcome::TimedOut
        } else {
            SendOutcome::Failed
        }
    }

    fn ex_style(&self, window: WindowId) -> Result<ExStyle, PlatformError> {
        let hwnd = checked(window)?;
        let bits = unsafe { GetWindowLongPtrW(hwnd, GWL_EXSTYLE) };
        Ok(ExStyle(bits as u32))
    }

    fn set_ex_style(&self, window: WindowId, style: ExStyle) -> Result<(), PlatformError> {
        let hwnd = checked(window)?;
        unsafe { SetWindowLongPtrW(hwnd, GWL_EXSTYLE, style.0 as isize) };
        Ok(())
    }

    /// Strip caption, frame and system-menu bits, then force a frame
    /// recalculation so the change is visible.
    fn set_borderless(&self, window: WindowId) -> Result<(), PlatformError> {
        let hwnd = checked(window)?;
        let chrome = WS_CAPTION
            | WS_THICKFRAME
            | WS_BORDER
            | WS_DLGFRAME
            | WS_SYSMENU
            | WS_MINIMIZEBOX
            | WS_MAXIMIZEBOX;
        unsafe {
            let style = GetWindowLongPtrW(hwnd, GWL_STYLE) as u32;
            let style = (style & !chrome.0) | WS_POPUP.0;
            SetWindowLongPtrW(hwnd, GWL_STYLE, style as isize);
            SetWindowPos(
                hwnd,
                None,
                0,
                0,
                0,
                0,
                SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
            .map_err(|e| PlatformError::call("SetWindowPos", e))
        }
    }

    fn set_position(
        &self,
        window: WindowId,
        order: ZOrder,
        bounds: Option<Rect>,
    ) -> Result<(), PlatformError> {
        let hwnd = checked(window)?;
        let insert_after = match order {
            ZOrder::Topmost => HWND_TOPMOST,
        };
        let (rect, flags) = match bounds {
            Some(b) => (b, SWP_NOACTIVATE),
            None => (Rect::default(), SWP_NOSIZE | SWP_NOMOVE),
        };
        unsafe {
            SetWindowPos(
                hwnd,
                Some(insert_after),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                flags,
            )
        }
        .map_err(|e| PlatformError::call("SetWindowPos", e))
    }

    fn set_parent(&self, child: WindowId, parent: WindowId) -> Result<(), PlatformError> {
        let child = checked(child)?;
        let parent = checked(parent)?;
        unsafe { SetParent(child, Some(parent)) }
            .map(|_| ())
            .map_err(|e| PlatformError::call("SetParent", e))
    }

    fn hide_async(&self, window: WindowId) -> Result<(), PlatformError> {
        let hwnd = checked(window)?;
        if unsafe { ShowWindowAsync(hwnd, SW_HIDE) }.as_bool() {
            Ok(())
        } else {
            Err(PlatformError::call("ShowWindowAsync", "not posted"))
        }
    }

    fn extend_frame_into_client_area(&self, window: WindowId) -> Result<(), PlatformError> {
        let hwnd = checked(window)?;
        // Negative margins extend the frame over the whole window.
        let margins = MARGINS {
            cxLeftWidth: -1,
            cxRightWidth: -1,
            cyTopHeight: -1,
            cyBottomHeight: -1,
        };
        unsafe { DwmExtendFrameIntoClientArea(hwnd, &margins) }
            .map_err(|e| PlatformError::call("DwmExtendFrameIntoClientArea", e))
    }

    /// Full bounds (not the work area) of the monitor holding the origin.
    fn primary_display_bounds(&self) -> Option<Rect> {
        unsafe {
            let monitor = MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !GetMonitorInfoW(monitor, &mut info).as_bool() {
                return None;
            }
            let rc = info.rcMonitor;
            Some(Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top))
        }
    }

    fn cursor_position(&self, window: WindowId) -> Option<Point> {
        let hwnd = checked(window).ok()?;
        let mut pt = POINT::default();
        unsafe {
            GetCursorPos(&mut pt).ok()?;
            if !ScreenToClient(hwnd, &mut pt).as_bool() {
                return None;
            }
        }
        Some(Point::new(pt.x, pt.y))
    }

    fn client_size(&self, window: WindowId) -> Option<Size> {
        let hwnd = checked(window).ok()?;
        let mut rc = RECT::default();
        unsafe { GetClientRect(hwnd, &mut rc) }.ok()?;
        Some(Size::new(rc.right - rc.left, rc.bottom - rc.top))
    }
}
