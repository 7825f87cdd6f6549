//! Notification-area icon whose context menu offers "Exit".

use std::mem;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    NIF_ICON, NIF_INFO, NIF_MESSAGE, NIF_TIP, NIIF_INFO, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
    Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, GetCursorPos, GetMessageW, IDI_QUESTION, LoadIconW, MF_STRING,
    MSG, PostMessageW, PostQuitMessage, RegisterClassW, SetForegroundWindow, TPM_RETURNCMD, TPM_RIGHTBUTTON,
    TrackPopupMenuEx, TranslateMessage, WINDOW_EX_STYLE, WINDOW_STYLE, WM_APP, WM_CLOSE, WM_DESTROY,
    WM_RBUTTONUP, WNDCLASSW,
};
use windows::core::PCWSTR;

use crate::desktop::WindowId;
use crate::desktop::win32::{hwnd as native, wide_string, window_id};
use crate::error::PlatformError;

const APP_NAME: &str = "SystemInfoWallpaper";
const TRAY_CLASS: &str = "SystemInfoWallpaperTray";

/// Callback message the shell sends for mouse activity on the icon.
const WM_TRAY: u32 = WM_APP + 1;
const TRAY_ICON_ID: u32 = 1;
const MENU_EXIT: usize = 1;

type ExitHandler = Box<dyn FnMut() + Send>;

/// Invoked once when the user picks "Exit".
static ON_EXIT: OnceLock<Mutex<Option<ExitHandler>>> = OnceLock::new();

// ─── Icon data ───────────────────────────────────────────────────────────

/// Copy `text` into a fixed-size, null-terminated UTF-16 field.
fn fill_wide<const N: usize>(field: &mut [u16; N], text: &str) {
    for (slot, unit) in field
        .iter_mut()
        .zip(text.encode_utf16().take(N.saturating_sub(1)).chain(std::iter::once(0)))
    {
        *slot = unit;
    }
}

/// The identifying part of the icon record, shared by add and delete.
fn icon_data(hwnd: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_ICON_ID,
        ..Default::default()
    }
}

/// Add the icon with its tooltip and the "now running" balloon.
unsafe fn add_icon(hwnd: HWND) -> Result<(), PlatformError> {
    let mut data = icon_data(hwnd);
    data.uFlags = NIF_MESSAGE | NIF_ICON | NIF_TIP | NIF_INFO;
    data.uCallbackMessage = WM_TRAY;
    data.hIcon = unsafe { LoadIconW(None, IDI_QUESTION) }.unwrap_or_default();
    data.dwInfoFlags = NIIF_INFO;
    fill_wide(&mut data.szTip, APP_NAME);
    fill_wide(&mut data.szInfoTitle, APP_NAME);
    fill_wide(&mut data.szInfo, &format!("{APP_NAME} is now running"));

    if unsafe { Shell_NotifyIconW(NIM_ADD, &data) }.as_bool() {
        Ok(())
    } else {
        Err(PlatformError::call("Shell_NotifyIconW", "NIM_ADD rejected"))
    }
}

/// Remove the icon; without this it lingers until the user hovers it.
unsafe fn remove_icon(hwnd: HWND) {
    let data = icon_data(hwnd);
    let _ = unsafe { Shell_NotifyIconW(NIM_DELETE, &data) };
}

// ─── Context menu ────────────────────────────────────────────────────────

/// Show the context menu at the cursor and return the chosen command.
unsafe fn track_menu(hwnd: HWND) -> Option<usize> {
    unsafe {
        let menu = CreatePopupMenu().ok()?;
        let label = wide_string("Exit");
        if AppendMenuW(menu, MF_STRING, MENU_EXIT, PCWSTR(label.as_ptr())).is_err() {
            let _ = DestroyMenu(menu);
            return None;
        }

        let mut pt = POINT::default();
        let _ = GetCursorPos(&mut pt);
        // Without foreground the menu does not close on outside clicks.
        let _ = SetForegroundWindow(hwnd);
        let chosen = TrackPopupMenuEx(
            menu,
            (TPM_RIGHTBUTTON | TPM_RETURNCMD).0,
            pt.x,
            pt.y,
            hwnd,
            None,
        );
        let _ = DestroyMenu(menu);
        (chosen.0 != 0).then_some(chosen.0 as usize)
    }
}

/// Run the registered exit handler, at most once.
fn fire_exit() {
    let Some(slot) = ON_EXIT.get() else {
        return;
    };
    let handler = slot
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .take();
    if let Some(mut handler) = handler {
        handler();
    }
}

// ─── Window procedure ────────────────────────────────────────────────────

/// Window procedure for the hidden tray window.
///
/// * `WM_TRAY` with a right-button release: show the menu; "Exit" runs the
///   handler and destroys the window.
/// * `WM_DESTROY`: remove the icon and end the message loop.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        match msg {
            WM_TRAY if (lparam.0 as u32 & 0xFFFF) == WM_RBUTTONUP => {
                if track_menu(hwnd) == Some(MENU_EXIT) {
                    tracing::info!("exit requested from tray menu");
                    fire_exit();
                    let _ = DestroyWindow(hwnd);
                }
                LRESULT(0)
            }
            WM_DESTROY => {
                remove_icon(hwnd);
                PostQuitMessage(0);
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

// ─── Thread ──────────────────────────────────────────────────────────────

/// Register the class, create the hidden window, add the icon and pump
/// messages until the window is destroyed. Sends the window id through
/// `ready` once the icon is visible.
fn run_tray(ready: mpsc::Sender<WindowId>) -> Result<(), PlatformError> {
    unsafe {
        let hinstance =
            GetModuleHandleW(None).map_err(|e| PlatformError::call("GetModuleHandleW", e))?;
        let class_name = wide_string(TRAY_CLASS);

        let wc = WNDCLASSW {
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            return Err(PlatformError::call("RegisterClassW", "returned 0"));
        }

        let title = wide_string(APP_NAME);
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WINDOW_STYLE(0),
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
        .map_err(|e| PlatformError::call("CreateWindowExW", e))?;

        if let Err(e) = add_icon(hwnd) {
            let _ = DestroyWindow(hwnd);
            return Err(e);
        }
        tracing::debug!("tray icon added");
        let _ = ready.send(window_id(hwnd));

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        Ok(())
    }
}

// ─── Handle ──────────────────────────────────────────────────────────────

/// Running tray icon. Dropping it removes the icon and joins the thread.
pub struct Tray {
    window: Option<WindowId>,
    thread: Option<JoinHandle<()>>,
}

impl Tray {
    /// Ask the tray window to close; its `WM_DESTROY` removes the icon.
    pub fn close(&mut self) {
        if let Some(window) = self.window.take() {
            let _ = unsafe { PostMessageW(Some(native(window)), WM_CLOSE, WPARAM(0), LPARAM(0)) };
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Tray {
    fn drop(&mut self) {
        self.close();
    }
}

/// Start the tray icon on its own thread. `on_exit` runs once, on the tray
/// thread, when the user picks "Exit".
pub fn spawn_tray<F>(on_exit: F) -> std::io::Result<Tray>
where
    F: FnMut() + Send + 'static,
{
    let slot = ON_EXIT.get_or_init(|| Mutex::new(None));
    *slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Box::new(on_exit));

    let (ready_tx, ready_rx) = mpsc::channel();
    let thread = thread::Builder::new().name("tray".into()).spawn(move || {
        if let Err(e) = run_tray(ready_tx) {
            tracing::error!("tray icon unavailable: {e}");
        }
    })?;

    // A failing thread drops the sender, which ends this wait early.
    let window = ready_rx.recv_timeout(Duration::from_secs(2)).ok();
    Ok(Tray {
        window,
        thread: window.is_some().then_some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_wide_truncates_and_terminates() {
        let mut field = [0xFFFFu16; 4];
        fill_wide(&mut field, "abcdef");
        assert_eq!(field, [97, 98, 99, 0]);

        let mut field = [0xFFFFu16; 6];
        fill_wide(&mut field, "ab");
        assert_eq!(&field[..3], &[97, 98, 0]);
    }

    #[test]
    fn close_removes_icon_and_joins_thread() {
        let mut tray = spawn_tray(|| {}).unwrap();
        tray.close();
        assert!(tray.window.is_none());
        assert!(tray.thread.is_none());
        // closing twice is harmless
        tray.close();
    }
}
