//! Pushes finished frames to a layered window with per-pixel alpha.

use std::ffi::c_void;
use std::{mem, ptr, slice};

use windows::Win32::Foundation::{COLORREF, HWND, POINT, SIZE};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION, CreateCompatibleDC, CreateDIBSection,
    DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HBITMAP, HDC, HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::UI::WindowsAndMessaging::{ULW_ALPHA, UpdateLayeredWindow};

use super::Present;
use crate::desktop::WindowId;
use crate::desktop::win32::hwnd;
use crate::error::{PlatformError, RenderError};

// ─── Surface ─────────────────────────────────────────────────────────────

/// Owns a memory DC with a top-down 32-bit DIB matching the window size.
pub struct LayeredPresenter {
    hwnd: HWND,
    hdc_mem: HDC,
    bitmap: HBITMAP,
    previous: HGDIOBJ,
    bits: *mut u8,
    width: u32,
    height: u32,
}

impl LayeredPresenter {
    /// Allocate a `width` x `height` surface for `window`.
    ///
    /// The window must carry `WS_EX_LAYERED`; without it every
    /// `UpdateLayeredWindow` call fails.
    pub fn new(window: WindowId, width: u32, height: u32) -> Result<Self, PlatformError> {
        if window.is_null() {
            return Err(PlatformError::NullHandle);
        }
        let mut presenter = Self {
            hwnd: hwnd(window),
            hdc_mem: HDC::default(),
            bitmap: HBITMAP::default(),
            previous: HGDIOBJ::default(),
            bits: ptr::null_mut(),
            width: 0,
            height: 0,
        };
        presenter.create_dib_section(width, height)?;
        Ok(presenter)
    }

    /// (Re)create the memory DC and select a fresh top-down DIB into it.
    fn create_dib_section(&mut self, width: u32, height: u32) -> Result<(), PlatformError> {
        self.release_dib_section();

        unsafe {
            let hdc_screen = GetDC(None);
            self.hdc_mem = CreateCompatibleDC(Some(hdc_screen));
            if self.hdc_mem.is_invalid() {
                ReleaseDC(None, hdc_screen);
                return Err(PlatformError::call("CreateCompatibleDC", "returned null"));
            }

            let bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width as i32,
                    biHeight: -(height as i32), // top-down
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };

            let mut bits: *mut c_void = ptr::null_mut();
            let created =
                CreateDIBSection(Some(hdc_screen), &bmi, DIB_RGB_COLORS, &mut bits, None, 0);
            ReleaseDC(None, hdc_screen);
            let bitmap = created.map_err(|e| PlatformError::call("CreateDIBSection", e))?;

            self.previous = SelectObject(self.hdc_mem, bitmap.into());
            self.bitmap = bitmap;
            self.bits = bits.cast::<u8>();
        }

        self.width = width;
        self.height = height;
        tracing::debug!(width, height, "layered surface allocated");
        Ok(())
    }

    /// Restore the original bitmap and free the DC and DIB. Safe to call
    /// on an empty presenter.
    fn release_dib_section(&mut self) {
        unsafe {
            if !self.hdc_mem.is_invalid() {
                SelectObject(self.hdc_mem, self.previous);
                let _ = DeleteDC(self.hdc_mem);
            }
            if !self.bitmap.is_invalid() {
                let _ = DeleteObject(self.bitmap.into());
            }
        }
        self.hdc_mem = HDC::default();
        self.bitmap = HBITMAP::default();
        self.previous = HGDIOBJ::default();
        self.bits = ptr::null_mut();
    }
}

// ─── Presentation ────────────────────────────────────────────────────────

/// Copies premultiplied RGBA into the DIB as BGRA, then hands it to the
/// compositor with per-pixel alpha.
impl Present for LayeredPresenter {
    fn present(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
        if width != self.width || height != self.height || self.bits.is_null() {
            self.create_dib_section(width, height)?;
        }

        let len = (width as usize) * (height as usize) * 4;
        // SAFETY: the DIB section is `width * height` 32-bit pixels and stays
        // selected into `hdc_mem` until released.
        let bgra = unsafe { slice::from_raw_parts_mut(self.bits, len) };
        for (dst, src) in bgra.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            dst[3] = src[3];
        }

        let size = SIZE {
            cx: width as i32,
            cy: height as i32,
        };
        let pt_src = POINT { x: 0, y: 0 };
        let blend = BLENDFUNCTION {
            BlendOp: 0, // AC_SRC_OVER
            BlendFlags: 0,
            SourceConstantAlpha: 255,
            AlphaFormat: 1, // AC_SRC_ALPHA
        };

        unsafe {
            let hdc_screen = GetDC(None);
            let result = UpdateLayeredWindow(
                self.hwnd,
                Some(hdc_screen),
                None,
                Some(&size),
                Some(self.hdc_mem),
                Some(&pt_src),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );
            ReleaseDC(None, hdc_screen);
            result.map_err(|e| PlatformError::call("UpdateLayeredWindow", e))?;
        }
        Ok(())
    }
}

impl Drop for LayeredPresenter {
    fn drop(&mut self) {
        self.release_dib_section();
    }
}
