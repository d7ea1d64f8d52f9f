//! Windows platform implementation for the timer window
//!
//! Uses the Win32 API to create a normal overlapped window (title bar, close
//! and minimize buttons) that can be pinned above other windows. Pixels are
//! blitted from a DIB section on every commit.

use std::cell::RefCell;
use std::mem;
use std::ptr;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BeginPaint, BitBlt, CreateCompatibleDC,
    CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject, EndPaint, GetDC, GetStockObject,
    HBITMAP, HBRUSH, HDC, InvalidateRect, PAINTSTRUCT, ReleaseDC, SRCCOPY, SelectObject,
    UpdateWindow, WHITE_BRUSH,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DestroyWindow,
    DispatchMessageW, GetClientRect, HWND_TOPMOST, IDC_ARROW, IsIconic, LoadCursorW, MSG,
    PM_REMOVE, PeekMessageW, RegisterClassExW, SC_MINIMIZE, SW_HIDE, SW_MINIMIZE, SW_RESTORE,
    SW_SHOW, SWP_NOMOVE, SWP_NOSIZE, SetWindowPos, ShowWindow, TranslateMessage, WM_CLOSE,
    WM_DESTROY, WM_PAINT, WM_SYSCOMMAND, WNDCLASSEXW, WINDOW_EX_STYLE, WS_OVERLAPPEDWINDOW,
};
use windows::core::PCWSTR;

use super::{OverlayConfig, OverlayPlatform, PlatformError, SurfaceEvent};

/// `ERROR_CLASS_ALREADY_EXISTS`
const CLASS_ALREADY_EXISTS: i32 = 1410;

thread_local! {
    // The window procedure runs inside DispatchMessageW on the window's own
    // thread, so events are parked here until poll_events drains them
    static PENDING_EVENTS: RefCell<Vec<SurfaceEvent>> = const { RefCell::new(Vec::new()) };
}

fn queue_event(event: SurfaceEvent) {
    PENDING_EVENTS.with(|pending| pending.borrow_mut().push(event));
}

pub struct WindowsOverlay {
    hwnd: HWND,
    hdc_mem: HDC,
    hbitmap: HBITMAP,
    bits: *mut u8,
    width: u32,
    height: u32,
    pixel_data: Vec<u8>, // RGBA from renderer
    shown: bool,
    destroyed: bool,
}

// NOTE: WindowsOverlay does not implement Send. The HWND and its message
// queue belong to the creating thread, so the UI thread builds it itself.

impl WindowsOverlay {
    fn register_class(class_name: &[u16]) -> Result<(), PlatformError> {
        unsafe {
            let hinstance = GetModuleHandleW(None).map_err(|e| {
                PlatformError::ClassRegistration(format!("GetModuleHandleW failed: {}", e))
            })?;

            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                hbrBackground: HBRUSH(GetStockObject(WHITE_BRUSH).0),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            if RegisterClassExW(&wc) == 0 {
                let err = std::io::Error::last_os_error();
                if err.raw_os_error() != Some(CLASS_ALREADY_EXISTS) {
                    return Err(PlatformError::ClassRegistration(format!(
                        "RegisterClassExW failed: {}",
                        err
                    )));
                }
            }
        }
        Ok(())
    }

    fn release_dib_section(&mut self) {
        unsafe {
            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
                self.hdc_mem = HDC::default();
            }
            if !self.hbitmap.is_invalid() {
                let _ = DeleteObject(self.hbitmap);
                self.hbitmap = HBITMAP::default();
            }
        }
        self.bits = ptr::null_mut();
    }

    fn create_dib_section(&mut self) -> Result<(), PlatformError> {
        self.release_dib_section();

        unsafe {
            let hdc_screen = GetDC(HWND::default());

            self.hdc_mem = CreateCompatibleDC(hdc_screen);
            if self.hdc_mem.is_invalid() {
                ReleaseDC(HWND::default(), hdc_screen);
                return Err(PlatformError::BufferError(
                    "CreateCompatibleDC failed".to_string(),
                ));
            }

            let bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: self.width as i32,
                    biHeight: -(self.height as i32), // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };

            let mut bits: *mut std::ffi::c_void = ptr::null_mut();
            let created = CreateDIBSection(hdc_screen, &bmi, DIB_RGB_COLORS, &mut bits, None, 0);
            ReleaseDC(HWND::default(), hdc_screen);
            let hbitmap = created.map_err(|e| {
                PlatformError::BufferError(format!("CreateDIBSection failed: {}", e))
            })?;

            SelectObject(self.hdc_mem, hbitmap);
            self.hbitmap = hbitmap;
            self.bits = bits as *mut u8;
        }

        self.pixel_data
            .resize((self.width * self.height * 4) as usize, 0);
        Ok(())
    }

    /// Pick up size changes made through the window frame
    fn sync_client_size(&mut self, events: &mut Vec<SurfaceEvent>) {
        let mut rect = RECT::default();
        if unsafe { GetClientRect(self.hwnd, &mut rect) }.is_err() {
            return;
        }
        let width = (rect.right - rect.left).max(0) as u32;
        let height = (rect.bottom - rect.top).max(0) as u32;
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }

        let previous = (self.width, self.height);
        self.width = width;
        self.height = height;
        match self.create_dib_section() {
            Ok(()) => events.push(SurfaceEvent::Paint),
            Err(e) => {
                // No DIB now, so paints skip; the next poll retries the resize
                (self.width, self.height) = previous;
                tracing::warn!(error = %e, "Failed to resize DIB section");
            }
        }
    }
}

impl OverlayPlatform for WindowsOverlay {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        let class_name = wide_string(&config.class_name);
        Self::register_class(&class_name)?;

        let hwnd = unsafe {
            let window_name = wide_string(&config.title);
            let hinstance = GetModuleHandleW(None).map_err(|e| {
                PlatformError::WindowCreation(format!("GetModuleHandleW failed: {}", e))
            })?;

            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(window_name.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                config.x.unwrap_or(CW_USEDEFAULT),
                config.y.unwrap_or(CW_USEDEFAULT),
                config.width as i32,
                config.height as i32,
                None,
                None,
                hinstance,
                None,
            )
            .map_err(|e| PlatformError::WindowCreation(format!("CreateWindowExW failed: {}", e)))?
        };

        let mut overlay = Self {
            hwnd,
            hdc_mem: HDC::default(),
            hbitmap: HBITMAP::default(),
            bits: ptr::null_mut(),
            width: config.width,
            height: config.height,
            pixel_data: Vec::new(),
            shown: false,
            destroyed: false,
        };

        // Size the buffer to the client area, not the outer frame
        let mut rect = RECT::default();
        if unsafe { GetClientRect(hwnd, &mut rect) }.is_ok() {
            let width = (rect.right - rect.left).max(1) as u32;
            let height = (rect.bottom - rect.top).max(1) as u32;
            overlay.width = width;
            overlay.height = height;
        }
        overlay.create_dib_section()?;

        tracing::debug!(hwnd = ?hwnd, "Win32 timer window created");
        Ok(overlay)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn show(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOW);
            let _ = UpdateWindow(self.hwnd);
        }
        self.shown = true;
    }

    fn hide(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_HIDE);
        }
        self.shown = false;
    }

    fn pin_topmost(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            let _ = SetWindowPos(self.hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);
        }
    }

    fn minimize(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_MINIMIZE);
        }
    }

    fn restore(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            if IsIconic(self.hwnd).as_bool() {
                let _ = ShowWindow(self.hwnd, SW_RESTORE);
            }
        }
    }

    fn request_redraw(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            let _ = InvalidateRect(self.hwnd, None, true);
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        if self.destroyed || self.bits.is_null() {
            return None;
        }
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        if !self.shown || self.destroyed || self.bits.is_null() {
            return;
        }

        let size = (self.width * self.height * 4) as usize;
        // SAFETY: the DIB section stays alive until release_dib_section and
        // holds exactly width * height 32-bit pixels
        let dib = unsafe { std::slice::from_raw_parts_mut(self.bits, size) };

        // Convert RGBA to BGRA
        for (i, chunk) in self.pixel_data.chunks(4).enumerate() {
            let offset = i * 4;
            if chunk.len() == 4 && offset + 3 < dib.len() {
                dib[offset] = chunk[2];
                dib[offset + 1] = chunk[1];
                dib[offset + 2] = chunk[0];
                dib[offset + 3] = chunk[3];
            }
        }

        unsafe {
            let hdc = GetDC(self.hwnd);
            let _ = BitBlt(
                hdc,
                0,
                0,
                self.width as i32,
                self.height as i32,
                self.hdc_mem,
                0,
                0,
                SRCCOPY,
            );
            ReleaseDC(self.hwnd, hdc);
        }
    }

    fn poll_events(&mut self, events: &mut Vec<SurfaceEvent>) {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        let pending = PENDING_EVENTS.with(|pending| mem::take(&mut *pending.borrow_mut()));
        if pending.contains(&SurfaceEvent::Destroyed) {
            self.destroyed = true;
            self.shown = false;
        } else {
            self.sync_client_size(events);
        }
        events.extend(pending);
    }
}

impl Drop for WindowsOverlay {
    fn drop(&mut self) {
        self.release_dib_section();
        if !self.destroyed && !self.hwnd.is_invalid() {
            unsafe {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

/// Window procedure for the timer window
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            unsafe {
                BeginPaint(hwnd, &mut ps);
                let _ = EndPaint(hwnd, &ps);
            }
            queue_event(SurfaceEvent::Paint);
            LRESULT(0)
        }
        WM_CLOSE => {
            queue_event(SurfaceEvent::CloseRequested);
            LRESULT(0)
        }
        WM_SYSCOMMAND if (wparam.0 as u32 & 0xFFF0) == SC_MINIMIZE => {
            queue_event(SurfaceEvent::MinimizeRequested);
            LRESULT(0)
        }
        WM_DESTROY => {
            queue_event(SurfaceEvent::Destroyed);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Convert a &str to a null-terminated wide string
fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
