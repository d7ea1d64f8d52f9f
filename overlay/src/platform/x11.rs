//! X11 platform implementation for the timer window
//!
//! Uses XCB via x11rb. The window is a normal managed top-level so the window
//! manager provides the title bar, close button and minimize. Pixels are
//! pushed through an MIT-SHM segment.

use std::fs::File;
use std::os::fd::{AsFd, OwnedFd};

use rustix::fs::{MemfdFlags, memfd_create};
use rustix::mm::{MapFlags, ProtFlags, mmap};
use x11rb::atom_manager;
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::shm::{self, ConnectionExt as _};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::{OverlayConfig, OverlayPlatform, PlatformError, SurfaceEvent};

/// ICCCM `IconicState`
const ICONIC_STATE: u32 = 3;
/// EWMH `_NET_WM_STATE_ADD`
const NET_WM_STATE_ADD: u32 = 1;

// Atoms needed for ICCCM/EWMH window management
atom_manager! {
    pub AtomCollection: AtomCollectionCookie {
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        WM_CHANGE_STATE,
        WM_STATE,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_WM_STATE_ABOVE,
        UTF8_STRING,
        ATOM,
    }
}

/// A shared memfd mapping, unmapped on drop
struct ShmMapping {
    ptr: *mut u8,
    len: usize,
}

impl ShmMapping {
    fn new(len: usize) -> Result<(Self, OwnedFd), PlatformError> {
        let fd = memfd_create(c"gentimer-x11-buffer", MemfdFlags::CLOEXEC)
            .map_err(|e| PlatformError::BufferError(format!("memfd_create failed: {}", e)))?;

        rustix::fs::ftruncate(&fd, len as u64)
            .map_err(|e| PlatformError::BufferError(format!("ftruncate failed: {}", e)))?;

        // SAFETY: fresh mapping of a memfd we own, sized above
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                fd.as_fd(),
                0,
            )
            .map_err(|e| PlatformError::BufferError(format!("mmap failed: {}", e)))?
        };

        Ok((
            Self {
                ptr: ptr as *mut u8,
                len,
            },
            fd,
        ))
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: the mapping is live and `len` bytes long until drop
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for ShmMapping {
    fn drop(&mut self) {
        // SAFETY: ptr/len come from the mmap in ShmMapping::new
        unsafe {
            rustix::mm::munmap(self.ptr as *mut _, self.len).ok();
        }
    }
}

/// SHM buffer for efficient pixel transfer
struct ShmBuffer {
    seg_id: shm::Seg,
    mapping: ShmMapping,
}

/// Build a replacement with `create` and swap it into `slot`, returning the
/// old value. On failure `slot` is left as it was.
fn replace_with<T>(
    slot: &mut T,
    create: impl FnOnce() -> Result<T, PlatformError>,
) -> Result<T, PlatformError> {
    let next = create()?;
    Ok(std::mem::replace(slot, next))
}

/// Fold an ICCCM `WM_STATE` value into `iconified`. Returns true when the
/// window manager has just iconified a shown window. Our own unmaps end in
/// Withdrawn (or a deleted property), never Iconic.
fn note_wm_state(iconified: &mut bool, shown: bool, state: Option<u32>) -> bool {
    let iconic = state == Some(ICONIC_STATE);
    let entered = iconic && shown && !*iconified;
    *iconified = iconic;
    entered
}

pub struct X11Overlay {
    conn: RustConnection,
    window: Window,
    root: Window,
    gc: Gcontext,
    atoms: AtomCollection,
    width: u32,
    height: u32,
    depth: u8,

    // Pixel buffers
    pixel_data: Vec<u8>, // RGBA from renderer
    shm_buffer: ShmBuffer,

    shown: bool,
    iconified: bool,
    destroyed: bool,
    redraw_pending: bool,
}

impl X11Overlay {
    /// Create a shared memory buffer for efficient pixel transfer
    fn create_shm_buffer(
        conn: &RustConnection,
        width: u32,
        height: u32,
    ) -> Result<ShmBuffer, PlatformError> {
        let (mapping, fd) = ShmMapping::new((width * height * 4) as usize)?;

        let seg_id = conn
            .generate_id()
            .map_err(|e| PlatformError::BufferError(e.to_string()))?;

        // x11rb shm_attach_fd takes ownership of the fd
        let file = File::from(fd);
        conn.shm_attach_fd(seg_id, file, false)
            .map_err(|e| PlatformError::BufferError(format!("shm_attach_fd failed: {}", e)))?;

        Ok(ShmBuffer { seg_id, mapping })
    }

    /// Move to a new size after the window manager resized us. The old
    /// buffer and size stay in place if the new buffer cannot be built.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), PlatformError> {
        let conn = &self.conn;
        let old = replace_with(&mut self.shm_buffer, || {
            Self::create_shm_buffer(conn, width, height)
        })?;
        let _ = self.conn.shm_detach(old.seg_id);
        drop(old);

        self.width = width;
        self.height = height;
        self.pixel_data.resize((width * height * 4) as usize, 0);
        Ok(())
    }

    /// Read ICCCM `WM_STATE`, None when it is absent
    fn read_wm_state(&self) -> Option<u32> {
        let reply = self
            .conn
            .get_property(false, self.window, self.atoms.WM_STATE, self.atoms.WM_STATE, 0, 2)
            .ok()?
            .reply()
            .ok()?;
        reply.value32()?.next()
    }

    /// Title, class and protocols
    fn setup_window_properties(&self, config: &OverlayConfig) -> Result<(), PlatformError> {
        let err = |e: x11rb::errors::ConnectionError| PlatformError::WindowCreation(e.to_string());

        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                config.title.as_bytes(),
            )
            .map_err(err)?;
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_NAME,
                self.atoms.UTF8_STRING,
                config.title.as_bytes(),
            )
            .map_err(err)?;

        let class = format!("{0}\0{0}\0", config.class_name);
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                class.as_bytes(),
            )
            .map_err(err)?;

        // Route the close button to us instead of killing the connection
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms.WM_PROTOCOLS,
                self.atoms.ATOM,
                &[self.atoms.WM_DELETE_WINDOW],
            )
            .map_err(err)?;

        Ok(())
    }

    /// Send a client message to the root window for the window manager
    fn send_wm_message(&self, message_type: Atom, data: [u32; 5]) {
        let event = ClientMessageEvent::new(32, self.window, message_type, data);
        let _ = self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        );
        let _ = self.conn.flush();
    }

    fn handle_event(&mut self, event: Event, events: &mut Vec<SurfaceEvent>) {
        match event {
            Event::Expose(e) if e.window == self.window && e.count == 0 => {
                self.redraw_pending = true;
            }
            Event::ConfigureNotify(e) if e.window == self.window => {
                let (width, height) = (e.width as u32, e.height as u32);
                if width > 0 && height > 0 && (width != self.width || height != self.height) {
                    match self.resize(width, height) {
                        Ok(()) => self.redraw_pending = true,
                        Err(e) => tracing::warn!(
                            error = %e,
                            width,
                            height,
                            "Failed to resize X11 pixel buffer, keeping previous size"
                        ),
                    }
                }
            }
            Event::ClientMessage(e)
                if e.window == self.window
                    && e.format == 32
                    && e.type_ == self.atoms.WM_PROTOCOLS
                    && e.data.as_data32()[0] == self.atoms.WM_DELETE_WINDOW =>
            {
                events.push(SurfaceEvent::CloseRequested);
            }
            Event::PropertyNotify(e)
                if e.window == self.window && e.atom == self.atoms.WM_STATE =>
            {
                let state = if e.state == Property::DELETE {
                    None
                } else {
                    self.read_wm_state()
                };
                if note_wm_state(&mut self.iconified, self.shown, state) {
                    events.push(SurfaceEvent::MinimizeRequested);
                }
            }
            Event::DestroyNotify(e) if e.window == self.window => {
                self.destroyed = true;
                self.shown = false;
                events.push(SurfaceEvent::Destroyed);
            }
            _ => {}
        }
    }
}

impl OverlayPlatform for X11Overlay {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| PlatformError::ConnectionFailed(e.to_string()))?;

        let atoms = AtomCollection::new(&conn)
            .map_err(|e| PlatformError::Other(e.to_string()))?
            .reply()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        conn.shm_query_version()
            .map_err(|_| PlatformError::UnsupportedFeature("SHM extension".into()))?
            .reply()
            .map_err(|_| PlatformError::UnsupportedFeature("SHM extension".into()))?;

        let setup = conn.setup();
        let screen = &setup.roots[screen_num];
        let root = screen.root;
        let depth = screen.root_depth;
        let visual = screen.root_visual;
        let white = screen.white_pixel;

        let window = conn
            .generate_id()
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let win_aux = CreateWindowAux::new()
            .background_pixel(white)
            .event_mask(
                EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY | EventMask::PROPERTY_CHANGE,
            );

        conn.create_window(
            depth,
            window,
            root,
            config.x.unwrap_or(0) as i16,
            config.y.unwrap_or(0) as i16,
            config.width as u16,
            config.height as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            &win_aux,
        )
        .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let gc = conn
            .generate_id()
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;
        conn.create_gc(gc, window, &CreateGCAux::new())
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let shm_buffer = Self::create_shm_buffer(&conn, config.width, config.height)?;

        let overlay = Self {
            conn,
            window,
            root,
            gc,
            atoms,
            width: config.width,
            height: config.height,
            depth,
            pixel_data: vec![0u8; (config.width * config.height * 4) as usize],
            shm_buffer,
            shown: false,
            iconified: false,
            destroyed: false,
            redraw_pending: false,
        };

        overlay.setup_window_properties(&config)?;
        overlay
            .conn
            .flush()
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        tracing::debug!(window = overlay.window, "X11 timer window created");
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
        // Initial state hint, honored by the WM when it maps us
        let _ = self.conn.change_property32(
            PropMode::REPLACE,
            self.window,
            self.atoms._NET_WM_STATE,
            self.atoms.ATOM,
            &[self.atoms._NET_WM_STATE_ABOVE],
        );
        let _ = self.conn.map_window(self.window);
        let _ = self.conn.flush();
        self.shown = true;
        self.iconified = false;
    }

    fn hide(&mut self) {
        if self.destroyed {
            return;
        }
        self.shown = false;
        let _ = self.conn.unmap_window(self.window);
        let _ = self.conn.flush();
    }

    fn pin_topmost(&mut self) {
        if self.destroyed {
            return;
        }
        self.send_wm_message(
            self.atoms._NET_WM_STATE,
            [NET_WM_STATE_ADD, self.atoms._NET_WM_STATE_ABOVE, 0, 1, 0],
        );
        let _ = self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        );
        let _ = self.conn.flush();
    }

    fn minimize(&mut self) {
        // The WM iconifies before we hear about it; only ask when still mapped
        if self.destroyed || self.iconified {
            return;
        }
        self.send_wm_message(self.atoms.WM_CHANGE_STATE, [ICONIC_STATE, 0, 0, 0, 0]);
    }

    fn restore(&mut self) {
        if self.destroyed || !self.iconified {
            return;
        }
        let _ = self.conn.map_window(self.window);
        let _ = self.conn.flush();
        self.iconified = false;
    }

    fn request_redraw(&mut self) {
        self.redraw_pending = true;
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.shown = false;
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.flush();
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        if self.destroyed {
            return None;
        }
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        if !self.shown || self.destroyed {
            return;
        }

        let shm_slice = self.shm_buffer.mapping.as_mut_slice();

        // Convert RGBA to BGRA directly into SHM buffer
        for (i, chunk) in self.pixel_data.chunks(4).enumerate() {
            let offset = i * 4;
            if chunk.len() == 4 && offset + 3 < shm_slice.len() {
                shm_slice[offset] = chunk[2];
                shm_slice[offset + 1] = chunk[1];
                shm_slice[offset + 2] = chunk[0];
                shm_slice[offset + 3] = chunk[3];
            }
        }

        let _ = self.conn.shm_put_image(
            self.window,
            self.gc,
            self.width as u16,
            self.height as u16,
            0,
            0,
            self.width as u16,
            self.height as u16,
            0,
            0,
            self.depth,
            ImageFormat::Z_PIXMAP.into(),
            false,
            self.shm_buffer.seg_id,
            0,
        );
        let _ = self.conn.flush();
    }

    fn poll_events(&mut self, events: &mut Vec<SurfaceEvent>) {
        loop {
            match self.conn.poll_for_event() {
                Ok(Some(event)) => self.handle_event(event, events),
                Ok(None) => break,
                Err(e) => {
                    if !self.destroyed {
                        tracing::error!(error = %e, "Lost connection to X server");
                        self.destroyed = true;
                        self.shown = false;
                        events.push(SurfaceEvent::Destroyed);
                    }
                    return;
                }
            }
        }

        if self.redraw_pending && !self.destroyed {
            self.redraw_pending = false;
            events.push(SurfaceEvent::Paint);
        }
    }
}

impl Drop for X11Overlay {
    fn drop(&mut self) {
        let _ = self.conn.shm_detach(self.shm_buffer.seg_id);
        if !self.destroyed {
            let _ = self.conn.destroy_window(self.window);
        }
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.flush();
    }
}
