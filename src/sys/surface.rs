//! The window-surface capability: everything the engine needs from the OS,
//! behind one injected trait.
//!
//! The core never holds accessibility handles or window-server connections,
//! only integer window ids. A real backend marshals these calls to the
//! window server; [`SimulatedSurface`] is a deterministic in-memory backend
//! for tests and the CLI driver.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sys::geometry::{Point, Rect};
use crate::sys::screen::ScreenId;

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// An identifier representing a window.
///
/// Only valid for the lifetime of the window-server session that issued it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowId(u32);

impl WindowId {
    pub fn new(id: u32) -> WindowId {
        WindowId(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// The stacking layer of ordinary application windows. Anything else
/// (panels, overlays, the dock) is not tileable.
pub const NORMAL_WINDOW_LAYER: i32 = 0;

/// One window as seen at poll time. Replaced wholesale each cycle; the core
/// only reads and diffs these.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub pid: pid_t,
    pub layer: i32,
    pub frame: Rect,
}

impl WindowSnapshot {
    pub fn is_tileable(&self) -> bool {
        self.layer == NORMAL_WINDOW_LAYER
    }
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("window {0:?} is no longer on screen")]
    WindowGone(WindowId),
    #[error("window server rejected geometry for {0:?}")]
    Rejected(WindowId),
}

pub trait WindowSurface {
    /// All windows currently on the given display. Order is not meaningful.
    fn list_windows(&self, screen: ScreenId) -> Vec<WindowSnapshot>;

    /// Move/resize one window. Best effort; the engine does not retry.
    fn apply_geometry(&mut self, wid: WindowId, frame: Rect) -> Result<(), SurfaceError>;

    /// The window the OS considers focused, if any.
    fn focused_window(&self) -> Option<WindowId>;

    /// Whether a transient UI element (context menu, popover) is open.
    /// Focus-follows behavior is suppressed while one is.
    fn transient_ui_visible(&self) -> bool;

    /// Move the pointer, for cursor-follows-focus.
    fn warp_cursor(&mut self, point: Point);
}

/// In-memory surface with scriptable failures.
#[derive(Default)]
pub struct SimulatedSurface {
    windows: Vec<(ScreenId, WindowSnapshot)>,
    focused: Option<WindowId>,
    cursor: Option<Point>,
    transient_ui: bool,
    rejecting: Vec<WindowId>,
}

impl SimulatedSurface {
    pub fn new() -> SimulatedSurface {
        SimulatedSurface::default()
    }

    pub fn open_window(&mut self, screen: ScreenId, id: WindowId, pid: pid_t, frame: Rect) {
        self.windows.push((
            screen,
            WindowSnapshot {
                id,
                pid,
                layer: NORMAL_WINDOW_LAYER,
                frame,
            },
        ));
    }

    pub fn open_layered_window(
        &mut self,
        screen: ScreenId,
        id: WindowId,
        pid: pid_t,
        layer: i32,
        frame: Rect,
    ) {
        self.windows.push((screen, WindowSnapshot { id, pid, layer, frame }));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.windows.retain(|(_, w)| w.id != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    pub fn set_focused(&mut self, id: Option<WindowId>) {
        self.focused = id;
    }

    pub fn set_transient_ui_visible(&mut self, visible: bool) {
        self.transient_ui = visible;
    }

    /// Make subsequent `apply_geometry` calls for this window fail.
    pub fn reject_geometry_for(&mut self, id: WindowId) {
        self.rejecting.push(id);
    }

    pub fn frame_of(&self, id: WindowId) -> Option<Rect> {
        self.windows.iter().find(|(_, w)| w.id == id).map(|(_, w)| w.frame)
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }
}

impl WindowSurface for SimulatedSurface {
    fn list_windows(&self, screen: ScreenId) -> Vec<WindowSnapshot> {
        self.windows
            .iter()
            .filter(|(s, _)| *s == screen)
            .map(|(_, w)| *w)
            .collect()
    }

    fn apply_geometry(&mut self, wid: WindowId, frame: Rect) -> Result<(), SurfaceError> {
        if self.rejecting.contains(&wid) {
            return Err(SurfaceError::Rejected(wid));
        }
        let Some((_, window)) = self.windows.iter_mut().find(|(_, w)| w.id == wid) else {
            return Err(SurfaceError::WindowGone(wid));
        };
        window.frame = frame;
        Ok(())
    }

    fn focused_window(&self) -> Option<WindowId> {
        self.focused
    }

    fn transient_ui_visible(&self) -> bool {
        self.transient_ui
    }

    fn warp_cursor(&mut self, point: Point) {
        self.cursor = Some(point);
    }
}
