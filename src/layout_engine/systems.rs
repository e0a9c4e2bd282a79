use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::common::config::GapSettings;
use crate::layout_engine::error::LayoutError;
use crate::layout_engine::{Direction, SpaceMode, SplitAxis};
use crate::sys::geometry::Rect;
use crate::sys::surface::WindowId;

/// Target selection for an insertion, resolved by the engine from the
/// current mark/focus state. `target = None` means "descend from the root".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InsertHint {
    pub target: Option<WindowId>,
    pub axis: Option<SplitAxis>,
    pub ratio: Option<f64>,
}

/// What removing a window did to the structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalOutcome {
    /// The window that should take focus, if the structure has one.
    pub next_focus: Option<WindowId>,
    /// The structure no longer tracks any window.
    pub emptied: bool,
}

/// One space's layout structure. Implementations own their nodes and keep
/// every node rectangle current; the engine only reads frames back out and
/// forwards them to the window surface.
#[enum_dispatch]
pub trait LayoutSystem {
    fn mode(&self) -> SpaceMode;

    fn window_count(&self) -> usize;

    fn contains_window(&self, wid: WindowId) -> bool;

    /// Tracked windows in traversal order (in-order leaves / chain order).
    fn windows(&self) -> Vec<WindowId>;

    fn first_window(&self) -> Option<WindowId>;

    fn last_window(&self) -> Option<WindowId>;

    /// Admits a window. Returns false if it is already tracked or the mode
    /// does not tile.
    fn insert_window(&mut self, wid: WindowId, hint: InsertHint) -> bool;

    /// Assigns the window to an existing vacant placeholder, if one exists
    /// (pre-order search). No structural change. Tried before the split
    /// policy, so a pending mark survives it.
    fn insert_into_vacant_slot(&mut self, wid: WindowId) -> bool;

    /// Evicts a window, promoting/relinking around it. `None` on a miss.
    fn remove_window(&mut self, wid: WindowId) -> Option<RemovalOutcome>;

    /// The adjacent window in traversal order, or `None` at the boundary.
    fn neighbor(&self, wid: WindowId, direction: Direction) -> Option<WindowId>;

    /// Exchanges two windows' positions without changing structure shape.
    fn swap_windows(&mut self, a: WindowId, b: WindowId) -> bool;

    /// Moves the split boundary above `wid` by `delta`.
    fn adjust_split_ratio(&mut self, wid: WindowId, delta: f64) -> Result<(), LayoutError>;

    /// Splits `wid`'s container, leaving a vacant slot as the new sibling.
    fn split_window(&mut self, wid: WindowId, axis: Option<SplitAxis>, ratio: f64) -> bool;

    /// Display-only override mapping the root's rectangle onto one window.
    fn toggle_fullscreen(&mut self, wid: WindowId) -> bool;

    /// Same override one level up, on the window's immediate parent.
    fn toggle_parent_container(&mut self, wid: WindowId) -> bool;

    /// Recomputes every node rectangle for new screen bounds or gaps.
    fn resolve(&mut self, screen: Rect, gaps: &GapSettings);

    /// Current frame of every tracked window, overrides applied.
    fn layout(&self) -> Vec<(WindowId, Rect)>;

    fn window_frame(&self, wid: WindowId) -> Option<Rect>;

    fn draw_tree(&self) -> String;
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[enum_dispatch(LayoutSystem)]
pub enum LayoutSystemKind {
    Bsp(BspLayout),
    Monocle(MonocleLayout),
    Floating(FloatingLayout),
}

impl LayoutSystemKind {
    pub fn for_mode(mode: SpaceMode, screen: Rect, gaps: &GapSettings) -> LayoutSystemKind {
        match mode {
            SpaceMode::Bsp => LayoutSystemKind::Bsp(BspLayout::new(screen, gaps)),
            SpaceMode::Monocle => LayoutSystemKind::Monocle(MonocleLayout::new(screen, gaps)),
            SpaceMode::Floating => LayoutSystemKind::Floating(FloatingLayout::default()),
        }
    }
}

mod bsp;
mod floating;
mod monocle;

pub use bsp::BspLayout;
pub use floating::FloatingLayout;
pub use monocle::MonocleLayout;
