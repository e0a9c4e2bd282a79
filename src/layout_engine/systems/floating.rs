use serde::{Deserialize, Serialize};

use crate::common::config::GapSettings;
use crate::layout_engine::error::LayoutError;
use crate::layout_engine::systems::{InsertHint, LayoutSystem, RemovalOutcome};
use crate::layout_engine::{Direction, SpaceMode, SplitAxis};
use crate::sys::geometry::Rect;
use crate::sys::surface::WindowId;

/// A floating space tracks no structure at all: windows keep whatever
/// frames they have and the engine leaves them alone.
#[derive(Default, Serialize, Deserialize)]
pub struct FloatingLayout {}

impl LayoutSystem for FloatingLayout {
    fn mode(&self) -> SpaceMode {
        SpaceMode::Floating
    }

    fn window_count(&self) -> usize {
        0
    }

    fn contains_window(&self, _wid: WindowId) -> bool {
        false
    }

    fn windows(&self) -> Vec<WindowId> {
        vec![]
    }

    fn first_window(&self) -> Option<WindowId> {
        None
    }

    fn last_window(&self) -> Option<WindowId> {
        None
    }

    fn insert_window(&mut self, _wid: WindowId, _hint: InsertHint) -> bool {
        false
    }

    fn insert_into_vacant_slot(&mut self, _wid: WindowId) -> bool {
        false
    }

    fn remove_window(&mut self, _wid: WindowId) -> Option<RemovalOutcome> {
        None
    }

    fn neighbor(&self, _wid: WindowId, _direction: Direction) -> Option<WindowId> {
        None
    }

    fn swap_windows(&mut self, _a: WindowId, _b: WindowId) -> bool {
        false
    }

    fn adjust_split_ratio(&mut self, _wid: WindowId, _delta: f64) -> Result<(), LayoutError> {
        Err(LayoutError::InvalidStructure)
    }

    fn split_window(&mut self, _wid: WindowId, _axis: Option<SplitAxis>, _ratio: f64) -> bool {
        false
    }

    fn toggle_fullscreen(&mut self, _wid: WindowId) -> bool {
        false
    }

    fn toggle_parent_container(&mut self, _wid: WindowId) -> bool {
        false
    }

    fn resolve(&mut self, _screen: Rect, _gaps: &GapSettings) {}

    fn layout(&self) -> Vec<(WindowId, Rect)> {
        vec![]
    }

    fn window_frame(&self, _wid: WindowId) -> Option<Rect> {
        None
    }

    fn draw_tree(&self) -> String {
        "<floating>".to_owned()
    }
}
