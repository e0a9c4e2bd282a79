use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::config::GapSettings;
use crate::layout_engine::error::LayoutError;
use crate::layout_engine::systems::{InsertHint, LayoutSystem, RemovalOutcome};
use crate::layout_engine::utils::tiling_area;
use crate::layout_engine::{Direction, SpaceMode, SplitAxis};
use crate::model::chain::Chain;
use crate::sys::geometry::Rect;
use crate::sys::surface::WindowId;

/// Monocle layout: every window occupies the full tiling area, tracked in
/// a doubly linked chain rather than a split tree.
#[derive(Serialize, Deserialize)]
pub struct MonocleLayout {
    chain: Chain,
    area: Rect,
}

impl MonocleLayout {
    pub fn new(screen: Rect, gaps: &GapSettings) -> MonocleLayout {
        MonocleLayout {
            chain: Chain::new(),
            area: tiling_area(screen, gaps),
        }
    }
}

impl LayoutSystem for MonocleLayout {
    fn mode(&self) -> SpaceMode {
        SpaceMode::Monocle
    }

    fn window_count(&self) -> usize {
        self.chain.len()
    }

    fn contains_window(&self, wid: WindowId) -> bool {
        self.chain.contains(wid)
    }

    fn windows(&self) -> Vec<WindowId> {
        self.chain.windows().collect()
    }

    fn first_window(&self) -> Option<WindowId> {
        self.chain.head_window()
    }

    fn last_window(&self) -> Option<WindowId> {
        self.chain.tail_window()
    }

    /// Insertion always appends to the tail; the hint is irrelevant here.
    fn insert_window(&mut self, wid: WindowId, _hint: InsertHint) -> bool {
        if self.chain.contains(wid) {
            debug!(?wid, "insert ignored, window already chained");
            return false;
        }
        self.chain.push_back(wid);
        true
    }

    fn insert_into_vacant_slot(&mut self, _wid: WindowId) -> bool {
        false
    }

    fn remove_window(&mut self, wid: WindowId) -> Option<RemovalOutcome> {
        let removal = self.chain.remove(wid)?;
        Some(RemovalOutcome {
            next_focus: removal.next_focus,
            emptied: self.chain.is_empty(),
        })
    }

    fn neighbor(&self, wid: WindowId, direction: Direction) -> Option<WindowId> {
        match direction {
            Direction::Next => self.chain.next_of(wid),
            Direction::Prev => self.chain.prev_of(wid),
        }
    }

    fn swap_windows(&mut self, a: WindowId, b: WindowId) -> bool {
        self.chain.swap(a, b)
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

    fn resolve(&mut self, screen: Rect, gaps: &GapSettings) {
        self.area = tiling_area(screen, gaps);
    }

    fn layout(&self) -> Vec<(WindowId, Rect)> {
        self.chain.windows().map(|w| (w, self.area)).collect()
    }

    fn window_frame(&self, wid: WindowId) -> Option<Rect> {
        self.chain.contains(wid).then_some(self.area)
    }

    fn draw_tree(&self) -> String {
        if self.chain.is_empty() {
            return "<empty monocle>".to_owned();
        }
        let mut out = String::new();
        for (i, w) in self.chain.windows().enumerate() {
            if i > 0 {
                out.push_str(" <-> ");
            }
            out.push_str(&format!("window {}", w.get()));
        }
        out.push('\n');
        out
    }
}
