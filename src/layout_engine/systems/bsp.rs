use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::debug;

use crate::common::collections::HashMap;
use crate::common::config::GapSettings;
use crate::layout_engine::error::LayoutError;
use crate::layout_engine::systems::{InsertHint, LayoutSystem, RemovalOutcome};
use crate::layout_engine::utils::tiling_area;
use crate::layout_engine::{Direction, SpaceMode, SplitAxis};
use crate::model::tree::{NodeId, NodeMap, OwnedNode};
use crate::sys::geometry::Rect;
use crate::sys::surface::WindowId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
enum NodeKind {
    Split { axis: SplitAxis, ratio: f64 },
    /// A leaf with no window is a vacant placeholder: a reusable insertion
    /// slot that keeps its container rectangle.
    Leaf { window: Option<WindowId> },
}

/// Binary-split tree for one space.
///
/// Shape invariants: every split node has exactly two children, every ratio
/// stays strictly inside (0, 1), and each tracked window id owns exactly one
/// leaf. All operations uphold these before returning.
#[derive(Serialize, Deserialize)]
pub struct BspLayout {
    map: NodeMap,
    root: Option<OwnedNode>,
    kind: SecondaryMap<NodeId, NodeKind>,
    frames: SecondaryMap<NodeId, Rect>,
    window_to_node: HashMap<WindowId, NodeId>,
    /// Display-only overrides: an internal node here lends its rectangle to
    /// the recorded window. The root entry is the pseudo-fullscreen state.
    overrides: SecondaryMap<NodeId, WindowId>,
    area: Rect,
    gaps: GapSettings,
}

impl BspLayout {
    pub fn new(screen: Rect, gaps: &GapSettings) -> BspLayout {
        BspLayout {
            map: NodeMap::new(),
            root: None,
            kind: SecondaryMap::new(),
            frames: SecondaryMap::new(),
            window_to_node: HashMap::default(),
            overrides: SecondaryMap::new(),
            area: tiling_area(screen, gaps),
            gaps: *gaps,
        }
    }

    fn make_leaf(&mut self, window: Option<WindowId>) -> NodeId {
        let id = self.map.mk_node();
        self.kind.insert(id, NodeKind::Leaf { window });
        if let Some(w) = window {
            self.window_to_node.insert(w, id);
        }
        id
    }

    /// First vacant placeholder in pre-order, if any.
    fn vacant_slot(&self) -> Option<NodeId> {
        let root = self.root.as_ref()?.id();
        root.traverse_preorder(&self.map)
            .find(|&n| matches!(self.kind.get(n), Some(NodeKind::Leaf { window: None })))
    }

    /// Descends to the leaf the no-hint insert policy splits: prefer the
    /// first child unless its subtree is already fully split and the second
    /// child is still a plain leaf.
    fn insertion_leaf(&self, root: NodeId) -> NodeId {
        let mut node = root;
        loop {
            match self.kind.get(node) {
                Some(NodeKind::Leaf { .. }) | None => return node,
                Some(NodeKind::Split { .. }) => {
                    let mut children = node.children(&self.map);
                    let (Some(first), Some(second)) = (children.next(), children.next()) else {
                        return node;
                    };
                    let first_is_leaf = matches!(self.kind.get(first), Some(NodeKind::Leaf { .. }));
                    let second_is_leaf =
                        matches!(self.kind.get(second), Some(NodeKind::Leaf { .. }));
                    node = if !first_is_leaf && second_is_leaf { second } else { first };
                }
            }
        }
    }

    /// Vertical when the container is wider than tall, horizontal otherwise.
    fn optimal_axis(&self, node: NodeId) -> SplitAxis {
        let rect = self.frames.get(node).copied().unwrap_or(self.area);
        if rect.size.width > rect.size.height {
            SplitAxis::Vertical
        } else {
            SplitAxis::Horizontal
        }
    }

    /// Splits `target` in place: it becomes a split node whose first child
    /// holds the previous payload and whose second child holds `new_window`.
    fn split_leaf_pair(
        &mut self,
        target: NodeId,
        new_window: Option<WindowId>,
        axis: SplitAxis,
        ratio: f64,
    ) {
        let existing = match self.kind.get(target) {
            Some(NodeKind::Leaf { window }) => *window,
            _ => return,
        };
        let first = self.make_leaf(existing);
        let second = self.make_leaf(new_window);
        self.kind.insert(target, NodeKind::Split { axis, ratio });
        self.map.push_back(first, target);
        self.map.push_back(second, target);
        self.resolve_subtree(target);
    }

    fn resolve_subtree(&mut self, node: NodeId) {
        let rect = self.frames.get(node).copied().unwrap_or(self.area);
        self.resolve_into(node, rect);
    }

    fn resolve_into(&mut self, node: NodeId, rect: Rect) {
        self.frames.insert(node, rect);
        let Some(NodeKind::Split { axis, ratio }) = self.kind.get(node).copied() else {
            return;
        };
        let (first_rect, second_rect) = split_rect(rect, axis, ratio, &self.gaps);
        let mut children = node.children(&self.map);
        let pair = (children.next(), children.next());
        drop(children);
        if let (Some(first), Some(second)) = pair {
            self.resolve_into(first, first_rect);
            self.resolve_into(second, second_rect);
        }
    }

    fn next_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = node;
        loop {
            if let Some(sibling) = cur.next_sibling(&self.map) {
                return Some(self.descend_first(sibling));
            }
            cur = cur.parent(&self.map)?;
        }
    }

    fn prev_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = node;
        loop {
            if let Some(sibling) = cur.prev_sibling(&self.map) {
                return Some(self.descend_last(sibling));
            }
            cur = cur.parent(&self.map)?;
        }
    }

    fn descend_first(&self, mut node: NodeId) -> NodeId {
        while let Some(child) = node.first_child(&self.map) {
            node = child;
        }
        node
    }

    fn descend_last(&self, mut node: NodeId) -> NodeId {
        while let Some(child) = node.last_child(&self.map) {
            node = child;
        }
        node
    }

    fn first_window_under(&self, node: NodeId) -> Option<WindowId> {
        node.traverse_preorder(&self.map).find_map(|n| match self.kind.get(n) {
            Some(NodeKind::Leaf { window }) => *window,
            _ => None,
        })
    }

    fn depth(&self, node: NodeId) -> usize {
        node.ancestors(&self.map).count()
    }

    fn ascii(&self, node: NodeId) -> ascii_tree::Tree {
        match self.kind.get(node) {
            Some(NodeKind::Leaf { window: Some(w) }) => {
                ascii_tree::Tree::Leaf(vec![format!("window {}", w.get())])
            }
            Some(NodeKind::Leaf { window: None }) => {
                ascii_tree::Tree::Leaf(vec!["vacant".to_owned()])
            }
            Some(NodeKind::Split { axis, ratio }) => ascii_tree::Tree::Node(
                format!("{axis:?} {ratio:.2}"),
                node.children(&self.map).map(|c| self.ascii(c)).collect(),
            ),
            None => ascii_tree::Tree::Leaf(vec!["<detached>".to_owned()]),
        }
    }
}

impl LayoutSystem for BspLayout {
    fn mode(&self) -> SpaceMode {
        SpaceMode::Bsp
    }

    fn window_count(&self) -> usize {
        self.window_to_node.len()
    }

    fn contains_window(&self, wid: WindowId) -> bool {
        self.window_to_node.contains_key(&wid)
    }

    fn windows(&self) -> Vec<WindowId> {
        let Some(root) = self.root.as_ref() else {
            return vec![];
        };
        root.id()
            .traverse_preorder(&self.map)
            .filter_map(|n| match self.kind.get(n) {
                Some(NodeKind::Leaf { window }) => *window,
                _ => None,
            })
            .collect()
    }

    fn first_window(&self) -> Option<WindowId> {
        self.windows().first().copied()
    }

    fn last_window(&self) -> Option<WindowId> {
        self.windows().last().copied()
    }

    fn insert_window(&mut self, wid: WindowId, hint: InsertHint) -> bool {
        if self.contains_window(wid) {
            debug!(?wid, "insert ignored, window already tiled");
            return false;
        }

        let Some(root) = self.root.as_ref() else {
            let root = OwnedNode::new_root_in(&mut self.map, "bsp space");
            let id = root.id();
            self.kind.insert(id, NodeKind::Leaf { window: Some(wid) });
            self.frames.insert(id, self.area);
            self.window_to_node.insert(wid, id);
            self.root = Some(root);
            return true;
        };
        let root = root.id();

        let target = hint
            .target
            .and_then(|t| self.window_to_node.get(&t).copied())
            .unwrap_or_else(|| self.insertion_leaf(root));
        let axis = hint.axis.unwrap_or_else(|| self.optimal_axis(target));
        let ratio = hint.ratio.unwrap_or(0.5);
        self.split_leaf_pair(target, Some(wid), axis, ratio);
        true
    }

    fn insert_into_vacant_slot(&mut self, wid: WindowId) -> bool {
        if self.contains_window(wid) {
            return false;
        }
        // The slot is reused as-is: no structural change, its existing
        // rectangle simply gets an occupant.
        let Some(slot) = self.vacant_slot() else {
            return false;
        };
        self.kind.insert(slot, NodeKind::Leaf { window: Some(wid) });
        self.window_to_node.insert(wid, slot);
        true
    }

    fn remove_window(&mut self, wid: WindowId) -> Option<RemovalOutcome> {
        let node = self.window_to_node.remove(&wid)?;

        // Drop any display override held by this window before the shape
        // changes underneath it.
        let stale: Vec<NodeId> = self
            .overrides
            .iter()
            .filter(|&(_, w)| *w == wid)
            .map(|(n, _)| n)
            .collect();
        for n in stale {
            self.overrides.remove(n);
        }

        let Some(parent) = node.parent(&self.map) else {
            // Last leaf: the space's tree goes away entirely.
            self.kind.remove(node);
            self.frames.remove(node);
            if let Some(mut root) = self.root.take() {
                root.remove(&mut self.map);
            }
            return Some(RemovalOutcome { next_focus: None, emptied: true });
        };

        let sibling = node
            .next_sibling(&self.map)
            .or_else(|| node.prev_sibling(&self.map))
            .expect("split node with a single child");
        let sibling_kind = self.kind.get(sibling).copied().expect("sibling without kind");
        let sibling_override = self.overrides.remove(sibling);

        // The parent absorbs the sibling's identity; both original nodes
        // are freed.
        match sibling_kind {
            NodeKind::Leaf { window } => {
                self.kind.insert(parent, NodeKind::Leaf { window });
                if let Some(w) = window {
                    self.window_to_node.insert(w, parent);
                }
            }
            NodeKind::Split { axis, ratio } => {
                self.kind.insert(parent, NodeKind::Split { axis, ratio });
                let grandchildren: Vec<NodeId> = sibling.children(&self.map).collect();
                for child in grandchildren {
                    self.map.unlink(child);
                    self.map.push_back(child, parent);
                }
                if let Some(w) = sibling_override {
                    self.overrides.insert(parent, w);
                }
            }
        }

        self.map.remove_subtree(node);
        self.map.remove_subtree(sibling);
        self.kind.remove(node);
        self.kind.remove(sibling);
        self.frames.remove(node);
        self.frames.remove(sibling);

        self.resolve_subtree(parent);
        Some(RemovalOutcome {
            next_focus: self.first_window_under(parent),
            emptied: false,
        })
    }

    fn neighbor(&self, wid: WindowId, direction: Direction) -> Option<WindowId> {
        let mut node = *self.window_to_node.get(&wid)?;
        loop {
            node = match direction {
                Direction::Next => self.next_leaf(node)?,
                Direction::Prev => self.prev_leaf(node)?,
            };
            // Vacant placeholders are not focus targets.
            if let Some(NodeKind::Leaf { window: Some(w) }) = self.kind.get(node) {
                return Some(*w);
            }
        }
    }

    fn swap_windows(&mut self, a: WindowId, b: WindowId) -> bool {
        if a == b {
            return false;
        }
        let (Some(&node_a), Some(&node_b)) =
            (self.window_to_node.get(&a), self.window_to_node.get(&b))
        else {
            return false;
        };
        self.kind.insert(node_a, NodeKind::Leaf { window: Some(b) });
        self.kind.insert(node_b, NodeKind::Leaf { window: Some(a) });
        self.window_to_node.insert(a, node_b);
        self.window_to_node.insert(b, node_a);
        true
    }

    fn adjust_split_ratio(&mut self, wid: WindowId, delta: f64) -> Result<(), LayoutError> {
        if let Some(root) = self.root.as_ref() {
            if self.overrides.contains_key(root.id()) {
                // Resizing under a fullscreen override would be invisible
                // and desynchronize the cached frames.
                return Err(LayoutError::InvalidStructure);
            }
        }
        let node = *self.window_to_node.get(&wid).ok_or(LayoutError::LookupMiss(wid))?;
        let parent = node.parent(&self.map).ok_or(LayoutError::InvalidStructure)?;
        let Some(NodeKind::Split { axis, ratio }) = self.kind.get(parent).copied() else {
            return Err(LayoutError::InvalidStructure);
        };
        let adjusted = ratio + delta;
        if !(adjusted > 0.0 && adjusted < 1.0) {
            return Err(LayoutError::InvalidRatio(adjusted));
        }
        self.kind.insert(parent, NodeKind::Split { axis, ratio: adjusted });
        self.resolve_subtree(parent);
        Ok(())
    }

    fn split_window(&mut self, wid: WindowId, axis: Option<SplitAxis>, ratio: f64) -> bool {
        let Some(&node) = self.window_to_node.get(&wid) else {
            return false;
        };
        let axis = axis.unwrap_or_else(|| self.optimal_axis(node));
        self.split_leaf_pair(node, None, axis, ratio);
        true
    }

    fn toggle_fullscreen(&mut self, wid: WindowId) -> bool {
        let Some(root) = self.root.as_ref().map(|r| r.id()) else {
            return false;
        };
        if !matches!(self.kind.get(root), Some(NodeKind::Split { .. })) {
            // A single unsplit leaf already fills the root container.
            return false;
        }
        if self.overrides.remove(root).is_some() {
            return true;
        }
        if !self.contains_window(wid) {
            return false;
        }
        self.overrides.insert(root, wid);
        true
    }

    fn toggle_parent_container(&mut self, wid: WindowId) -> bool {
        let Some(&node) = self.window_to_node.get(&wid) else {
            return false;
        };
        let Some(parent) = node.parent(&self.map) else {
            return false;
        };
        if self.overrides.remove(parent).is_some() {
            return true;
        }
        self.overrides.insert(parent, wid);
        true
    }

    fn resolve(&mut self, screen: Rect, gaps: &GapSettings) {
        self.gaps = *gaps;
        self.area = tiling_area(screen, gaps);
        if let Some(root) = self.root.as_ref().map(|r| r.id()) {
            self.resolve_into(root, self.area);
        }
    }

    fn layout(&self) -> Vec<(WindowId, Rect)> {
        let Some(root) = self.root.as_ref().map(|r| r.id()) else {
            return vec![];
        };
        let mut out: Vec<(WindowId, Rect)> = root
            .traverse_preorder(&self.map)
            .filter_map(|n| match self.kind.get(n) {
                Some(NodeKind::Leaf { window: Some(w) }) => {
                    self.frames.get(n).map(|rect| (*w, *rect))
                }
                _ => None,
            })
            .collect();

        // Apply container overrides deepest-first so that the root-level
        // fullscreen override has the last word.
        let mut promoted: Vec<(NodeId, WindowId)> =
            self.overrides.iter().map(|(n, w)| (n, *w)).collect();
        promoted.sort_by_key(|(n, _)| std::cmp::Reverse(self.depth(*n)));
        for (node, wid) in promoted {
            let Some(rect) = self.frames.get(node) else {
                continue;
            };
            if let Some(slot) = out.iter_mut().find(|(w, _)| *w == wid) {
                slot.1 = *rect;
            }
        }
        out
    }

    fn window_frame(&self, wid: WindowId) -> Option<Rect> {
        self.layout().into_iter().find(|(w, _)| *w == wid).map(|(_, rect)| rect)
    }

    fn draw_tree(&self) -> String {
        let Some(root) = self.root.as_ref().map(|r| r.id()) else {
            return "<empty bsp>".to_owned();
        };
        let mut out = String::new();
        let _ = ascii_tree::write_tree(&mut out, &self.ascii(root));
        out
    }
}

#[cfg(test)]
impl BspLayout {
    pub(crate) fn node_count(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn assert_shape_invariants(&self) {
        let Some(root) = self.root.as_ref().map(|r| r.id()) else {
            assert!(self.window_to_node.is_empty());
            return;
        };
        for node in root.traverse_preorder(&self.map) {
            match self.kind.get(node) {
                Some(NodeKind::Split { ratio, .. }) => {
                    assert!(
                        *ratio > 0.0 && *ratio < 1.0,
                        "split ratio {ratio} escaped (0, 1)"
                    );
                    assert_eq!(
                        node.children(&self.map).count(),
                        2,
                        "split node without exactly two children"
                    );
                }
                Some(NodeKind::Leaf { .. }) => {
                    assert_eq!(node.children(&self.map).count(), 0, "leaf with children");
                }
                None => panic!("node in tree without a kind"),
            }
        }
        let windows = self.windows();
        let unique: std::collections::BTreeSet<_> = windows.iter().collect();
        assert_eq!(windows.len(), unique.len(), "window id owns more than one leaf");
        assert_eq!(windows.len(), self.window_to_node.len());
    }
}

impl Drop for BspLayout {
    fn drop(&mut self) {
        if let Some(mut root) = self.root.take() {
            root.remove(&mut self.map);
        }
    }
}

fn split_rect(rect: Rect, axis: SplitAxis, ratio: f64, gaps: &GapSettings) -> (Rect, Rect) {
    match axis {
        SplitAxis::Vertical => {
            let gap = gaps.inner.horizontal;
            let available = (rect.size.width - gap).max(0.0);
            let first_width = (available * ratio).max(0.0);
            let second_width = (available - first_width).max(0.0);
            (
                Rect::new(rect.origin.x, rect.origin.y, first_width, rect.size.height),
                Rect::new(
                    rect.origin.x + first_width + gap,
                    rect.origin.y,
                    second_width,
                    rect.size.height,
                ),
            )
        }
        SplitAxis::Horizontal => {
            let gap = gaps.inner.vertical;
            let available = (rect.size.height - gap).max(0.0);
            let first_height = (available * ratio).max(0.0);
            let second_height = (available - first_height).max(0.0);
            (
                Rect::new(rect.origin.x, rect.origin.y, rect.size.width, first_height),
                Rect::new(
                    rect.origin.x,
                    rect.origin.y + first_height + gap,
                    rect.size.width,
                    second_height,
                ),
            )
        }
    }
}
