//! Arena-backed tree structure.
//!
//! Nodes live in a slotmap and refer to each other by key, so parent
//! back-references cannot create ownership cycles. Node payloads are kept
//! in secondary maps by the layout systems; this module only owns the
//! shape.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Represents a node somewhere in the tree.
    pub struct NodeId;
}

#[derive(Default, PartialEq, Debug, Serialize, Deserialize)]
struct Node {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

/// Map that holds the structure of the tree.
///
/// Multiple trees can be contained within one map; each root is anchored by
/// an [`OwnedNode`] guard.
#[derive(Default, Serialize, Deserialize)]
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    pub fn new() -> NodeMap {
        NodeMap::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Creates a new unattached node. It is a root until linked under a
    /// parent with [`NodeMap::push_back`].
    pub fn mk_node(&mut self) -> NodeId {
        self.map.insert(Node::default())
    }

    /// Appends `child` as the last child of `parent`. `child` must be
    /// unattached; linking a node to itself is ignored.
    pub fn push_back(&mut self, child: NodeId, parent: NodeId) {
        if child == parent || !self.contains(child) || !self.contains(parent) {
            return;
        }
        debug_assert_eq!(self.map[child].parent, None, "push_back of attached node");

        let prev = {
            let parent_node = &mut self.map[parent];
            parent_node.first_child.get_or_insert(child);
            parent_node.last_child.replace(child)
        };
        self.map[child].parent = Some(parent);
        if let Some(prev) = prev {
            self.map[prev].next_sibling = Some(child);
            self.map[child].prev_sibling = Some(prev);
        }
    }

    /// Detaches `id` from its parent and siblings. The node itself (and its
    /// subtree) stays in the map as a root.
    pub fn unlink(&mut self, id: NodeId) {
        let Some((prev_sibling, next_sibling, parent)) =
            self.map.get(id).map(|n| (n.prev_sibling, n.next_sibling, n.parent))
        else {
            return;
        };
        if let Some(prev) = prev_sibling {
            self.map[prev].next_sibling = next_sibling;
        }
        if let Some(next) = next_sibling {
            self.map[next].prev_sibling = prev_sibling;
        }
        if let Some(parent) = parent {
            let parent_node = &mut self.map[parent];
            if parent_node.first_child == Some(id) {
                parent_node.first_child = next_sibling;
            }
            if parent_node.last_child == Some(id) {
                parent_node.last_child = prev_sibling;
            }
        }
        let node = &mut self.map[id];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Unlinks `id` and removes it and every node below it from the map.
    pub fn remove_subtree(&mut self, id: NodeId) {
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.map.remove(next) {
                let mut child = node.first_child;
                while let Some(c) = child {
                    stack.push(c);
                    child = self.map.get(c).and_then(|n| n.next_sibling);
                }
            }
        }
    }
}

impl NodeId {
    pub fn parent(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.parent)
    }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.prev_sibling)
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.first_child)
    }

    pub fn last_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.last_child)
    }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = map.map.get(self).and_then(|n| n.first_child);
        std::iter::from_fn(move || {
            let id = cur?;
            cur = map.map.get(id).and_then(|n| n.next_sibling);
            Some(id)
        })
    }

    /// All ancestors of this node, starting with itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| n.parent(map));
            node
        })
    }

    pub fn traverse_preorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = map.contains(self).then_some(self);
        let top = self;
        std::iter::from_fn(move || {
            let node = cur?;
            cur = if let Some(child) = node.first_child(map) {
                Some(child)
            } else {
                node.ancestors(map)
                    .take_while(|&a| a != top)
                    .find_map(|a| a.next_sibling(map))
            };
            Some(node)
        })
    }
}

/// Represents ownership of a root node in a [`NodeMap`].
///
/// Roots must be removed manually because removal needs the map. Dropping
/// an `OwnedNode` without calling [`OwnedNode::remove`] panics in debug
/// builds; the name is used in the panic message.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedNode(Option<NodeId>, String);

impl OwnedNode {
    /// Creates a new root node.
    pub fn new_root_in(map: &mut NodeMap, name: &'static str) -> Self {
        let id = map.mk_node();
        OwnedNode(Some(id), name.to_owned())
    }

    pub fn id(&self) -> NodeId {
        self.0.expect("OwnedNode::id called on removed OwnedNode")
    }

    #[track_caller]
    pub fn remove(&mut self, map: &mut NodeMap) {
        if let Some(id) = self.0.take() {
            debug_assert!(id.parent(map).is_none(), "OwnedNode was attached to a parent");
            map.remove_subtree(id);
        }
    }
}

impl Deref for OwnedNode {
    type Target = NodeId;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref().expect("OwnedNode deref on removed OwnedNode")
    }
}

impl DerefMut for OwnedNode {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut().expect("OwnedNode deref_mut on removed OwnedNode")
    }
}

impl Drop for OwnedNode {
    fn drop(&mut self) {
        if cfg!(debug_assertions) {
            if let Some(node) = self.0 {
                panic!(
                    "OwnedNode {name:?} dropped without OwnedNode::remove being called: {node:?}",
                    name = self.1,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tree with the following structure:
    /// ```text
    ///        __root__
    ///       /        \
    ///    child1    child2
    ///              /    \
    ///            gc1    gc2
    /// ```
    struct TestTree {
        map: NodeMap,
        root_node: OwnedNode,
        root: NodeId,
        child1: NodeId,
        child2: NodeId,
        gc1: NodeId,
        gc2: NodeId,
    }

    impl TestTree {
        fn new() -> Self {
            let mut map = NodeMap::new();
            let root_node = OwnedNode::new_root_in(&mut map, "test");
            let root = root_node.id();
            let child1 = map.mk_node();
            map.push_back(child1, root);
            let child2 = map.mk_node();
            map.push_back(child2, root);
            let gc1 = map.mk_node();
            map.push_back(gc1, child2);
            let gc2 = map.mk_node();
            map.push_back(gc2, child2);
            TestTree { map, root_node, root, child1, child2, gc1, gc2 }
        }

        #[track_caller]
        fn assert_children_are<const N: usize>(&self, children: [NodeId; N], parent: NodeId) {
            pretty_assertions::assert_eq!(
                children.to_vec(),
                parent.children(&self.map).collect::<Vec<_>>(),
                "children did not match"
            );
            for child in parent.children(&self.map) {
                assert_eq!(child.parent(&self.map), Some(parent), "child has incorrect parent");
            }
        }

        fn teardown(mut self) {
            self.root_node.remove(&mut self.map);
        }
    }

    #[test]
    fn structure_links() {
        let t = TestTree::new();
        t.assert_children_are([t.child1, t.child2], t.root);
        t.assert_children_are([], t.child1);
        t.assert_children_are([t.gc1, t.gc2], t.child2);
        assert_eq!(t.child1.next_sibling(&t.map), Some(t.child2));
        assert_eq!(t.child2.prev_sibling(&t.map), Some(t.child1));
        assert_eq!(t.root.first_child(&t.map), Some(t.child1));
        assert_eq!(t.root.last_child(&t.map), Some(t.child2));
        t.teardown();
    }

    #[test]
    fn ancestors() {
        let t = TestTree::new();
        let ancestors = |n: NodeId| n.ancestors(&t.map).collect::<Vec<_>>();
        assert_eq!(vec![t.child1, t.root], ancestors(t.child1));
        assert_eq!(vec![t.gc1, t.child2, t.root], ancestors(t.gc1));
        assert_eq!(vec![t.root], ancestors(t.root));
        t.teardown();
    }

    #[test]
    fn traverse_preorder() {
        let t = TestTree::new();
        assert_eq!(
            vec![t.root, t.child1, t.child2, t.gc1, t.gc2],
            t.root.traverse_preorder(&t.map).collect::<Vec<_>>()
        );
        assert_eq!(vec![t.child1], t.child1.traverse_preorder(&t.map).collect::<Vec<_>>());
        t.teardown();
    }

    #[test]
    fn unlink_detaches_but_keeps_subtree() {
        let mut t = TestTree::new();
        t.map.unlink(t.child2);
        t.assert_children_are([t.child1], t.root);
        assert_eq!(t.child2.parent(&t.map), None);
        t.assert_children_are([t.gc1, t.gc2], t.child2);
        // Re-link under a different parent.
        t.map.push_back(t.child2, t.child1);
        t.assert_children_are([t.child2], t.child1);
        t.teardown();
    }

    #[test]
    fn remove_subtree_is_recursive() {
        let mut t = TestTree::new();
        t.map.remove_subtree(t.child2);
        assert!(!t.map.contains(t.child2));
        assert!(!t.map.contains(t.gc1));
        assert!(!t.map.contains(t.gc2));
        t.assert_children_are([t.child1], t.root);
        t.teardown();
    }

    #[test]
    fn owned_node_removal_empties_map() {
        let mut t = TestTree::new();
        t.root_node.remove(&mut t.map);
        assert!(t.map.is_empty());
        // teardown is a no-op on an already-removed root
        t.teardown();
    }

    #[test]
    fn self_link_is_ignored() {
        let mut t = TestTree::new();
        t.map.unlink(t.child1);
        t.map.push_back(t.child1, t.child1);
        assert_eq!(t.child1.parent(&t.map), None);
        t.map.push_back(t.child1, t.root);
        t.teardown();
    }

    #[test]
    #[cfg_attr(not(debug_assertions), ignore)]
    fn leaked_owned_node_panics() {
        let result = std::panic::catch_unwind(|| {
            let mut map = NodeMap::new();
            let _root = OwnedNode::new_root_in(&mut map, "leaked");
        });
        assert!(result.is_err());
    }
}
