//! Doubly linked window chain, used by the monocle layout.
//!
//! Links are slotmap keys into the chain's own arena, so the list cannot
//! form ownership cycles. The chain is not circular: the head has no
//! predecessor and the tail no successor.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::sys::surface::WindowId;

slotmap::new_key_type! {
    pub struct ChainNodeId;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChainNode {
    window: WindowId,
    prev: Option<ChainNodeId>,
    next: Option<ChainNodeId>,
}

/// Focus fallback produced by removing a window from the chain.
#[derive(Debug, PartialEq, Eq)]
pub struct ChainRemoval {
    pub next_focus: Option<WindowId>,
}

#[derive(Default, Serialize, Deserialize)]
pub struct Chain {
    nodes: SlotMap<ChainNodeId, ChainNode>,
    head: Option<ChainNodeId>,
    tail: Option<ChainNodeId>,
}

impl Chain {
    pub fn new() -> Chain {
        Chain::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.find(window).is_some()
    }

    pub fn head_window(&self) -> Option<WindowId> {
        self.head.map(|id| self.nodes[id].window)
    }

    pub fn tail_window(&self) -> Option<WindowId> {
        self.tail.map(|id| self.nodes[id].window)
    }

    /// Windows in chain order, head to tail.
    pub fn windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let id = cur?;
            let node = &self.nodes[id];
            cur = node.next;
            Some(node.window)
        })
    }

    /// Links a new node after the current tail.
    pub fn push_back(&mut self, window: WindowId) {
        debug_assert!(!self.contains(window), "window already in chain");
        let id = self.nodes.insert(ChainNode {
            window,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Unlinks the node holding `window`, relinking its neighbors.
    ///
    /// The focus fallback is the predecessor, or the new head when the
    /// removed node was the head. Removing the only node leaves the chain
    /// empty with no fallback.
    pub fn remove(&mut self, window: WindowId) -> Option<ChainRemoval> {
        let id = self.find(window)?;
        let ChainNode { prev, next, .. } = self.nodes.remove(id).expect("node vanished");

        if let Some(prev) = prev {
            self.nodes[prev].next = next;
        }
        if let Some(next) = next {
            self.nodes[next].prev = prev;
        }
        if self.head == Some(id) {
            self.head = next;
        }
        if self.tail == Some(id) {
            self.tail = prev;
        }

        let next_focus = prev.or(self.head).map(|n| self.nodes[n].window);
        Some(ChainRemoval { next_focus })
    }

    pub fn next_of(&self, window: WindowId) -> Option<WindowId> {
        let id = self.find(window)?;
        self.nodes[id].next.map(|n| self.nodes[n].window)
    }

    pub fn prev_of(&self, window: WindowId) -> Option<WindowId> {
        let id = self.find(window)?;
        self.nodes[id].prev.map(|n| self.nodes[n].window)
    }

    /// Exchanges the window payloads of two nodes; links are untouched.
    pub fn swap(&mut self, a: WindowId, b: WindowId) -> bool {
        let (Some(node_a), Some(node_b)) = (self.find(a), self.find(b)) else {
            return false;
        };
        self.nodes[node_a].window = b;
        self.nodes[node_b].window = a;
        true
    }

    fn find(&self, window: WindowId) -> Option<ChainNodeId> {
        let mut cur = self.head;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.window == window {
                return Some(id);
            }
            cur = node.next;
        }
        None
    }
}
