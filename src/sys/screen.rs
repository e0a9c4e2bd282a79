use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

/// Identifies a virtual desktop on a display.
///
/// Opaque to the core; the window server hands these out and may reuse them
/// across sessions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SpaceId(u64);

impl SpaceId {
    pub fn new(id: u64) -> SpaceId {
        SpaceId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Identifies a physical display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ScreenId(u32);

impl ScreenId {
    pub fn new(id: u32) -> ScreenId {
        ScreenId(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// A display as reported by the control loop: identity plus pixel bounds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDescriptor {
    pub id: ScreenId,
    pub frame: Rect,
}
