use serde::{Deserialize, Serialize};

use crate::common::collections::BTreeSet;
use crate::sys::surface::WindowId;

/// Windows the user has opted out of tiling. They stay in the snapshot but
/// are invisible to the layout structures.
#[derive(Serialize, Deserialize, Default)]
pub(crate) struct FloatingManager {
    floating_windows: BTreeSet<WindowId>,
    last_floating_focus: Option<WindowId>,
}

impl FloatingManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_floating(&self, wid: WindowId) -> bool {
        self.floating_windows.contains(&wid)
    }

    pub(crate) fn add_floating(&mut self, wid: WindowId) {
        self.floating_windows.insert(wid);
    }

    pub(crate) fn remove_floating(&mut self, wid: WindowId) {
        self.floating_windows.remove(&wid);
        if self.last_floating_focus == Some(wid) {
            self.last_floating_focus = None;
        }
    }

    pub(crate) fn set_last_focus(&mut self, wid: Option<WindowId>) {
        self.last_floating_focus = wid;
    }

    pub(crate) fn last_focus(&self) -> Option<WindowId> {
        self.last_floating_focus
    }
}
