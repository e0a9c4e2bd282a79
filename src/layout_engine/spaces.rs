use tracing::debug;

use crate::common::collections::HashMap;
use crate::common::config::GapSettings;
use crate::layout_engine::systems::{LayoutSystem, LayoutSystemKind};
use crate::layout_engine::SpaceMode;
use crate::sys::geometry::Rect;
use crate::sys::screen::{ScreenDescriptor, ScreenId, SpaceId};

/// One virtual desktop on one display.
///
/// The layout union owns the tree or chain for this space; a floating
/// space owns neither.
pub struct Space {
    initialized: bool,
    layout: LayoutSystemKind,
}

impl Space {
    fn new(mode: SpaceMode, screen: Rect, gaps: &GapSettings) -> Space {
        Space {
            initialized: true,
            layout: LayoutSystemKind::for_mode(mode, screen, gaps),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn mode(&self) -> SpaceMode {
        self.layout.mode()
    }

    pub fn layout(&self) -> &LayoutSystemKind {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutSystemKind {
        &mut self.layout
    }

    /// Switches mode, tearing the existing structure down completely. The
    /// caller rebuilds from the current snapshot afterwards.
    pub fn set_mode(&mut self, mode: SpaceMode, screen: Rect, gaps: &GapSettings) {
        debug!(from = ?self.mode(), to = ?mode, "space mode switch");
        self.layout = LayoutSystemKind::for_mode(mode, screen, gaps);
    }
}

/// Per-display bookkeeping: which space is up, how many windows the last
/// sync saw, and whether containers need a forced re-apply.
pub struct Screen {
    pub id: ScreenId,
    pub frame: Rect,
    active_space: SpaceId,
    last_space: Option<SpaceId>,
    pub last_window_count: usize,
    pub needs_refresh: bool,
    spaces: HashMap<SpaceId, Space>,
}

impl Screen {
    pub fn new(descriptor: ScreenDescriptor, active_space: SpaceId) -> Screen {
        Screen {
            id: descriptor.id,
            frame: descriptor.frame,
            active_space,
            last_space: None,
            last_window_count: 0,
            needs_refresh: false,
            spaces: HashMap::default(),
        }
    }

    pub fn active_space(&self) -> SpaceId {
        self.active_space
    }

    pub fn last_space(&self) -> Option<SpaceId> {
        self.last_space
    }

    pub fn activate_space(&mut self, space: SpaceId) {
        if space != self.active_space {
            self.last_space = Some(self.active_space);
            self.active_space = space;
        }
    }

    pub fn is_initialized(&self, space: SpaceId) -> bool {
        self.spaces.get(&space).is_some_and(Space::is_initialized)
    }

    pub fn space(&self) -> Option<&Space> {
        self.spaces.get(&self.active_space)
    }

    pub fn space_mut(&mut self) -> Option<&mut Space> {
        self.spaces.get_mut(&self.active_space)
    }

    /// Creates the active space lazily on first use.
    pub fn initialize_if_needed(&mut self, mode: SpaceMode, gaps: &GapSettings) -> &mut Space {
        let frame = self.frame;
        self.spaces
            .entry(self.active_space)
            .or_insert_with(|| {
                debug!(space = ?self.active_space, ?mode, "initializing space");
                Space::new(mode, frame, gaps)
            })
    }
}
