use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::spaces::{Screen, Space};
use super::systems::{InsertHint, LayoutSystem, LayoutSystemKind};
use super::{Direction, FloatingManager, SpaceMode, SplitAxis};
use crate::common::collections::{BTreeMap, HashSet};
use crate::common::config::{Config, CycleMode, GapSettings, LayoutSettings};
use crate::sys::geometry::{Point, Rect};
use crate::sys::screen::{ScreenDescriptor, ScreenId, SpaceId};
use crate::sys::surface::{WindowId, WindowSnapshot, WindowSurface};

/// Focused and marked window, plus the last frame we applied to the focused
/// window. The cache survives a stale snapshot cycle.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<WindowId>,
    cache: Option<Rect>,
    marked: Option<WindowId>,
}

/// What an operation wants the control loop to do: raise/focus a window
/// and/or move the pointer.
#[must_use]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventResponse {
    pub focus_window: Option<WindowId>,
    pub warp_cursor: Option<Point>,
}

#[non_exhaustive]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    UpdateWindows,
    ShiftFocus(Direction),
    SwapWithNeighbor(Direction),
    SwapWithMarked,
    MarkFocusedWindow,
    AdjustSplitRatio { amount: f64 },
    SplitFocused(Option<SplitAxis>),
    ToggleFullscreen,
    ToggleParentContainer,
    ToggleWindowFloating,
    ToggleSpaceFloating,
    SetSpaceMode(SpaceMode),
    MoveWindowToScreen(ScreenId),
}

/// The tiling engine: screen/space registry, focus state and the floating
/// set, driven one operation at a time by the control loop.
///
/// Every operation leaves the structural invariants holding before it
/// returns, even when a geometry apply fails; the tree is the source of
/// truth and the on-screen state converges on the next cycle.
pub struct LayoutEngine {
    screens: BTreeMap<ScreenId, Screen>,
    active_screen: Option<ScreenId>,
    floating: FloatingManager,
    focus: FocusState,
    settings: LayoutSettings,
    gaps: GapSettings,
}

impl LayoutEngine {
    pub fn new(config: &Config) -> LayoutEngine {
        LayoutEngine {
            screens: BTreeMap::new(),
            active_screen: None,
            floating: FloatingManager::new(),
            focus: FocusState::default(),
            settings: config.settings.clone(),
            gaps: config.gaps,
        }
    }

    /// Registers or refreshes a display. A changed frame schedules a
    /// container refresh for the next sync.
    pub fn ensure_screen(&mut self, descriptor: ScreenDescriptor, active_space: SpaceId) {
        let screen = self
            .screens
            .entry(descriptor.id)
            .or_insert_with(|| Screen::new(descriptor, active_space));
        if screen.frame != descriptor.frame {
            screen.frame = descriptor.frame;
            screen.needs_refresh = true;
        }
        screen.activate_space(active_space);
        if self.active_screen.is_none() {
            self.active_screen = Some(descriptor.id);
        }
    }

    pub fn set_active_screen(&mut self, screen: ScreenId) {
        if self.screens.contains_key(&screen) {
            self.active_screen = Some(screen);
        }
    }

    pub fn active_screen(&self) -> Option<ScreenId> {
        self.active_screen
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.focus.focused
    }

    /// Focus as reported by the control loop (OS focus events).
    pub fn set_focused_window(&mut self, wid: Option<WindowId>) {
        self.focus.focused = wid;
        if let Some(w) = wid {
            if self.floating.is_floating(w) {
                self.floating.set_last_focus(Some(w));
            }
        }
    }

    pub fn marked_window(&self) -> Option<WindowId> {
        self.focus.marked
    }

    /// Last frame applied to the focused window; stands in for a stale
    /// snapshot.
    pub fn cached_focus_frame(&self) -> Option<Rect> {
        self.focus.cache
    }

    pub fn space_mode(&self, screen: ScreenId) -> Option<SpaceMode> {
        Some(self.screens.get(&screen)?.space()?.mode())
    }

    pub fn windows_on(&self, screen: ScreenId) -> Vec<WindowId> {
        self.screens
            .get(&screen)
            .and_then(|s| s.space())
            .map(|sp| sp.layout().windows())
            .unwrap_or_default()
    }

    pub fn window_frame(&self, screen: ScreenId, wid: WindowId) -> Option<Rect> {
        self.screens.get(&screen)?.space()?.layout().window_frame(wid)
    }

    pub fn draw_tree(&self, screen: ScreenId) -> String {
        self.screens
            .get(&screen)
            .and_then(|s| s.space())
            .map(|sp| sp.layout().draw_tree())
            .unwrap_or_else(|| "<no space>".to_owned())
    }

    pub fn layout_frames(&self, screen: ScreenId) -> Vec<(WindowId, Rect)> {
        self.screens
            .get(&screen)
            .and_then(|s| s.space())
            .map(|sp| sp.layout().layout())
            .unwrap_or_default()
    }

    pub fn handle_command(
        &mut self,
        screen: ScreenId,
        command: &LayoutCommand,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        match command {
            LayoutCommand::UpdateWindows => self.update_windows(screen, surface),
            LayoutCommand::ShiftFocus(direction) => self.shift_focus(screen, *direction, surface),
            LayoutCommand::SwapWithNeighbor(direction) => {
                self.swap_with_neighbor(screen, *direction, surface)
            }
            LayoutCommand::SwapWithMarked => self.swap_with_marked(screen, surface),
            LayoutCommand::MarkFocusedWindow => self.mark_focused_window(),
            LayoutCommand::AdjustSplitRatio { amount } => {
                self.adjust_split_ratio(screen, *amount, surface)
            }
            LayoutCommand::SplitFocused(axis) => self.split_focused(screen, *axis, surface),
            LayoutCommand::ToggleFullscreen => self.toggle_fullscreen(screen, surface),
            LayoutCommand::ToggleParentContainer => self.toggle_parent_container(screen, surface),
            LayoutCommand::ToggleWindowFloating => self.toggle_window_floating(screen, surface),
            LayoutCommand::ToggleSpaceFloating => self.toggle_space_floating(screen, surface),
            LayoutCommand::SetSpaceMode(mode) => self.set_space_mode(screen, *mode, surface),
            LayoutCommand::MoveWindowToScreen(target) => {
                self.move_window_to_screen(screen, *target, surface)
            }
        }
    }

    /// One sync cycle: diff the snapshot's window-id set against the
    /// structure's membership and insert/remove the difference.
    ///
    /// Unlike a count-driven heuristic, a same-cycle 1-for-1 swap (one
    /// window closed, another opened) is detected and handled.
    pub fn update_windows(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let focused = self.focus.focused;
        let marked = self.focus.marked;
        let marked_floating = marked.is_some_and(|m| self.floating.is_floating(m));
        let split_ratio = self.settings.split_ratio;
        let default_mode = self.settings.default_mode;
        let gaps = self.gaps;

        let snapshot = surface.list_windows(screen_id);

        let mut pending_focus: Option<WindowId> = None;
        let mut mark_consumed = false;
        let mut structural = false;

        {
            let Some(screen) = self.screens.get_mut(&screen_id) else {
                debug!(?screen_id, "sync for unknown screen");
                return EventResponse::default();
            };
            let frame = screen.frame;
            let floating = &self.floating;
            let tileable: Vec<WindowSnapshot> = snapshot
                .into_iter()
                .filter(|w| w.is_tileable() && !floating.is_floating(w.id))
                .collect();

            if screen.space().is_none() && tileable.is_empty() {
                screen.last_window_count = 0;
                return EventResponse::default();
            }

            let space = screen.initialize_if_needed(default_mode, &gaps);
            if space.mode() == SpaceMode::Floating {
                screen.last_window_count = tileable.len();
                return EventResponse::default();
            }
            let refresh = std::mem::take(&mut screen.needs_refresh);

            let current = screen.space().expect("space just initialized").layout().windows();
            let snapshot_ids: HashSet<WindowId> = tileable.iter().map(|w| w.id).collect();
            let current_set: HashSet<WindowId> = current.iter().copied().collect();

            for &wid in &current {
                if snapshot_ids.contains(&wid) {
                    continue;
                }
                let layout = screen.space_mut().expect("space exists").layout_mut();
                if let Some(outcome) = layout.remove_window(wid) {
                    structural = true;
                    debug!(?wid, "window left the space");
                    if focused == Some(wid) {
                        pending_focus = outcome.next_focus;
                    }
                }
            }

            for snap in &tileable {
                if current_set.contains(&snap.id) {
                    continue;
                }
                let layout = screen.space_mut().expect("space exists").layout_mut();
                // A vacant placeholder absorbs the window before the split
                // policy runs, and a pending mark survives it.
                if layout.insert_into_vacant_slot(snap.id) {
                    structural = true;
                    debug!(wid = ?snap.id, "window filled a vacant slot");
                    pending_focus = Some(snap.id);
                    continue;
                }
                let mut target = None;
                if !mark_consumed {
                    if let Some(m) = marked {
                        if m != snap.id && !marked_floating && layout.contains_window(m) {
                            target = Some(m);
                            mark_consumed = true;
                        }
                    }
                }
                if target.is_none() {
                    // Each insertion is evaluated against the focus state as
                    // it evolves within the cycle: a window inserted a moment
                    // ago is the focus target for the next one.
                    if let Some(f) = pending_focus.or(focused) {
                        if f != snap.id && layout.contains_window(f) {
                            target = Some(f);
                        }
                    }
                }
                let hint = InsertHint {
                    target,
                    axis: None,
                    ratio: Some(split_ratio),
                };
                if layout.insert_window(snap.id, hint) {
                    structural = true;
                    debug!(wid = ?snap.id, "window joined the space");
                    pending_focus = Some(snap.id);
                }
            }

            screen.last_window_count = tileable.len();

            if refresh {
                screen.space_mut().expect("space exists").layout_mut().resolve(frame, &gaps);
            }

            if structural || refresh {
                let layout = screen.space().expect("space exists").layout();
                if let Some(rect) = apply_space_layout(layout, focused, surface) {
                    self.focus.cache = Some(rect);
                }
            }
        }

        if mark_consumed {
            self.focus.marked = None;
        }

        if let Some(next) = pending_focus {
            let frame = self.window_frame(screen_id, next);
            return self.focus_window(next, frame, surface);
        }

        // The focused window may have vanished without a structural
        // replacement; fall back to the OS's notion of focus.
        if let Some(f) = self.focus.focused {
            if !self.is_tracked_anywhere(f) && !self.floating.is_floating(f) {
                self.focus.focused = surface.focused_window();
                self.focus.cache = None;
            }
        }
        EventResponse::default()
    }

    /// Removes one window from its space. With `recenter`, the previously
    /// focused window is centered on screen instead of picking up a tile's
    /// focus, which is what the float toggle wants.
    pub fn remove_window(
        &mut self,
        screen_id: ScreenId,
        wid: WindowId,
        recenter: bool,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let focused = self.focus.focused;
        let mut next: Option<(WindowId, Option<Rect>)> = None;

        {
            let Some(screen) = self.screens.get_mut(&screen_id) else {
                return EventResponse::default();
            };
            let frame = screen.frame;
            let Some(space) = screen.space_mut() else {
                debug!(?wid, "remove on a space with no structure");
                return EventResponse::default();
            };
            let Some(outcome) = space.layout_mut().remove_window(wid) else {
                debug!(?wid, "remove: window not tracked");
                return EventResponse::default();
            };

            if let Some(rect) = apply_space_layout(space.layout(), focused, surface) {
                self.focus.cache = Some(rect);
            }

            if recenter {
                // The evicted window is about to float; give it a sane
                // frame instead of the tile it no longer owns.
                if let Some(f) = focused {
                    let center = centered_frame(frame);
                    match surface.apply_geometry(f, center) {
                        Ok(()) => {
                            if self.focus.focused == Some(f) {
                                self.focus.cache = Some(center);
                            }
                        }
                        Err(err) => warn!(%err, "centering failed"),
                    }
                }
            } else if let Some(n) = outcome.next_focus {
                next = Some((n, space.layout().window_frame(n)));
            } else if focused == Some(wid) {
                self.focus.focused = None;
                self.focus.cache = None;
            }
        }

        match next {
            Some((n, frame)) => self.focus_window(n, frame, surface),
            None => EventResponse::default(),
        }
    }

    /// Moves focus along the traversal order. At a boundary the cycle
    /// policy decides: stop, wrap within the space, or continue onto the
    /// adjacent display.
    pub fn shift_focus(
        &mut self,
        screen_id: ScreenId,
        direction: Direction,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            debug!("shift_focus with nothing focused");
            return EventResponse::default();
        };

        let mut next: Option<(ScreenId, WindowId)> = None;
        {
            let Some(layout) = self.layout_of(screen_id) else {
                return EventResponse::default();
            };
            if !layout.contains_window(focused) {
                debug!(?focused, "focused window is not tiled here");
                return EventResponse::default();
            }
            if let Some(n) = layout.neighbor(focused, direction) {
                next = Some((screen_id, n));
            } else {
                match self.settings.cycle_focus {
                    CycleMode::None => {}
                    CycleMode::Screen => {
                        let wrapped = match direction {
                            Direction::Next => layout.first_window(),
                            Direction::Prev => layout.last_window(),
                        };
                        if let Some(w) = wrapped.filter(|&w| w != focused) {
                            next = Some((screen_id, w));
                        }
                    }
                    CycleMode::All => {
                        next = self.adjacent_screen_target(screen_id, direction);
                    }
                }
            }
        }

        let Some((target_screen, target)) = next else {
            return EventResponse::default();
        };
        self.active_screen = Some(target_screen);
        let frame = self.window_frame(target_screen, target);
        self.focus_window(target, frame, surface)
    }

    /// Exchanges the focused window with its traversal neighbor. Shape and
    /// rectangles are untouched; only the payloads move.
    pub fn swap_with_neighbor(
        &mut self,
        screen_id: ScreenId,
        direction: Direction,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            return EventResponse::default();
        };
        {
            let Some(layout) = self.layout_of_mut(screen_id) else {
                return EventResponse::default();
            };
            let Some(neighbor) = layout.neighbor(focused, direction) else {
                debug!(?direction, "no neighbor to swap with");
                return EventResponse::default();
            };
            if !layout.swap_windows(focused, neighbor) {
                return EventResponse::default();
            }
        }
        self.after_swap(screen_id, focused, surface)
    }

    /// Exchanges the focused window with the marked one. The mark is
    /// consumed by the attempt, matching the original behavior.
    pub fn swap_with_marked(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let (Some(focused), Some(marked)) = (self.focus.focused, self.focus.marked) else {
            return EventResponse::default();
        };
        self.focus.marked = None;
        if focused == marked {
            return EventResponse::default();
        }
        {
            let Some(layout) = self.layout_of_mut(screen_id) else {
                return EventResponse::default();
            };
            if !layout.swap_windows(focused, marked) {
                debug!(?focused, ?marked, "swap with marked failed lookup");
                return EventResponse::default();
            }
        }
        self.after_swap(screen_id, focused, surface)
    }

    pub fn mark_focused_window(&mut self) -> EventResponse {
        if let Some(f) = self.focus.focused {
            debug!(?f, "marked window");
            self.focus.marked = Some(f);
        }
        EventResponse::default()
    }

    /// Nudges the split boundary above the focused window. Deltas that
    /// would push the ratio out of (0, 1) are rejected without touching
    /// anything.
    pub fn adjust_split_ratio(
        &mut self,
        screen_id: ScreenId,
        amount: f64,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            return EventResponse::default();
        };
        let mut cache = None;
        {
            let Some(space) = self.space_of_mut(screen_id) else {
                return EventResponse::default();
            };
            match space.layout_mut().adjust_split_ratio(focused, amount) {
                Ok(()) => {
                    cache = apply_space_layout(space.layout(), Some(focused), surface);
                }
                Err(err) => debug!(%err, "ratio adjustment rejected"),
            }
        }
        if let Some(rect) = cache {
            self.focus.cache = Some(rect);
        }
        EventResponse::default()
    }

    /// Splits the focused window's container, leaving a vacant slot that
    /// the next insertion reuses.
    pub fn split_focused(
        &mut self,
        screen_id: ScreenId,
        axis: Option<SplitAxis>,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            return EventResponse::default();
        };
        let ratio = self.settings.split_ratio;
        let mut cache = None;
        {
            let Some(space) = self.space_of_mut(screen_id) else {
                return EventResponse::default();
            };
            if space.layout_mut().split_window(focused, axis, ratio) {
                cache = apply_space_layout(space.layout(), Some(focused), surface);
            }
        }
        if let Some(rect) = cache {
            self.focus.cache = Some(rect);
        }
        EventResponse::default()
    }

    pub fn toggle_fullscreen(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        self.toggle_override(screen_id, surface, |layout, wid| layout.toggle_fullscreen(wid))
    }

    pub fn toggle_parent_container(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        self.toggle_override(screen_id, surface, |layout, wid| {
            layout.toggle_parent_container(wid)
        })
    }

    /// Floats the focused tiled window (removing and recentering it), or
    /// re-tiles it if it is already floating. BSP spaces only, as in the
    /// original.
    pub fn toggle_window_floating(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            return EventResponse::default();
        };

        if self.floating.is_floating(focused) {
            self.floating.remove_floating(focused);
            let split_ratio = self.settings.split_ratio;
            let mut inserted = false;
            {
                let Some(space) = self.space_of_mut(screen_id) else {
                    return EventResponse::default();
                };
                if space.mode() == SpaceMode::Bsp {
                    let hint = InsertHint {
                        target: None,
                        axis: None,
                        ratio: Some(split_ratio),
                    };
                    if space.layout_mut().insert_window(focused, hint) {
                        apply_space_layout(space.layout(), Some(focused), surface);
                        inserted = true;
                    }
                }
            }
            if inserted {
                let frame = self.window_frame(screen_id, focused);
                return self.focus_window(focused, frame, surface);
            }
            EventResponse::default()
        } else {
            let tiled_here = self
                .space_of(screen_id)
                .is_some_and(|sp| sp.mode() == SpaceMode::Bsp && sp.layout().contains_window(focused));
            if !tiled_here {
                debug!(?focused, "float toggle outside a bsp space");
                return EventResponse::default();
            }
            self.floating.add_floating(focused);
            self.floating.set_last_focus(Some(focused));
            self.remove_window(screen_id, focused, true, surface)
        }
    }

    /// Switches the active space's mode. The old structure is destroyed
    /// first; tiled modes are rebuilt from the current snapshot through the
    /// normal sync path.
    pub fn set_space_mode(
        &mut self,
        screen_id: ScreenId,
        mode: SpaceMode,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let gaps = self.gaps;
        let default_mode = self.settings.default_mode;
        {
            let Some(screen) = self.screens.get_mut(&screen_id) else {
                return EventResponse::default();
            };
            let frame = screen.frame;
            let space = screen.initialize_if_needed(default_mode, &gaps);
            if space.mode() == mode {
                return EventResponse::default();
            }
            space.set_mode(mode, frame, &gaps);
        }
        if mode.is_tiled() {
            self.update_windows(screen_id, surface)
        } else {
            EventResponse::default()
        }
    }

    pub fn toggle_space_floating(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let current = self.space_mode(screen_id);
        let target = match current {
            Some(SpaceMode::Floating) => self.settings.default_mode,
            Some(_) => SpaceMode::Floating,
            None => return EventResponse::default(),
        };
        self.set_space_mode(screen_id, target, surface)
    }

    /// Sends the focused window to another display's active space and
    /// schedules a container refresh there.
    pub fn move_window_to_screen(
        &mut self,
        from: ScreenId,
        to: ScreenId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            return EventResponse::default();
        };
        if from == to || !self.screens.contains_key(&to) {
            return EventResponse::default();
        }
        if !self.layout_of(from).is_some_and(|l| l.contains_window(focused)) {
            debug!(?focused, "move to screen: window not tiled on source");
            return EventResponse::default();
        }
        let response = self.remove_window(from, focused, false, surface);
        let split_ratio = self.settings.split_ratio;
        let default_mode = self.settings.default_mode;
        let gaps = self.gaps;
        {
            let Some(screen) = self.screens.get_mut(&to) else {
                return response;
            };
            let space = screen.initialize_if_needed(default_mode, &gaps);
            let hint = InsertHint {
                target: None,
                axis: None,
                ratio: Some(split_ratio),
            };
            if space.layout_mut().insert_window(focused, hint) {
                apply_space_layout(space.layout(), None, surface);
            }
            screen.needs_refresh = true;
        }
        response
    }

    fn toggle_override(
        &mut self,
        screen_id: ScreenId,
        surface: &mut impl WindowSurface,
        op: impl FnOnce(&mut LayoutSystemKind, WindowId) -> bool,
    ) -> EventResponse {
        let Some(focused) = self.focus.focused else {
            return EventResponse::default();
        };
        let mut cache = None;
        {
            let Some(space) = self.space_of_mut(screen_id) else {
                return EventResponse::default();
            };
            if op(space.layout_mut(), focused) {
                cache = apply_space_layout(space.layout(), Some(focused), surface);
            } else {
                debug!(?focused, "container toggle was a no-op");
            }
        }
        if let Some(rect) = cache {
            self.focus.cache = Some(rect);
        }
        EventResponse::default()
    }

    fn after_swap(
        &mut self,
        screen_id: ScreenId,
        focused: WindowId,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        {
            let Some(space) = self.space_of(screen_id) else {
                return EventResponse::default();
            };
            if let Some(rect) = apply_space_layout(space.layout(), Some(focused), surface) {
                self.focus.cache = Some(rect);
            }
        }
        let frame = self.window_frame(screen_id, focused);
        self.focus_window(focused, frame, surface)
    }

    fn focus_window(
        &mut self,
        wid: WindowId,
        frame: Option<Rect>,
        surface: &mut impl WindowSurface,
    ) -> EventResponse {
        self.focus.focused = Some(wid);
        if self.floating.is_floating(wid) {
            self.floating.set_last_focus(Some(wid));
        }
        let mut warp = None;
        if self.settings.mouse_follows_focus && !surface.transient_ui_visible() {
            warp = frame.map(|f| f.center());
        }
        if let Some(point) = warp {
            surface.warp_cursor(point);
        }
        EventResponse {
            focus_window: Some(wid),
            warp_cursor: warp,
        }
    }

    /// First screen in id order (wrapping) past `current` that has a window
    /// to land on.
    fn adjacent_screen_target(
        &self,
        current: ScreenId,
        direction: Direction,
    ) -> Option<(ScreenId, WindowId)> {
        let ids: Vec<ScreenId> = self.screens.keys().copied().collect();
        let pos = ids.iter().position(|&s| s == current)?;
        let n = ids.len();
        for k in 1..n {
            let idx = match direction {
                Direction::Next => (pos + k) % n,
                Direction::Prev => (pos + n - k) % n,
            };
            let sid = ids[idx];
            let target = self.screens[&sid].space().and_then(|sp| match direction {
                Direction::Next => sp.layout().first_window(),
                Direction::Prev => sp.layout().last_window(),
            });
            if let Some(t) = target {
                return Some((sid, t));
            }
        }
        None
    }

    fn is_tracked_anywhere(&self, wid: WindowId) -> bool {
        self.screens
            .values()
            .any(|s| s.space().is_some_and(|sp| sp.layout().contains_window(wid)))
    }

    fn layout_of(&self, screen: ScreenId) -> Option<&LayoutSystemKind> {
        Some(self.screens.get(&screen)?.space()?.layout())
    }

    fn layout_of_mut(&mut self, screen: ScreenId) -> Option<&mut LayoutSystemKind> {
        Some(self.screens.get_mut(&screen)?.space_mut()?.layout_mut())
    }

    fn space_of(&self, screen: ScreenId) -> Option<&Space> {
        self.screens.get(&screen)?.space()
    }

    fn space_of_mut(&mut self, screen: ScreenId) -> Option<&mut Space> {
        self.screens.get_mut(&screen)?.space_mut()
    }
}

/// Pushes every frame of the space to the surface. Failures are logged and
/// skipped; the structure is already consistent and the next cycle retries.
/// Returns the frame applied to the focused window, for the focus cache.
fn apply_space_layout(
    layout: &LayoutSystemKind,
    focused: Option<WindowId>,
    surface: &mut impl WindowSurface,
) -> Option<Rect> {
    let mut focused_frame = None;
    for (wid, rect) in layout.layout() {
        if let Err(err) = surface.apply_geometry(wid, rect) {
            warn!(%err, "geometry apply failed");
            continue;
        }
        if focused == Some(wid) {
            focused_frame = Some(rect);
        }
    }
    focused_frame
}

/// Half the screen, a quarter in from each edge.
fn centered_frame(screen: Rect) -> Rect {
    Rect::new(
        screen.origin.x + screen.size.width / 4.0,
        screen.origin.y + screen.size.height / 4.0,
        screen.size.width / 2.0,
        screen.size.height / 2.0,
    )
}
