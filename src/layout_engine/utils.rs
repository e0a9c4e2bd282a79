use crate::common::config::GapSettings;
use crate::sys::geometry::Rect;

/// The area of a screen that tiled windows may occupy: the screen bounds
/// inset by the outer gaps.
pub fn tiling_area(screen: Rect, gaps: &GapSettings) -> Rect {
    let width = (screen.size.width - gaps.outer.left - gaps.outer.right).max(0.0);
    let height = (screen.size.height - gaps.outer.top - gaps.outer.bottom).max(0.0);
    Rect::new(
        screen.origin.x + gaps.outer.left,
        screen.origin.y + gaps.outer.top,
        width,
        height,
    )
}
