use serde::{Deserialize, Serialize};

/// The axis of a container split.
///
/// `Vertical` is a vertical divider: the container's width is shared between
/// two side-by-side children. `Horizontal` stacks the children top/bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Vertical,
    Horizontal,
}

impl SplitAxis {
    pub fn opposite(self) -> SplitAxis {
        match self {
            SplitAxis::Vertical => SplitAxis::Horizontal,
            SplitAxis::Horizontal => SplitAxis::Vertical,
        }
    }
}

/// Direction of travel along the in-order leaf sequence (or monocle chain).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Prev => Direction::Next,
            Direction::Next => Direction::Prev,
        }
    }
}

/// How a space arranges its windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceMode {
    Bsp,
    Monocle,
    Floating,
}

impl SpaceMode {
    pub fn is_tiled(self) -> bool {
        !matches!(self, SpaceMode::Floating)
    }
}
