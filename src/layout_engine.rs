pub mod engine;
pub mod error;
mod floating;
pub(crate) mod graph;
pub mod spaces;
pub mod systems;
pub mod utils;

pub use engine::{EventResponse, LayoutCommand, LayoutEngine};
pub use error::LayoutError;
pub(crate) use floating::FloatingManager;
pub use graph::{Direction, SpaceMode, SplitAxis};
pub use systems::{
    BspLayout, FloatingLayout, LayoutSystem, LayoutSystemKind, MonocleLayout,
};
