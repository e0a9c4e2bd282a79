pub mod geometry;
pub mod screen;
pub mod surface;
