use thiserror::Error;

use crate::sys::surface::WindowId;

/// Why a layout operation did nothing.
///
/// None of these are fatal: callers log at debug level and move on, leaving
/// the structure untouched.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("window {0:?} is not tracked here")]
    LookupMiss(WindowId),
    #[error("split ratio {0} would leave the open interval (0, 1)")]
    InvalidRatio(f64),
    #[error("node shape does not support this operation")]
    InvalidStructure,
}
