//! Error types

use thiserror::Error;

use crate::page::ControllerId;
use crate::render::RenderError;

/// Errors from controller and page operations
#[derive(Debug, Error)]
pub enum StickyError {
    /// The rendering boundary rejected an operation
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// No controller with this id is attached to the page
    #[error("unknown controller {0}")]
    UnknownController(ControllerId),
}
