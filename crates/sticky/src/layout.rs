//! Vertical flow layout
//!
//! Pure functions for stacking boxes in normal flow inside a scrolling
//! viewport. Used by the headless document to answer `bounding_top` and
//! `offset_height` queries.
//!
//! # Design Contract
//!
//! - All functions are **pure** - no side effects, no state mutation
//! - Deterministic - same inputs always produce same outputs
//! - Coordinates are viewport-relative: y = 0 is the top edge of the viewport
//!
//! # NOT Responsible For
//!
//! - Node storage (see `backend/headless.rs`)
//! - Deciding when elements stick (see `controller.rs`)

/// Parse a CSS pixel length such as `"40px"` or `"12.5px"`.
///
/// Bare numbers are accepted as pixels. Returns None for anything else.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a pixel length for an inline style
pub fn format_px(value: f64) -> String {
    format!("{}px", value)
}

/// Largest valid scroll offset for the given content and viewport heights
pub fn max_scroll(content_height: f64, viewport_height: f64) -> f64 {
    (content_height - viewport_height).max(0.0)
}

/// Clamp a scroll offset into `[0, max_scroll]`
pub fn clamp_scroll(offset: f64, content_height: f64, viewport_height: f64) -> f64 {
    offset.clamp(0.0, max_scroll(content_height, viewport_height))
}

/// Calculated layout of a run of stacked boxes
#[derive(Debug, Clone, PartialEq)]
pub struct FlowLayout {
    /// Position of each box, in input order
    pub positions: Vec<BoxPosition>,

    /// Total height of all boxes combined
    pub total_height: f64,
}

/// Position of a single box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPosition {
    /// Viewport-relative top (negative once scrolled past the top)
    pub y: f64,

    pub height: f64,
}

impl FlowLayout {
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            total_height: 0.0,
        }
    }

    /// Stack boxes top to bottom starting at `origin`.
    ///
    /// `origin` is the viewport-relative top of the first box, e.g. the
    /// negated scroll offset for the document root.
    pub fn calculate_from_heights(heights: impl IntoIterator<Item = f64>, origin: f64) -> Self {
        let mut accumulator = 0.0;
        let mut positions = Vec::new();

        for height in heights {
            positions.push(BoxPosition {
                y: origin + accumulator,
                height,
            });
            accumulator += height;
        }

        if positions.is_empty() {
            return Self::empty();
        }

        Self {
            positions,
            total_height: accumulator,
        }
    }
}
