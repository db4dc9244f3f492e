//! Rendering backends
//!
//! Implementations of [`crate::render::Renderer`]. The headless document
//! runs the sticky logic without a browser, for tests and the simulator.

pub mod headless;

pub use headless::{HeadlessDocument, NodeId, NodeSnapshot};
