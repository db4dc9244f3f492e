//! Rendering boundary
//!
//! The controller never touches elements directly. Everything it does to the
//! page goes through this trait, which mirrors the small slice of a DOM
//! renderer it needs: class and inline-style mutation, element creation,
//! reparenting, and two measurements.

use std::fmt;

use thiserror::Error;

/// Errors reported by a rendering backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The node handle does not refer to a live node
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// Appending would make a node its own ancestor
    #[error("cannot append {child} under its own descendant {parent}")]
    Cycle { parent: String, child: String },

    /// Backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),
}

/// Operations the sticky controller needs from the page
///
/// Methods take `&self`; backends use interior mutability the same way DOM
/// bindings do.
pub trait Renderer {
    /// Handle to an element
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    fn create_element(&self, tag: &str) -> Result<Self::Node, RenderError>;

    /// Append `child` as the last child of `parent`, detaching it from its
    /// current parent first
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), RenderError>;

    fn child_nodes(&self, node: &Self::Node) -> Result<Vec<Self::Node>, RenderError>;

    fn add_class(&self, node: &Self::Node, name: &str) -> Result<(), RenderError>;

    fn remove_class(&self, node: &Self::Node, name: &str) -> Result<(), RenderError>;

    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> Result<(), RenderError>;

    fn remove_style(&self, node: &Self::Node, property: &str) -> Result<(), RenderError>;

    /// Distance from the node's top edge to the top of the viewport.
    /// Negative once the node has scrolled past the top.
    fn bounding_top(&self, node: &Self::Node) -> Result<f64, RenderError>;

    /// Rendered height of the node
    fn offset_height(&self, node: &Self::Node) -> Result<f64, RenderError>;

    /// Move every child of `host` into a new `div` with `marker_class`, then
    /// append that wrapper to `host`. Returns the wrapper.
    fn wrap_children(&self, host: &Self::Node, marker_class: &str) -> Result<Self::Node, RenderError> {
        let wrapper = self.create_element("div")?;
        self.add_class(&wrapper, marker_class)?;
        for child in self.child_nodes(host)? {
            self.append_child(&wrapper, &child)?;
        }
        self.append_child(host, &wrapper)?;
        Ok(wrapper)
    }
}
