//! Headless document backend
//!
//! An in-memory element tree with a scrolling viewport. Implements the
//! rendering boundary so the sticky logic can be exercised without a browser.
//!
//! Layout rules (a small subset of CSS block flow):
//! - A box's height is its `height` style when set, its intrinsic height when
//!   it has no children, and otherwise the sum of its children's flow heights.
//! - A `position: fixed` box takes no space in its parent's flow and sits at
//!   its `top` style relative to the viewport.
//! - Every other box starts where its preceding siblings end.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::layout::{self, FlowLayout};
use crate::render::{RenderError, Renderer};

/// Handle to a node in a [`HeadlessDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Classes and inline styles of a node, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub classes: Vec<String>,
    pub styles: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct NodeData {
    label: Option<String>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Height of a leaf box with no explicit `height` style
    intrinsic_height: f64,
}

impl NodeData {
    fn new() -> Self {
        Self {
            label: None,
            classes: Vec::new(),
            styles: Vec::new(),
            children: Vec::new(),
            parent: None,
            intrinsic_height: 0.0,
        }
    }

    fn style(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    fn style_px(&self, property: &str) -> Option<f64> {
        self.style(property).and_then(layout::parse_px)
    }

    fn is_fixed(&self) -> bool {
        self.style("position") == Some("fixed")
    }
}

/// In-memory document with a single scrolling viewport
#[derive(Debug)]
pub struct HeadlessDocument {
    nodes: RefCell<Vec<NodeData>>,
    root: NodeId,
    viewport_height: f64,
    scroll_offset: Cell<f64>,
}

impl HeadlessDocument {
    /// Create an empty document whose viewport is `viewport_height` pixels tall
    pub fn new(viewport_height: f64) -> Self {
        Self {
            nodes: RefCell::new(vec![NodeData::new()]),
            root: NodeId(0),
            viewport_height,
            scroll_offset: Cell::new(0.0),
        }
    }

    /// The document body
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a leaf block of fixed intrinsic height under `parent`
    pub fn add_block(&self, parent: NodeId, label: &str, height: f64) -> Result<NodeId, RenderError> {
        let id = self.add_container(parent, label)?;
        self.nodes.borrow_mut()[id.0].intrinsic_height = height.max(0.0);
        Ok(id)
    }

    /// Append an empty container under `parent`; its height comes from its children
    pub fn add_container(&self, parent: NodeId, label: &str) -> Result<NodeId, RenderError> {
        let id = self.create_element("div")?;
        self.nodes.borrow_mut()[id.0].label = Some(label.to_string());
        self.append_child(&parent, &id)?;
        Ok(id)
    }

    /// First node carrying `label`, in creation order
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .position(|node| node.label.as_deref() == Some(label))
            .map(NodeId)
    }

    pub fn label(&self, id: NodeId) -> Option<String> {
        self.nodes.borrow().get(id.0).and_then(|node| node.label.clone())
    }

    pub fn classes(&self, id: NodeId) -> Result<Vec<String>, RenderError> {
        self.with_node(id, |node| node.classes.clone())
    }

    pub fn has_class(&self, id: NodeId, name: &str) -> bool {
        self.with_node(id, |node| node.classes.iter().any(|c| c == name))
            .unwrap_or(false)
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.with_node(id, |node| node.style(property).map(str::to_string))
            .ok()
            .flatten()
    }

    /// Classes and styles of a node, for before/after comparisons
    pub fn snapshot(&self, id: NodeId) -> Result<NodeSnapshot, RenderError> {
        self.with_node(id, |node| NodeSnapshot {
            classes: node.classes.clone(),
            styles: node.styles.clone(),
        })
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    /// Total height of the document content
    pub fn document_height(&self) -> f64 {
        let nodes = self.nodes.borrow();
        box_height(&nodes, self.root)
    }

    pub fn max_scroll(&self) -> f64 {
        layout::max_scroll(self.document_height(), self.viewport_height)
    }

    /// Scroll to an absolute offset, clamped to the content. Returns the new offset.
    pub fn scroll_to(&self, offset: f64) -> f64 {
        let clamped = layout::clamp_scroll(offset, self.document_height(), self.viewport_height);
        self.scroll_offset.set(clamped);
        tracing::trace!(requested = offset, offset = clamped, "headless document scrolled");
        clamped
    }

    /// Scroll by a relative amount (positive moves content up). Returns the new offset.
    pub fn scroll_by(&self, delta: f64) -> f64 {
        self.scroll_to(self.scroll_offset.get() + delta)
    }

    fn with_node<T>(&self, id: NodeId, f: impl FnOnce(&NodeData) -> T) -> Result<T, RenderError> {
        let nodes = self.nodes.borrow();
        nodes.get(id.0).map(f).ok_or_else(|| unknown(id))
    }

    fn with_node_mut<T>(&self, id: NodeId, f: impl FnOnce(&mut NodeData) -> T) -> Result<T, RenderError> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.get_mut(id.0).map(f).ok_or_else(|| unknown(id))
    }

    fn bounding_top_in(&self, nodes: &[NodeData], id: NodeId) -> f64 {
        let node = &nodes[id.0];
        if node.is_fixed() {
            return node.style_px("top").unwrap_or(0.0);
        }
        self.flow_top_in(nodes, id)
    }

    fn flow_top_in(&self, nodes: &[NodeData], id: NodeId) -> f64 {
        let Some(parent) = nodes[id.0].parent else {
            return -self.scroll_offset.get();
        };

        let parent_top = self.bounding_top_in(nodes, parent);
        let siblings = &nodes[parent.0].children;
        let layout = FlowLayout::calculate_from_heights(
            siblings.iter().map(|&child| flow_height(nodes, child)),
            parent_top,
        );

        siblings
            .iter()
            .position(|&child| child == id)
            .and_then(|index| layout.positions.get(index))
            .map(|position| position.y)
            .unwrap_or(parent_top)
    }
}

impl Renderer for HeadlessDocument {
    type Node = NodeId;

    /// Every node is a block box, so the tag is not recorded
    fn create_element(&self, _tag: &str) -> Result<NodeId, RenderError> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData::new());
        Ok(NodeId(nodes.len() - 1))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), RenderError> {
        let mut nodes = self.nodes.borrow_mut();
        check(&nodes, *parent)?;
        check(&nodes, *child)?;

        // Refuse to attach a node under itself or one of its descendants
        let mut cursor = Some(*parent);
        while let Some(current) = cursor {
            if current == *child {
                return Err(RenderError::Cycle {
                    parent: parent.to_string(),
                    child: child.to_string(),
                });
            }
            cursor = nodes[current.0].parent;
        }

        if let Some(old_parent) = nodes[child.0].parent {
            nodes[old_parent.0].children.retain(|c| c != child);
        }
        nodes[parent.0].children.push(*child);
        nodes[child.0].parent = Some(*parent);
        Ok(())
    }

    fn child_nodes(&self, node: &NodeId) -> Result<Vec<NodeId>, RenderError> {
        self.with_node(*node, |node| node.children.clone())
    }

    fn add_class(&self, node: &NodeId, name: &str) -> Result<(), RenderError> {
        self.with_node_mut(*node, |node| {
            if !node.classes.iter().any(|c| c == name) {
                node.classes.push(name.to_string());
            }
        })
    }

    fn remove_class(&self, node: &NodeId, name: &str) -> Result<(), RenderError> {
        self.with_node_mut(*node, |node| node.classes.retain(|c| c != name))
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<(), RenderError> {
        self.with_node_mut(*node, |node| {
            match node.styles.iter_mut().find(|(name, _)| name == property) {
                Some((_, existing)) => *existing = value.to_string(),
                None => node.styles.push((property.to_string(), value.to_string())),
            }
        })
    }

    fn remove_style(&self, node: &NodeId, property: &str) -> Result<(), RenderError> {
        self.with_node_mut(*node, |node| node.styles.retain(|(name, _)| name != property))
    }

    fn bounding_top(&self, node: &NodeId) -> Result<f64, RenderError> {
        let nodes = self.nodes.borrow();
        check(&nodes, *node)?;
        Ok(self.bounding_top_in(&nodes, *node))
    }

    fn offset_height(&self, node: &NodeId) -> Result<f64, RenderError> {
        let nodes = self.nodes.borrow();
        check(&nodes, *node)?;
        Ok(box_height(&nodes, *node))
    }
}

fn unknown(id: NodeId) -> RenderError {
    RenderError::UnknownNode(id.to_string())
}

fn check(nodes: &[NodeData], id: NodeId) -> Result<(), RenderError> {
    if id.0 < nodes.len() {
        Ok(())
    } else {
        Err(unknown(id))
    }
}

fn box_height(nodes: &[NodeData], id: NodeId) -> f64 {
    let node = &nodes[id.0];
    if let Some(height) = node.style_px("height") {
        return height;
    }
    if node.children.is_empty() {
        return node.intrinsic_height;
    }
    node.children.iter().map(|&child| flow_height(nodes, child)).sum()
}

/// Space a box takes in its parent's flow
fn flow_height(nodes: &[NodeData], id: NodeId) -> f64 {
    if nodes[id.0].is_fixed() {
        0.0
    } else {
        box_height(nodes, id)
    }
}
