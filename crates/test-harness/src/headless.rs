//! Headless page wrapper for testing

use std::rc::Rc;

use sticky::backend::{HeadlessDocument, NodeId, NodeSnapshot};
use sticky::{
    ControllerId, Renderer, StickyConfig, StickyError, StickyOverrides, StickyPage, StickyState,
    StuckElement, Transition,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("sticky error: {0}")]
    Sticky(#[from] StickyError),

    #[error("render error: {0}")]
    Render(#[from] sticky::RenderError),
}

/// Handle to a sticky element in tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickyHandle {
    pub id: ControllerId,
    pub host: NodeId,
    pub label: String,
}

/// Snapshot of page state for assertions
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub scroll_offset: f64,

    /// Registry list, bottom of the stack first
    pub registry: Vec<StuckElement>,

    /// State of every attached element, in attach order
    pub states: Vec<(String, StickyState)>,

    /// Label of the element stuck on top
    pub active: Option<String>,
}

impl PageSnapshot {
    pub fn state_of(&self, label: &str) -> Option<StickyState> {
        self.states
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, state)| *state)
    }

    pub fn count_in(&self, state: StickyState) -> usize {
        self.states.iter().filter(|(_, s)| *s == state).count()
    }
}

/// Sticky page over a headless document
pub struct TestPage {
    doc: Rc<HeadlessDocument>,
    page: StickyPage<HeadlessDocument>,
    handles: Vec<StickyHandle>,
}

impl TestPage {
    /// Create an empty page with a viewport of the given height
    pub fn new(viewport_height: f64) -> Self {
        Self::with_config(viewport_height, StickyConfig::default())
    }

    pub fn with_config(viewport_height: f64, defaults: StickyConfig) -> Self {
        let doc = Rc::new(HeadlessDocument::new(viewport_height));
        let page = StickyPage::with_config(Rc::clone(&doc), defaults);
        Self {
            doc,
            page,
            handles: Vec::new(),
        }
    }

    pub fn doc(&self) -> &HeadlessDocument {
        &self.doc
    }

    pub fn page(&self) -> &StickyPage<HeadlessDocument> {
        &self.page
    }

    /// Append a plain (non-sticky) block to the body
    pub fn add_block(&mut self, label: &str, height: f64) -> Result<NodeId, TestError> {
        Ok(self.doc.add_block(self.doc.root(), label, height)?)
    }

    /// Append a sticky element whose content is `content_height` tall
    pub fn add_sticky(&mut self, label: &str, content_height: f64) -> Result<StickyHandle, TestError> {
        self.add_sticky_with(label, content_height, &StickyOverrides::default())
    }

    pub fn add_sticky_with(
        &mut self,
        label: &str,
        content_height: f64,
        overrides: &StickyOverrides,
    ) -> Result<StickyHandle, TestError> {
        let host = self.doc.add_container(self.doc.root(), label)?;
        self.doc.add_block(host, &format!("{}-text", label), content_height)?;
        let id = self.page.attach(host, overrides)?;

        let handle = StickyHandle {
            id,
            host,
            label: label.to_string(),
        };
        self.handles.push(handle.clone());
        Ok(handle)
    }

    /// Tear down one sticky element
    pub fn detach(&mut self, handle: &StickyHandle) -> bool {
        self.handles.retain(|h| h.id != handle.id);
        self.page.detach(handle.id)
    }

    /// Scroll to an absolute offset and run the scroll checks
    pub fn scroll_to(&mut self, offset: f64) -> Result<Vec<(ControllerId, Transition)>, TestError> {
        self.doc.scroll_to(offset);
        Ok(self.page.on_scroll()?)
    }

    /// Scroll by a relative amount and run the scroll checks
    pub fn scroll_by(&mut self, delta: f64) -> Result<Vec<(ControllerId, Transition)>, TestError> {
        self.doc.scroll_by(delta);
        Ok(self.page.on_scroll()?)
    }

    /// Like `scroll_to`, but reports transitions by element label
    pub fn scroll_labeled(&mut self, offset: f64) -> Result<Vec<(String, Transition)>, TestError> {
        let transitions = self.scroll_to(offset)?;
        Ok(transitions
            .into_iter()
            .map(|(id, transition)| (self.label_of(id), transition))
            .collect())
    }

    pub fn scroll_offset(&self) -> f64 {
        self.doc.scroll_offset()
    }

    pub fn max_scroll(&self) -> f64 {
        self.doc.max_scroll()
    }

    pub fn handles(&self) -> &[StickyHandle] {
        &self.handles
    }

    pub fn handle(&self, label: &str) -> Option<&StickyHandle> {
        self.handles.iter().find(|h| h.label == label)
    }

    pub fn state(&self, handle: &StickyHandle) -> Result<StickyState, TestError> {
        Ok(self.page.state(handle.id)?)
    }

    /// Content wrapper of a sticky element
    pub fn content(&self, handle: &StickyHandle) -> Option<NodeId> {
        self.page.controller(handle.id).map(|c| c.content())
    }

    /// Classes and styles of the host and its content wrapper
    pub fn visuals(&self, handle: &StickyHandle) -> Result<(NodeSnapshot, NodeSnapshot), TestError> {
        let content = self
            .content(handle)
            .ok_or(StickyError::UnknownController(handle.id))?;
        Ok((self.doc.snapshot(handle.host)?, self.doc.snapshot(content)?))
    }

    /// Viewport-relative top of a node
    pub fn top_of(&self, node: NodeId) -> Result<f64, TestError> {
        Ok(self.doc.bounding_top(&node)?)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            scroll_offset: self.doc.scroll_offset(),
            registry: self.page.registry().snapshot(),
            states: self
                .handles
                .iter()
                .filter_map(|h| self.page.state(h.id).ok().map(|s| (h.label.clone(), s)))
                .collect(),
            active: self.page.active_controller().map(|id| self.label_of(id)),
        }
    }

    fn label_of(&self, id: ControllerId) -> String {
        self.handles
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.label.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
