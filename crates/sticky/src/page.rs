//! Sticky page
//!
//! Owns everything sticky inside one scroll container: the shared registry,
//! the renderer handle, and one controller per sticky element. The host's
//! scroll listener calls [`StickyPage::on_scroll`] once per scroll event.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::config::{StickyConfig, StickyOverrides};
use crate::controller::{ElementController, StickyState, Transition};
use crate::error::StickyError;
use crate::registry::Registry;
use crate::render::Renderer;

/// Identifier of a controller attached to a [`StickyPage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ControllerId(u32);

impl ControllerId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller {}", self.0)
    }
}

/// Controllers and registry of one scroll container
pub struct StickyPage<R: Renderer + 'static> {
    renderer: Rc<R>,
    registry: Rc<Registry>,
    defaults: StickyConfig,

    /// Attach order; scroll checks run in this order
    controllers: Vec<(ControllerId, ElementController<R>)>,

    next_id: u32,
}

impl<R: Renderer + 'static> StickyPage<R> {
    /// Create a page with the default configuration
    pub fn new(renderer: Rc<R>) -> Self {
        Self::with_config(renderer, StickyConfig::default())
    }

    /// Create a page whose elements start from `defaults` before overrides
    pub fn with_config(renderer: Rc<R>, defaults: StickyConfig) -> Self {
        Self {
            renderer,
            registry: Rc::new(Registry::new()),
            defaults: defaults.sanitize(),
            controllers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn renderer(&self) -> &Rc<R> {
        &self.renderer
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn defaults(&self) -> &StickyConfig {
        &self.defaults
    }

    /// Make `host` sticky.
    ///
    /// The element is checked against the current scroll position right away,
    /// so attaching an element that is already past the top sticks it.
    pub fn attach(&mut self, host: R::Node, overrides: &StickyOverrides) -> Result<ControllerId, StickyError> {
        let config = self.defaults.merged(overrides);
        let controller = ElementController::mount(
            Rc::clone(&self.renderer),
            Rc::clone(&self.registry),
            host,
            config,
        )?;

        let id = ControllerId(self.next_id);
        self.next_id += 1;

        // Mounting may already have superseded an element; those updates
        // belong to this attach, not to the next scroll
        for (_, other) in &self.controllers {
            other.take_feed_transitions();
        }

        tracing::debug!(%id, state = ?controller.state(), "sticky controller attached");
        self.controllers.push((id, controller));
        Ok(id)
    }

    /// Tear down one controller. Returns false if the id is unknown.
    pub fn detach(&mut self, id: ControllerId) -> bool {
        let Some(index) = self.controllers.iter().position(|(cid, _)| *cid == id) else {
            return false;
        };
        let (_, controller) = self.controllers.remove(index);
        controller.teardown();

        for (_, other) in &self.controllers {
            other.take_feed_transitions();
        }
        tracing::debug!(%id, "sticky controller detached");
        true
    }

    /// Run the position checks for one scroll event.
    ///
    /// Every controller is checked once in attach order. If that reactivated
    /// an element which was skipped while superseded, another pass runs so
    /// the element can see the current scroll position; a single large jump
    /// back to the top unwinds the whole stack.
    ///
    /// Returns each transition that happened, including the ones applied to
    /// other elements through the registry feed, in the order they happened.
    pub fn on_scroll(&mut self) -> Result<Vec<(ControllerId, Transition)>, StickyError> {
        let mut transitions = Vec::new();

        // Each extra pass releases at least one registry entry
        for _ in 0..=self.controllers.len() {
            let start = transitions.len();
            self.scroll_pass(&mut transitions)?;

            let reactivated = transitions[start..]
                .iter()
                .any(|(_, transition)| *transition == Transition::Reactivated);
            if !reactivated {
                break;
            }
        }

        if !transitions.is_empty() {
            tracing::debug!(count = transitions.len(), active = ?self.active_controller(), "scroll transitions");
        }
        Ok(transitions)
    }

    fn scroll_pass(&mut self, transitions: &mut Vec<(ControllerId, Transition)>) -> Result<(), StickyError> {
        for index in 0..self.controllers.len() {
            let (id, controller) = &mut self.controllers[index];
            let transition = controller.on_scroll()?;
            if !transition.is_none() {
                transitions.push((*id, transition));
            }

            for (other_id, other) in &self.controllers {
                transitions.extend(
                    other
                        .take_feed_transitions()
                        .into_iter()
                        .map(|transition| (*other_id, transition)),
                );
            }
        }
        Ok(())
    }

    pub fn controller(&self, id: ControllerId) -> Option<&ElementController<R>> {
        self.controllers
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, controller)| controller)
    }

    pub fn state(&self, id: ControllerId) -> Result<StickyState, StickyError> {
        self.controller(id)
            .map(ElementController::state)
            .ok_or(StickyError::UnknownController(id))
    }

    /// Controller whose element is currently stuck on top, if any
    pub fn active_controller(&self) -> Option<ControllerId> {
        let active = self.registry.active()?;
        self.controllers
            .iter()
            .find(|(_, controller)| controller.element_id() == Some(active))
            .map(|(id, _)| *id)
    }

    pub fn controller_ids(&self) -> Vec<ControllerId> {
        self.controllers.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl<R: Renderer + 'static> Drop for StickyPage<R> {
    fn drop(&mut self) {
        // Later controllers first, so each removal only touches the top
        while let Some((_, controller)) = self.controllers.pop() {
            controller.teardown();
        }
        self.registry.clear_subscribers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessDocument;

    fn page_with_two_headers() -> (StickyPage<HeadlessDocument>, ControllerId, ControllerId) {
        let doc = Rc::new(HeadlessDocument::new(400.0));
        let root = doc.root();
        doc.add_block(root, "intro", 200.0).unwrap();
        let a = doc.add_container(root, "a").unwrap();
        doc.add_block(a, "a-text", 30.0).unwrap();
        doc.add_block(root, "gap", 300.0).unwrap();
        let b = doc.add_container(root, "b").unwrap();
        doc.add_block(b, "b-text", 30.0).unwrap();
        doc.add_block(root, "tail", 1000.0).unwrap();

        let mut page = StickyPage::new(doc);
        let a = page.attach(a, &StickyOverrides::default()).unwrap();
        let b = page.attach(b, &StickyOverrides::default()).unwrap();
        (page, a, b)
    }

    #[test]
    fn scroll_reports_own_and_feed_transitions() {
        let (mut page, a, b) = page_with_two_headers();

        page.renderer().scroll_to(200.0);
        assert_eq!(page.on_scroll().unwrap(), vec![(a, Transition::Stuck)]);

        page.renderer().scroll_to(530.0);
        assert_eq!(
            page.on_scroll().unwrap(),
            vec![(b, Transition::Stuck), (a, Transition::Superseded)]
        );
        assert_eq!(page.active_controller(), Some(b));

        page.renderer().scroll_to(500.0);
        assert_eq!(
            page.on_scroll().unwrap(),
            vec![(b, Transition::Released), (a, Transition::Reactivated)]
        );
        assert_eq!(page.active_controller(), Some(a));
    }

    #[test]
    fn jump_to_top_unwinds_stack() {
        let (mut page, a, b) = page_with_two_headers();
        page.renderer().scroll_to(530.0);
        page.on_scroll().unwrap();

        page.renderer().scroll_to(0.0);
        assert_eq!(
            page.on_scroll().unwrap(),
            vec![
                (b, Transition::Released),
                (a, Transition::Reactivated),
                (a, Transition::Released),
            ]
        );
        assert!(page.registry().is_empty());
        assert_eq!(page.state(a).unwrap(), StickyState::Free);
    }

    #[test]
    fn detach_unknown_is_false() {
        let (mut page, a, _) = page_with_two_headers();

        assert!(page.detach(a));
        assert!(!page.detach(a));
        assert!(matches!(page.state(a), Err(StickyError::UnknownController(_))));
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn overrides_merge_over_page_defaults() {
        let doc = Rc::new(HeadlessDocument::new(400.0));
        let host = doc.add_container(doc.root(), "host").unwrap();
        let defaults = StickyConfig {
            unstuck_class: "gone".to_string(),
            ..Default::default()
        };
        let mut page = StickyPage::with_config(doc, defaults);

        let overrides = StickyOverrides {
            stuck_class: Some("pinned".to_string()),
            ..Default::default()
        };
        let id = page.attach(host, &overrides).unwrap();

        let config = page.controller(id).unwrap().config();
        assert_eq!(config.stuck_class, "pinned");
        assert_eq!(config.unstuck_class, "gone");
    }

    #[test]
    fn dropping_page_clears_registry() {
        let (mut page, _, _) = page_with_two_headers();
        page.renderer().scroll_to(530.0);
        page.on_scroll().unwrap();
        let registry = Rc::clone(page.registry());

        drop(page);

        assert!(registry.is_empty());
        assert_eq!(registry.subscriber_count(), 0);
    }
}
