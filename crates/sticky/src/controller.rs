//! Per-element sticky controller
//!
//! One controller drives one sticky element. It checks the element's position
//! on every scroll, registers itself with the [`Registry`] while stuck, and
//! listens to the registry feed so it can retire or reactivate itself when
//! *other* elements stick and unstick.
//!
//! State machine:
//!
//! ```text
//!   Free ──top <= 0──▶ Active ──newer element stuck──▶ Superseded
//!    ▲                  │  ▲                             │
//!    └────top > 0───────┘  └──newer element released─────┘
//! ```
//!
//! A superseded element is not position-checked until it is reactivated.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::config::{StickyConfig, CONTENT_CLASS};
use crate::error::StickyError;
use crate::layout;
use crate::registry::{ElementId, Registry, StuckElement, Subscription};
use crate::render::{RenderError, Renderer};

/// Styles put on the content wrapper when `use_default_style` is set
const FIXED_STYLES: [(&str, &str); 4] = [
    ("position", "fixed"),
    ("top", "0px"),
    ("left", "0px"),
    ("right", "0px"),
];

/// Where a controller is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StickyState {
    /// In normal flow, not registered
    #[default]
    Free,

    /// Stuck to the viewport top and on top of the stack
    Active,

    /// Stuck earlier, then displaced by a newer element ("unstuck")
    Superseded,
}

/// What a scroll check or feed update did to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    None,
    /// Free -> Active after scrolling past the top
    Stuck,
    /// Active -> Free after scrolling back down
    Released,
    /// Active -> Superseded because a newer element stuck
    Superseded,
    /// Superseded -> Active because the newer element was released
    Reactivated,
}

impl Transition {
    pub fn is_none(self) -> bool {
        self == Transition::None
    }
}

struct ControllerInner<R: Renderer> {
    renderer: Rc<R>,
    host: R::Node,
    content: R::Node,
    config: StickyConfig,
    state: StickyState,
    element_id: Option<ElementId>,
    /// Transitions applied from the feed, not yet collected
    feed_transitions: Vec<Transition>,
}

impl<R: Renderer> ControllerInner<R> {
    fn measure(&self) -> Result<f64, RenderError> {
        self.renderer.bounding_top(&self.host)
    }

    fn stick(&self, remove_unstuck_class: bool) -> Result<(), RenderError> {
        let renderer = &self.renderer;
        renderer.add_class(&self.host, &self.config.stuck_class)?;

        // Hold the host open at the content height so the page doesn't jump
        let height = renderer.offset_height(&self.content)?;
        renderer.set_style(&self.host, "height", &layout::format_px(height))?;

        if self.config.use_default_style {
            for (property, value) in FIXED_STYLES {
                renderer.set_style(&self.content, property, value)?;
            }
        }
        if remove_unstuck_class {
            renderer.remove_class(&self.host, &self.config.unstuck_class)?;
        }
        Ok(())
    }

    fn unstick(&self, add_unstuck_class: bool) -> Result<(), RenderError> {
        let renderer = &self.renderer;
        renderer.remove_class(&self.host, &self.config.stuck_class)?;
        renderer.remove_style(&self.host, "height")?;

        if self.config.use_default_style {
            for (property, _) in FIXED_STYLES {
                renderer.remove_style(&self.content, property)?;
            }
        }
        if add_unstuck_class {
            renderer.add_class(&self.host, &self.config.unstuck_class)?;
        }
        Ok(())
    }

    fn apply_feed(&mut self, elements: &[StuckElement]) -> Result<Transition, RenderError> {
        let Some(id) = self.element_id else {
            return Ok(Transition::None);
        };
        let Some(entry) = elements.iter().find(|entry| entry.id == id) else {
            return Ok(Transition::None);
        };

        let has_unstuck = self.state == StickyState::Superseded;
        if entry.unstuck == has_unstuck {
            return Ok(Transition::None);
        }

        let transition = if entry.unstuck {
            self.state = StickyState::Superseded;
            self.unstick(true)?;
            Transition::Superseded
        } else {
            self.state = StickyState::Active;
            self.stick(true)?;
            Transition::Reactivated
        };

        tracing::debug!(%id, ?transition, "sticky element updated from registry");
        self.feed_transitions.push(transition);
        Ok(transition)
    }
}

/// Drives one sticky element
///
/// Dropping the controller unsubscribes from the registry and, if the element
/// is registered, removes it.
pub struct ElementController<R: Renderer + 'static> {
    inner: Rc<RefCell<ControllerInner<R>>>,
    registry: Rc<Registry>,
    subscription: Option<Subscription>,
}

impl<R: Renderer + 'static> ElementController<R> {
    /// Attach a controller to `host`.
    ///
    /// Moves the host's children into a `div.sticky-content` wrapper,
    /// subscribes to the registry, and runs the first position check.
    pub fn mount(
        renderer: Rc<R>,
        registry: Rc<Registry>,
        host: R::Node,
        config: StickyConfig,
    ) -> Result<Self, StickyError> {
        let content = renderer.wrap_children(&host, CONTENT_CLASS)?;

        let inner = Rc::new(RefCell::new(ControllerInner {
            renderer,
            host,
            content,
            config,
            state: StickyState::Free,
            element_id: None,
            feed_transitions: Vec::new(),
        }));

        let subscription = registry.subscribe(feed_handler(Rc::downgrade(&inner)));

        let mut controller = Self {
            inner,
            registry,
            subscription: Some(subscription),
        };
        controller.on_scroll()?;
        Ok(controller)
    }

    /// Re-check the element position after the viewport scrolled
    pub fn on_scroll(&mut self) -> Result<Transition, StickyError> {
        let (state, offset_top) = {
            let inner = self.inner.borrow();
            if inner.state == StickyState::Superseded {
                return Ok(Transition::None);
            }
            (inner.state, inner.measure()?)
        };

        // The registry broadcasts synchronously, so no borrow of `inner` may be
        // held while calling into it
        match state {
            StickyState::Free if offset_top <= 0.0 => {
                let id = self.registry.add_stuck_element();
                let mut inner = self.inner.borrow_mut();
                inner.element_id = Some(id);
                inner.state = StickyState::Active;
                inner.stick(false)?;
                tracing::debug!(%id, offset_top, "sticky element stuck");
                Ok(Transition::Stuck)
            }
            StickyState::Active if offset_top > 0.0 => {
                // The entry must go even if unstick fails below
                let id = {
                    let mut inner = self.inner.borrow_mut();
                    inner.state = StickyState::Free;
                    inner.element_id.take()
                };
                if let Some(id) = id {
                    self.registry.remove_stuck_element(id);
                    tracing::debug!(%id, offset_top, "sticky element released");
                }
                self.inner.borrow().unstick(false)?;
                Ok(Transition::Released)
            }
            _ => Ok(Transition::None),
        }
    }

    /// Tear the controller down now (same as dropping it)
    pub fn teardown(self) {}

    pub fn state(&self) -> StickyState {
        self.inner.borrow().state
    }

    /// Registry id while the element is registered
    pub fn element_id(&self) -> Option<ElementId> {
        self.inner.borrow().element_id
    }

    pub fn host(&self) -> R::Node {
        self.inner.borrow().host.clone()
    }

    /// The `div.sticky-content` wrapper created at mount
    pub fn content(&self) -> R::Node {
        self.inner.borrow().content.clone()
    }

    pub fn config(&self) -> StickyConfig {
        self.inner.borrow().config.clone()
    }

    /// Transitions caused by other elements since the last call
    pub fn take_feed_transitions(&self) -> Vec<Transition> {
        std::mem::take(&mut self.inner.borrow_mut().feed_transitions)
    }

    fn release(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        subscription.unsubscribe();

        let id = self.inner.borrow_mut().element_id.take();
        if let Some(id) = id {
            self.registry.remove_stuck_element(id);
        }
        tracing::debug!(element_id = ?id, "sticky controller torn down");
    }
}

impl<R: Renderer + 'static> Drop for ElementController<R> {
    fn drop(&mut self) {
        self.release();
    }
}

fn feed_handler<R: Renderer + 'static>(
    inner: Weak<RefCell<ControllerInner<R>>>,
) -> impl FnMut(&[StuckElement]) + 'static {
    move |elements| {
        let Some(cell) = inner.upgrade() else {
            return;
        };
        let Ok(mut inner) = cell.try_borrow_mut() else {
            tracing::error!("sticky controller busy during registry broadcast, update dropped");
            return;
        };
        if let Err(e) = inner.apply_feed(elements) {
            tracing::warn!(error = %e, "failed to apply registry update");
        }
    }
}
