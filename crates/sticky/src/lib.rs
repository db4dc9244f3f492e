//! Sticky header library
//!
//! Elements attach to the top of the viewport as they scroll past it. Only one
//! element is stuck at a time: a newly stuck element supersedes the previous
//! one, which is retired with the "unstuck" class until the newer element
//! scrolls back down.
//!
//! # Modules
//!
//! - `registry`: ordered stuck-element bookkeeping and the change feed
//! - `controller`: per-element state machine driven by scroll and the feed
//! - `page`: owns the controllers of one scroll container
//! - `render`: rendering boundary trait
//! - `backend`: rendering boundary implementations (headless document)
//! - `layout`: pure flow layout math used by the headless document
//! - `config`: per-element configuration and overrides

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod layout;
pub mod page;
pub mod registry;
pub mod render;

pub use config::{StickyConfig, StickyOverrides};
pub use controller::{ElementController, StickyState, Transition};
pub use error::StickyError;
pub use page::{ControllerId, StickyPage};
pub use registry::{ElementId, Registry, StuckElement, Subscription};
pub use render::{RenderError, Renderer};
