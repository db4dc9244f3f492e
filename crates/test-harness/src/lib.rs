//! Test harness for stickystack
//!
//! Provides infrastructure for testing sticky pages without a browser.
//!
//! # Modules
//!
//! - `headless`: page wrapper over the headless document
//! - `assertions`: common invariant checks
//! - `fixtures`: ready-made page layouts

pub mod assertions;
pub mod fixtures;
pub mod headless;

pub use headless::{PageSnapshot, StickyHandle, TestError, TestPage};
