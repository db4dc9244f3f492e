//! Test assertions for sticky page state

use sticky::StickyState;

use crate::headless::{PageSnapshot, StickyHandle, TestPage};

/// Assert that at most one registry entry is active and that it is on top
pub fn assert_only_top_active(snapshot: &PageSnapshot) {
    let active: Vec<_> = snapshot.registry.iter().filter(|e| !e.unstuck).collect();
    assert!(
        active.len() <= 1,
        "more than one active registry entry: {:?}",
        snapshot.registry
    );
    if let Some(top) = snapshot.registry.last() {
        assert!(
            !top.unstuck,
            "top registry entry should be active: {:?}",
            snapshot.registry
        );
    }
}

/// Assert that controller states agree with the registry
///
/// Every registered element is either Active (top entry) or Superseded, and
/// the number of registered elements matches the registry length.
pub fn assert_states_match_registry(snapshot: &PageSnapshot) {
    let active = snapshot.count_in(StickyState::Active);
    let superseded = snapshot.count_in(StickyState::Superseded);

    assert_eq!(
        active + superseded,
        snapshot.registry.len(),
        "registered controllers ({} active, {} superseded) vs registry {:?}",
        active,
        superseded,
        snapshot.registry
    );
    assert!(active <= 1, "more than one active controller: {:?}", snapshot.states);
    assert_eq!(
        active == 1,
        snapshot.active.is_some(),
        "active controller {:?} disagrees with states {:?}",
        snapshot.active,
        snapshot.states
    );
}

/// Assert that an element carries only the classes and styles it had before sticking
pub fn assert_visuals_restored(page: &TestPage, handle: &StickyHandle) {
    let (host, content) = page.visuals(handle).expect("element visuals");

    assert!(
        host.styles.is_empty(),
        "{} host still has inline styles: {:?}",
        handle.label,
        host.styles
    );
    assert!(
        host.classes.is_empty(),
        "{} host still has classes: {:?}",
        handle.label,
        host.classes
    );
    assert!(
        content.styles.is_empty(),
        "{} content still has inline styles: {:?}",
        handle.label,
        content.styles
    );
}

/// Assert that the element is pinned: stuck class, fixed height, content at the top
pub fn assert_pinned(page: &TestPage, handle: &StickyHandle) {
    let config = page
        .page()
        .controller(handle.id)
        .expect("controller attached")
        .config();
    let doc = page.doc();
    let content = page.content(handle).expect("content wrapper");

    assert!(
        doc.has_class(handle.host, &config.stuck_class),
        "{} should have class {}",
        handle.label,
        config.stuck_class
    );
    assert!(
        doc.style(handle.host, "height").is_some(),
        "{} should have a pinned height",
        handle.label
    );
    if config.use_default_style {
        let top = page.top_of(content).expect("content top");
        assert_eq!(top, 0.0, "{} content should sit at the viewport top", handle.label);
    }
}

/// Run every invariant check against the current page state
pub fn assert_invariants(page: &TestPage) {
    let snapshot = page.snapshot();
    assert_only_top_active(&snapshot);
    assert_states_match_registry(&snapshot);
}
