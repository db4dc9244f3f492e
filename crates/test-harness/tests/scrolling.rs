//! Tests for scroll-driven sticking and releasing

use sticky::{StickyOverrides, StickyState, Transition};
use test_harness::assertions::{assert_invariants, assert_pinned, assert_visuals_restored};
use test_harness::fixtures::{self, header_offset, HEADER_HEIGHT, INTRO_HEIGHT};

#[test]
fn header_sticks_when_reaching_top() {
    let (mut page, header) = fixtures::single_header();

    assert!(page.scroll_to(INTRO_HEIGHT - 1.0).unwrap().is_empty());
    assert_eq!(page.state(&header).unwrap(), StickyState::Free);

    // Exactly at the top counts as past it
    let transitions = page.scroll_to(INTRO_HEIGHT).unwrap();
    assert_eq!(transitions, vec![(header.id, Transition::Stuck)]);
    assert_pinned(&page, &header);
}

#[test]
fn repeated_scroll_events_register_once() {
    let (mut page, header) = fixtures::single_header();

    page.scroll_to(INTRO_HEIGHT + 5.0).unwrap();
    for _ in 0..10 {
        assert!(page.scroll_by(3.0).unwrap().is_empty());
    }

    let snapshot = page.snapshot();
    assert_eq!(snapshot.registry.len(), 1);
    assert_eq!(snapshot.state_of(&header.label), Some(StickyState::Active));
}

#[test]
fn each_crossing_registers_a_new_entry() {
    let (mut page, header) = fixtures::single_header();

    page.scroll_to(INTRO_HEIGHT).unwrap();
    let first = page.page().controller(header.id).unwrap().element_id();
    page.scroll_to(0.0).unwrap();
    page.scroll_to(INTRO_HEIGHT).unwrap();
    let second = page.page().controller(header.id).unwrap().element_id();

    assert!(first.is_some() && second.is_some());
    assert_ne!(first, second);
    assert_eq!(page.snapshot().registry.len(), 1);
}

#[test]
fn stick_and_release_round_trip_restores_visuals() {
    let (mut page, header) = fixtures::single_header();
    let before = page.visuals(&header).unwrap();

    page.scroll_to(INTRO_HEIGHT + 200.0).unwrap();
    assert_ne!(page.visuals(&header).unwrap(), before);
    page.scroll_to(0.0).unwrap();

    assert_eq!(page.visuals(&header).unwrap(), before);
    assert_visuals_restored(&page, &header);
}

#[test]
fn sticking_does_not_shift_following_content() {
    let (mut page, _) = fixtures::single_header();
    let tail = page.doc().find("tail").unwrap();
    let tail_position = INTRO_HEIGHT + HEADER_HEIGHT;

    page.scroll_to(INTRO_HEIGHT + 20.0).unwrap();

    assert_eq!(page.top_of(tail).unwrap(), tail_position - (INTRO_HEIGHT + 20.0));
}

#[test]
fn superseded_header_ignores_scroll_until_reactivated() {
    let (mut page, headers) = fixtures::all_headers_passed(2);
    let (host_before, _) = page.visuals(&headers[0]).unwrap();

    // Still below header-1, so header-1 stays stuck; header-0 is not re-checked
    for offset in [header_offset(1) + 50.0, header_offset(1) + 300.0] {
        let transitions = page.scroll_labeled(offset).unwrap();
        assert!(transitions.is_empty(), "unexpected transitions {:?}", transitions);
        assert_eq!(page.state(&headers[0]).unwrap(), StickyState::Superseded);
    }
    assert_eq!(page.visuals(&headers[0]).unwrap().0, host_before);
}

#[test]
fn jump_to_top_releases_everything() {
    let (mut page, headers) = fixtures::all_headers_passed(4);

    page.scroll_to(0.0).unwrap();

    let snapshot = page.snapshot();
    assert!(snapshot.registry.is_empty());
    assert_eq!(snapshot.count_in(StickyState::Free), 4);
    for header in &headers {
        let (host, content) = page.visuals(header).unwrap();
        assert!(host.styles.is_empty());
        assert!(content.styles.is_empty());
        assert!(!page.doc().has_class(header.host, "stuck"));
    }
    assert_invariants(&page);
}

#[test]
fn custom_style_opt_out_keeps_content_in_flow() {
    let mut page = test_harness::TestPage::new(fixtures::TEST_VIEWPORT);
    page.add_block("intro", INTRO_HEIGHT).unwrap();
    let overrides = StickyOverrides {
        stuck_class: Some("custom-sticky-style".to_string()),
        use_default_style: Some(false),
        ..Default::default()
    };
    let header = page.add_sticky_with("header", HEADER_HEIGHT, &overrides).unwrap();
    page.add_block("tail", 1000.0).unwrap();

    page.scroll_to(INTRO_HEIGHT + 10.0).unwrap();

    let (host, content) = page.visuals(&header).unwrap();
    assert!(host.classes.contains(&"custom-sticky-style".to_string()));
    assert_eq!(host.styles, vec![("height".to_string(), "40px".to_string())]);
    assert!(content.styles.is_empty());
}

#[test]
fn header_at_document_top_sticks_on_attach() {
    let mut page = test_harness::TestPage::new(fixtures::TEST_VIEWPORT);

    // Top edge is already at the viewport top, which counts as past it
    let header = page.add_sticky("first", HEADER_HEIGHT).unwrap();
    page.add_block("tail", 2000.0).unwrap();

    assert_eq!(page.state(&header).unwrap(), StickyState::Active);
    assert_eq!(page.snapshot().registry.len(), 1);

    page.scroll_to(100.0).unwrap();
    assert!(page.scroll_to(0.0).unwrap().is_empty());
    assert_eq!(page.state(&header).unwrap(), StickyState::Active);
}

#[test]
fn header_below_viewport_stays_free() {
    let mut page = test_harness::TestPage::new(fixtures::TEST_VIEWPORT);
    page.add_block("intro", 2000.0).unwrap();
    page.scroll_to(1000.0).unwrap();

    let below = page.add_sticky("below", HEADER_HEIGHT).unwrap();

    assert_eq!(page.state(&below).unwrap(), StickyState::Free);
    assert!(page.snapshot().registry.is_empty());
}
