//! Test fixtures for common page layouts

use crate::headless::{StickyHandle, TestPage};

/// Standard viewport height
pub const TEST_VIEWPORT: f64 = 600.0;

/// Height of the block above the first header
pub const INTRO_HEIGHT: f64 = 100.0;

/// Height of each sticky header's content
pub const HEADER_HEIGHT: f64 = 40.0;

/// Height of the section below each header
pub const SECTION_HEIGHT: f64 = 500.0;

/// Height of the block after the last section
pub const TAIL_HEIGHT: f64 = 1000.0;

/// Document position of header `index` in [`stacked_headers`]
pub fn header_offset(index: usize) -> f64 {
    INTRO_HEIGHT + index as f64 * (HEADER_HEIGHT + SECTION_HEIGHT)
}

/// Page with one sticky header between an intro and a long tail
///
/// Layout: intro(100) | header-0(40) | tail(1000)
pub fn single_header() -> (TestPage, StickyHandle) {
    let mut page = TestPage::new(TEST_VIEWPORT);
    page.add_block("intro", INTRO_HEIGHT).expect("add intro");
    let header = page.add_sticky("header-0", HEADER_HEIGHT).expect("add header");
    page.add_block("tail", TAIL_HEIGHT).expect("add tail");
    (page, header)
}

/// Page with `count` sticky headers, each followed by a long section
///
/// Layout: intro(100) | header-i(40) section-i(500) ... | tail(1000)
pub fn stacked_headers(count: usize) -> (TestPage, Vec<StickyHandle>) {
    let mut page = TestPage::new(TEST_VIEWPORT);
    page.add_block("intro", INTRO_HEIGHT).expect("add intro");

    let headers = (0..count)
        .map(|i| {
            let header = page
                .add_sticky(&format!("header-{}", i), HEADER_HEIGHT)
                .expect("add header");
            page.add_block(&format!("section-{}", i), SECTION_HEIGHT)
                .expect("add section");
            header
        })
        .collect();

    page.add_block("tail", TAIL_HEIGHT).expect("add tail");
    (page, headers)
}

/// [`stacked_headers`] scrolled so that every header has stuck in turn
///
/// The last header is active and all earlier ones are superseded.
pub fn all_headers_passed(count: usize) -> (TestPage, Vec<StickyHandle>) {
    let (mut page, headers) = stacked_headers(count);
    for i in 0..count {
        page.scroll_to(header_offset(i)).expect("scroll past header");
    }
    (page, headers)
}
