#![no_main]
//! Fuzz target for registry operation sequences
//!
//! Interprets each input byte as an add or a remove and checks the stacking
//! invariant after every step.

use std::cell::Cell;
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;

use sticky::Registry;

fuzz_target!(|data: &[u8]| {
    let registry = Rc::new(Registry::new());
    let broadcasts = Rc::new(Cell::new(0usize));
    let _feed = {
        let broadcasts = Rc::clone(&broadcasts);
        registry.subscribe(move |list| {
            assert!(list.iter().filter(|e| !e.unstuck).count() <= 1);
            broadcasts.set(broadcasts.get() + 1);
        })
    };

    let mut issued = Vec::new();
    let mut expected_broadcasts = 0;

    for &byte in data {
        if byte & 1 == 0 {
            issued.push(registry.add_stuck_element());
            expected_broadcasts += 1;
        } else if !issued.is_empty() {
            let id = issued[(byte >> 1) as usize % issued.len()];
            if registry.remove_stuck_element(id) {
                expected_broadcasts += 1;
            }
        }

        let list = registry.snapshot();
        if let Some(top) = list.last() {
            assert!(!top.unstuck, "top entry must be active: {:?}", list);
        }
        assert!(list[..list.len().saturating_sub(1)].iter().all(|e| e.unstuck));
    }

    assert_eq!(broadcasts.get(), expected_broadcasts);
});
