//! Registry ordering tests
//!
//! Property tests check the ordering invariant for arbitrary mixes of
//! literal and pattern definitions.

use proptest::prelude::*;

use crate::core::{
    parser::{parse_hotstring, parse_pattern},
    registry::Registry,
    types::{Callback, PatternOptions},
};

/// (priority, trigger length, is_pattern)
fn definition_strategy() -> impl Strategy<Value = (i32, usize, bool)> {
    (-3i32..=3, 1usize..6, prop::bool::weighted(0.2))
}

fn build_registry(specs: &[(i32, usize, bool)]) -> Registry {
    let mut registry = Registry::new();

    for (index, &(priority, len, is_pattern)) in specs.iter().enumerate() {
        let hotstring = if is_pattern {
            let callback = Callback::new(format!("#{}", index), |_| Ok(None));
            let options = PatternOptions {
                priority,
                ..PatternOptions::default()
            };
            parse_pattern("x+", callback, options).unwrap()
        } else {
            let definition = format!(":P{}:{}", priority, "a".repeat(len));
            parse_hotstring(&definition, format!("#{}", index).into()).unwrap()
        };
        registry.register(hotstring);
    }

    registry
}

/// Insertion index recovered from the searchable text
fn insertion_index(text: &str) -> usize {
    text.trim_start_matches('#').parse().unwrap()
}

#[test]
fn test_priority_beats_length() {
    let registry = build_registry(&[(0, 5, false), (1, 1, false)]);
    let order: Vec<i32> = registry.iter().map(|h| h.options.priority).collect();
    assert_eq!(order, vec![1, 0]);
}

#[test]
fn test_pattern_sorts_after_literals_of_same_priority() {
    let registry = build_registry(&[(0, 0, true), (0, 1, false)]);
    let first = registry.iter().next().unwrap();
    assert!(!first.is_pattern());
}

proptest! {
    #[test]
    fn registry_order_holds(specs in prop::collection::vec(definition_strategy(), 0..24)) {
        let registry = build_registry(&specs);
        let entries: Vec<_> = registry.iter().collect();

        prop_assert_eq!(entries.len(), specs.len());

        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let key_a = (a.options.priority, a.trigger_len());
            let key_b = (b.options.priority, b.trigger_len());

            prop_assert!(key_a >= key_b);

            if key_a == key_b {
                let index_a = insertion_index(a.replacement.searchable_text());
                let index_b = insertion_index(b.replacement.searchable_text());
                prop_assert!(index_a < index_b);
            }
        }
    }
}
