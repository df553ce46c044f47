// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordered hotstring registry
//!
//! Definitions are kept sorted by priority (descending), then literal
//! trigger length (descending, patterns count as 0). The sort is stable,
//! so equal keys keep insertion order. The matching engine relies on this
//! order: the first matching definition wins.

use std::cmp::Reverse;
use std::rc::Rc;

use crate::core::types::Hotstring;

/// Ordered collection of registered hotstrings.
///
/// Entries are reference-counted so the engine can hold on to a fired
/// definition while it mutates its own state.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Rc<Hotstring>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a definition and restores the ordering.
    pub fn register(&mut self, hotstring: Hotstring) {
        self.entries.push(Rc::new(hotstring));
        self.entries
            .sort_by_key(|h| (Reverse(h.options.priority), Reverse(h.trigger_len())));
    }

    /// Removes every definition.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the first definition, in registry order, satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<Rc<Hotstring>>
    where
        P: FnMut(&Hotstring) -> bool,
    {
        self.entries.iter().find(|h| predicate(h)).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Hotstring>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DefinitionOptions, HotstringKind};

    fn literal(trigger: &str, priority: i32) -> Hotstring {
        Hotstring {
            kind: HotstringKind::Literal {
                trigger: trigger.to_string(),
            },
            replacement: "x".into(),
            options: DefinitionOptions {
                priority,
                ..DefinitionOptions::default()
            },
            label: Some(format!("::{}", trigger)),
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.find(|_| true).is_none());
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut registry = Registry::new();
        registry.register(literal("a", 0));
        registry.register(literal("b", 0));
        registry.clear();
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_find_returns_first_in_order() {
        let mut registry = Registry::new();
        registry.register(literal("ab", 0));
        registry.register(literal("abc", 0));

        let found = registry
            .find(|h| h.literal_trigger().is_some_and(|t| t.starts_with("ab")))
            .unwrap();
        assert_eq!(found.literal_trigger(), Some("abc"));
    }
}
