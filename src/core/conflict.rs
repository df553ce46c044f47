//! Shadowed-trigger detection
//!
//! The matching engine stops at the first match in registry order, so a
//! literal definition never fires when an earlier one matches every input
//! it would match. The earlier definition covers a later one when:
//! - Its trigger is equal under a case rule at least as loose
//! - It fires immediately, or both wait for an end character
//! - It allows in-word matches whenever the later one does
//! - It stays active under suspend whenever the later one does
//!
//! Mute mode delivers input in batches ending at an end character, which
//! gives a later end-character definition a chance behind an immediate one.
//! The report assumes unmuted typing.
//!
//! # Performance
//! - Build index: O(n) where n = number of registered definitions
//! - Check coverage: O(m²) within each group of m same-letter triggers

use std::collections::HashMap;

use crate::core::registry::Registry;
use crate::core::types::Hotstring;

/// Represents a definition together with the later ones it shadows.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The trigger text as written by the winning definition
    pub trigger: String,

    /// Label of the definition that fires
    pub winner: String,

    /// Labels of the definitions that never fire (always 1 or more)
    pub shadowed: Vec<String>,
}

/// True when `earlier` fires on every input `later` would fire on
fn covers(earlier: &Hotstring, later: &Hotstring) -> bool {
    let (Some(earlier_trigger), Some(later_trigger)) =
        (earlier.literal_trigger(), later.literal_trigger())
    else {
        return false;
    };
    let (a, b) = (&earlier.options, &later.options);

    let same_trigger = if a.case_sensitive {
        b.case_sensitive && earlier_trigger == later_trigger
    } else {
        earlier_trigger.to_lowercase() == later_trigger.to_lowercase()
    };

    same_trigger
        && (a.fire_immediately || !b.fire_immediately)
        && (a.inside_word || !b.inside_word)
        && (a.suspend_exempt || !b.suspend_exempt)
}

/// Finds every literal definition shadowed by an earlier one.
///
/// A shadowed definition is attributed to the first definition covering
/// it. Conflicts are returned in registry order of their winning definition.
pub fn find_conflicts(registry: &Registry) -> Vec<Conflict> {
    let mut groups: HashMap<String, Vec<&Hotstring>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for hotstring in registry.iter() {
        let Some(trigger) = hotstring.literal_trigger() else {
            continue;
        };

        let key = trigger.to_lowercase();
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(hotstring);
    }

    let mut conflicts = Vec::new();

    for key in order {
        let Some(group) = groups.remove(&key) else {
            continue;
        };

        // Winner index -> shadowed labels, in winner order
        let mut shadowed_by: Vec<(usize, Vec<String>)> = Vec::new();

        for (index, later) in group.iter().enumerate() {
            let Some(winner) = group[..index].iter().position(|earlier| covers(earlier, later)) else {
                continue;
            };

            match shadowed_by.iter_mut().find(|(w, _)| *w == winner) {
                Some((_, labels)) => labels.push(later.display_label()),
                None => shadowed_by.push((winner, vec![later.display_label()])),
            }
        }

        shadowed_by.sort_by_key(|(winner, _)| *winner);
        for (winner, shadowed) in shadowed_by {
            let winner = group[winner];
            conflicts.push(Conflict {
                trigger: winner.literal_trigger().unwrap_or_default().to_string(),
                winner: winner.display_label(),
                shadowed,
            });
        }
    }

    conflicts
}
