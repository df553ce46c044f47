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

//! Trigger matching
//!
//! Runs once per accepted character, after it was appended to the buffer.
//! The registry is scanned in order and the first definition that matches
//! wins; nothing else is considered for that keystroke.
//!
//! # Literal triggers
//! - `*` definitions compare the tail of the buffer against the trigger
//! - Other definitions only run when the newest character is an end
//!   character, and compare the text just before it
//!
//! Unless `?` is set, the character before the matched text must not be a
//! word character (letter, digit, underscore). The start of the buffer
//! counts as a boundary.
//!
//! # Pattern triggers
//! The compiled expression is anchored to the end of the buffer, so only
//! matches touching the newest character count.

use std::collections::HashSet;
use std::rc::Rc;

use crate::core::registry::Registry;
use crate::core::types::{Hotstring, HotstringKind};

/// Characters that can close a pending literal trigger
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndChars(HashSet<char>);

impl EndChars {
    pub fn new(chars: &str) -> Self {
        Self(chars.chars().collect())
    }

    pub fn contains(&self, ch: char) -> bool {
        self.0.contains(&ch)
    }
}

/// What matched, with the data the executor needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchKind {
    Literal {
        /// Trigger text as actually typed
        typed: String,
        /// End character that closed the trigger, `None` for `*`
        boundary: Option<char>,
    },
    Pattern {
        matched: String,
        groups: Vec<String>,
    },
}

#[derive(Clone, Debug)]
pub struct Match {
    pub hotstring: Rc<Hotstring>,
    pub kind: MatchKind,
}

/// Scan `registry` against `buffer` and return the first match
///
/// `suspended` skips every definition that is not suspend-exempt.
pub fn find_match(
    registry: &Registry,
    buffer: &[char],
    end_chars: &EndChars,
    suspended: bool,
) -> Option<Match> {
    let last = *buffer.last()?;
    let closed_by_end_char = end_chars.contains(last);
    let mut content: Option<String> = None;

    for hotstring in registry.iter() {
        if suspended && !hotstring.options.suspend_exempt {
            continue;
        }

        let kind = match &hotstring.kind {
            HotstringKind::Pattern { regex, .. } => {
                let haystack = content.get_or_insert_with(|| buffer.iter().collect());
                regex.captures(haystack).map(|captures| MatchKind::Pattern {
                    matched: captures[0].to_string(),
                    groups: captures
                        .iter()
                        .skip(1)
                        .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect(),
                })
            }
            HotstringKind::Literal { trigger } => {
                if hotstring.options.fire_immediately {
                    match_literal(hotstring, trigger, buffer).map(|typed| MatchKind::Literal {
                        typed,
                        boundary: None,
                    })
                } else if closed_by_end_char {
                    match_literal(hotstring, trigger, &buffer[..buffer.len() - 1]).map(|typed| {
                        MatchKind::Literal {
                            typed,
                            boundary: Some(last),
                        }
                    })
                } else {
                    None
                }
            }
        };

        if let Some(kind) = kind {
            return Some(Match {
                hotstring: Rc::clone(hotstring),
                kind,
            });
        }
    }

    None
}

/// Compare the tail of `text` against `trigger`
///
/// Returns the typed tail on a match.
fn match_literal(hotstring: &Hotstring, trigger: &str, text: &[char]) -> Option<String> {
    let trigger: Vec<char> = trigger.chars().collect();
    let start = text.len().checked_sub(trigger.len())?;
    let tail = &text[start..];

    let equal = if hotstring.options.case_sensitive {
        tail == trigger.as_slice()
    } else {
        tail.iter()
            .zip(&trigger)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
    };

    let at_boundary = start == 0 || !is_word_char(text[start - 1]);

    if equal && (hotstring.options.inside_word || at_boundary) {
        Some(tail.iter().collect())
    } else {
        None
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::{parse_hotstring, parse_pattern};
    use crate::core::types::{Callback, PatternOptions};

    fn build_registry(definitions: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for definition in definitions {
            registry.register(parse_hotstring(definition, "out".into()).unwrap());
        }
        registry
    }

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn end_chars() -> EndChars {
        EndChars::new(" .\n")
    }

    fn matched_label(found: Option<Match>) -> Option<String> {
        found.and_then(|m| m.hotstring.label.clone())
    }

    #[test]
    fn test_boundary_trigger_needs_end_char() {
        let registry = build_registry(&["::btw"]);

        assert!(find_match(&registry, &chars("btw"), &end_chars(), false).is_none());

        let found = find_match(&registry, &chars("btw "), &end_chars(), false).unwrap();
        assert_eq!(
            found.kind,
            MatchKind::Literal {
                typed: "btw".to_string(),
                boundary: Some(' '),
            }
        );
    }

    #[test]
    fn test_fire_immediately_matches_tail() {
        let registry = build_registry(&[":*:btw"]);
        let found = find_match(&registry, &chars("xx btw"), &end_chars(), false).unwrap();
        assert_eq!(
            found.kind,
            MatchKind::Literal {
                typed: "btw".to_string(),
                boundary: None,
            }
        );
    }

    #[test]
    fn test_word_boundary_rule() {
        let registry = build_registry(&["::btw"]);
        assert!(find_match(&registry, &chars("abtw "), &end_chars(), false).is_none());
        assert!(find_match(&registry, &chars("_btw "), &end_chars(), false).is_none());
        assert!(find_match(&registry, &chars("(btw "), &end_chars(), false).is_some());

        let registry = build_registry(&[":?:btw"]);
        assert!(find_match(&registry, &chars("abtw "), &end_chars(), false).is_some());
    }

    #[test]
    fn test_case_rules() {
        let insensitive = build_registry(&["::btw"]);
        let found = find_match(&insensitive, &chars("BtW "), &end_chars(), false).unwrap();
        assert!(matches!(found.kind, MatchKind::Literal { ref typed, .. } if typed == "BtW"));

        let sensitive = build_registry(&[":C:btw"]);
        assert!(find_match(&sensitive, &chars("BTW "), &end_chars(), false).is_none());
        assert!(find_match(&sensitive, &chars("btw "), &end_chars(), false).is_some());
    }

    #[test]
    fn test_longer_trigger_preferred() {
        let registry = build_registry(&[":*?:tw", ":*?:btw"]);
        let found = find_match(&registry, &chars("btw"), &end_chars(), false);
        assert_eq!(matched_label(found), Some(":*?:btw".to_string()));
    }

    #[test]
    fn test_priority_preferred_over_length() {
        let registry = build_registry(&[":*?:btw", ":*?P1:tw"]);
        let found = find_match(&registry, &chars("btw"), &end_chars(), false);
        assert_eq!(matched_label(found), Some(":*?P1:tw".to_string()));
    }

    #[test]
    fn test_suspend_skips_non_exempt() {
        let registry = build_registry(&["::btw", ":S:omw"]);
        assert!(find_match(&registry, &chars("btw "), &end_chars(), true).is_none());
        assert!(find_match(&registry, &chars("omw "), &end_chars(), true).is_some());
    }

    #[test]
    fn test_pattern_captures_groups() {
        let mut registry = Registry::new();
        let callback = Callback::new("product", |_| Ok(None));
        registry.register(parse_pattern(r"(\d+)x(\d+)", callback, PatternOptions::default()).unwrap());

        let found = find_match(&registry, &chars("a 10x10"), &end_chars(), false).unwrap();
        assert_eq!(
            found.kind,
            MatchKind::Pattern {
                matched: "10x10".to_string(),
                groups: vec!["10".to_string(), "10".to_string()],
            }
        );

        assert!(find_match(&registry, &chars("10x10 "), &end_chars(), false).is_none());
    }

    #[test]
    fn test_empty_buffer_never_matches() {
        let registry = build_registry(&[":*:a"]);
        assert!(find_match(&registry, &[], &end_chars(), false).is_none());
    }
}
