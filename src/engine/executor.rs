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

//! Replacement output
//!
//! Helpers that turn a match into host edits:
//! - Backspace counting
//! - Case conformity against the typed trigger
//! - `{Enter}` / `{Tab}` / `{Space}` token translation
//! - `{Left n}` caret placement
//! - The instant replacement write itself

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::core::types::DefinitionOptions;
use crate::host::{CaretEdge, TextHost};

static SYMBOL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{(enter|tab|space)\}").expect("symbol token pattern should be valid regex")
});

static CARET_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{left\s+(\d+)\}").expect("caret marker pattern should be valid regex")
});

/// Characters to delete before writing output
pub fn backspace_count(trigger_len: usize, boundary_len: usize, options: &DefinitionOptions) -> usize {
    if options.no_backspace {
        0
    } else {
        trigger_len + boundary_len
    }
}

/// Adapt `output` to the case pattern of `typed`
///
/// - `BTW` → whole output uppercased
/// - `Btw` → first output character uppercased
/// - anything else → unchanged
pub fn conform_case(output: &str, typed: &str) -> String {
    let has_letter = typed.chars().any(char::is_alphabetic);

    if has_letter && typed.chars().all(|ch| !ch.is_lowercase()) {
        return output.to_uppercase();
    }

    let mut typed_chars = typed.chars();
    let first_upper = typed_chars.next().is_some_and(char::is_uppercase);
    let rest_lower = typed_chars.all(|ch| !ch.is_uppercase());

    if first_upper && rest_lower {
        let mut output_chars = output.chars();
        match output_chars.next() {
            Some(first) => first.to_uppercase().chain(output_chars).collect(),
            None => String::new(),
        }
    } else {
        output.to_string()
    }
}

/// Output text for a literal match before send-mode resolution
///
/// Applies case conformity and re-appends the end character.
pub fn literal_output(
    text: &str,
    typed: &str,
    boundary: Option<char>,
    options: &DefinitionOptions,
) -> String {
    let mut output = if options.case_sensitive || options.no_conformity {
        text.to_string()
    } else {
        conform_case(text, typed)
    };

    if let Some(boundary) = boundary {
        if !options.fire_immediately && !options.omit_end_char {
            output.push(boundary);
        }
    }

    output
}

/// Replace `{Enter}`, `{Tab}` and `{Space}` (any case) with their characters
pub fn translate_symbols(text: &str) -> String {
    SYMBOL_TOKEN
        .replace_all(text, |caps: &Captures| {
            match caps[1].to_ascii_lowercase().as_str() {
                "enter" => "\n",
                "tab" => "\t",
                _ => " ",
            }
        })
        .into_owned()
}

/// Remove the first `{Left n}` marker, returning the text and `n`
pub fn extract_caret_marker(text: &str) -> (String, Option<usize>) {
    let Some(caps) = CARET_MARKER.captures(text) else {
        return (text.to_string(), None);
    };

    let Some(marker) = caps.get(0) else {
        return (text.to_string(), None);
    };
    let offset = caps[1].parse::<usize>().ok();

    let mut stripped = String::with_capacity(text.len());
    stripped.push_str(&text[..marker.start()]);
    stripped.push_str(&text[marker.end()..]);

    (stripped, offset)
}

/// Delete `backspaces` characters before the caret and insert `output`
///
/// Returns false, without touching the host, when the caret is closer to
/// the start of the editable range than `backspaces`.
pub fn write_instant<H: TextHost>(host: &mut H, backspaces: usize, output: &str, raw: bool) -> bool {
    let selection = host.selection();

    let Some(start) = selection.start.checked_sub(backspaces) else {
        warn!(
            caret = selection.start,
            backspaces, "caret too close to start of text, replacement aborted"
        );
        return false;
    };

    let (text, caret_left) = extract_caret_marker(output);
    let text = if raw { text } else { translate_symbols(&text) };

    host.replace_range(start, selection.end, &text, CaretEdge::End);

    if let Some(left) = caret_left {
        let end = start + text.chars().count();
        host.set_caret(end.saturating_sub(left).max(start));
    }

    host.notify_changed();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Selection};

    #[test]
    fn test_backspace_count() {
        let mut options = DefinitionOptions::default();
        assert_eq!(backspace_count(3, 1, &options), 4);

        options.no_backspace = true;
        assert_eq!(backspace_count(3, 1, &options), 0);
    }

    #[test]
    fn test_conform_case() {
        assert_eq!(conform_case("by the way", "btw"), "by the way");
        assert_eq!(conform_case("by the way", "Btw"), "By the way");
        assert_eq!(conform_case("by the way", "BTW"), "BY THE WAY");
        assert_eq!(conform_case("by the way", "bTw"), "by the way");
        assert_eq!(conform_case("by the way", "BTw"), "by the way");
        assert_eq!(conform_case("x", "123"), "x");
        assert_eq!(conform_case("", "Btw"), "");
    }

    #[test]
    fn test_literal_output_end_char_rules() {
        let options = DefinitionOptions::default();
        assert_eq!(literal_output("out", "t", Some(' '), &options), "out ");

        let omit = DefinitionOptions {
            omit_end_char: true,
            ..DefinitionOptions::default()
        };
        assert_eq!(literal_output("out", "t", Some(' '), &omit), "out");

        let verbatim = DefinitionOptions {
            case_sensitive: true,
            ..DefinitionOptions::default()
        };
        assert_eq!(literal_output("out", "T", None, &verbatim), "out");
    }

    #[test]
    fn test_translate_symbols() {
        assert_eq!(translate_symbols("a{Enter}b{TAB}c{space}d"), "a\nb\tc d");
        assert_eq!(translate_symbols("{Esc}"), "{Esc}");
    }

    #[test]
    fn test_extract_caret_marker() {
        assert_eq!(
            extract_caret_marker("()({left 1})"),
            ("()()".to_string(), Some(1))
        );
        assert_eq!(extract_caret_marker("plain"), ("plain".to_string(), None));
    }

    #[test]
    fn test_write_instant_replaces_and_places_caret() {
        let mut host = MemoryHost::with_text("say fn ");
        assert!(write_instant(&mut host, 3, "f(){Left 1} ", false));

        assert_eq!(host.text(), "say f() ");
        assert_eq!(host.selection(), Selection::caret(7));
        assert_eq!(host.change_count(), 1);
    }

    #[test]
    fn test_write_instant_aborts_near_start() {
        let mut host = MemoryHost::with_text("ab");
        assert!(!write_instant(&mut host, 3, "xyz", false));
        assert_eq!(host.text(), "ab");
        assert_eq!(host.change_count(), 0);
    }

    #[test]
    fn test_write_instant_raw_keeps_tokens() {
        let mut host = MemoryHost::new();
        assert!(write_instant(&mut host, 0, "a{Enter}", true));
        assert_eq!(host.text(), "a{Enter}");
    }
}
