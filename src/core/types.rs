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

//! src/core/types.rs
//!
//! Core type definitions for hotstring management
//!
//! This module defines the fundamental types used throughout the engine:
//! - `SendMode`: How output is delivered (instant or timed)
//! - `DefinitionOptions`: The parsed option flags of a definition
//! - `Replacement`: Literal text or a callback
//! - `Hotstring`: A complete registered definition
//!
//! `HotstringSummary` is the serialisable view used by `list --json`;
//! callbacks are opaque and only carry a textual description.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// How a replacement is delivered to the host
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub enum SendMode {
    /// Single edit (default, also selected by `SI`)
    #[default]
    Instant,
    /// Character-by-character typing (`SE`)
    EventDelayed,
    /// Character-by-character typing (`SP`)
    PollDelayed,
}

impl SendMode {
    /// Returns true for the modes that type output with a delay
    pub fn is_delayed(self) -> bool {
        matches!(self, SendMode::EventDelayed | SendMode::PollDelayed)
    }
}

impl fmt::Display for SendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendMode::Instant => write!(f, "SI"),
            SendMode::EventDelayed => write!(f, "SE"),
            SendMode::PollDelayed => write!(f, "SP"),
        }
    }
}

/// Parsed option flags of a definition
///
/// Produced by `parse_options` from the OPTIONS segment of `:OPTIONS:TRIGGER`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DefinitionOptions {
    /// `*`: fire without waiting for an end character
    pub fire_immediately: bool,
    /// `?`: fire even when the trigger is inside a word
    pub inside_word: bool,
    /// `B0`: leave the typed trigger in place
    pub no_backspace: bool,
    /// `C`: trigger must match case exactly
    pub case_sensitive: bool,
    /// `C1`: never adapt the output case to the typed trigger
    pub no_conformity: bool,
    /// `O`: do not re-emit the end character
    pub omit_end_char: bool,
    /// `T` / `R`: output is sent without `{Enter}`-style token translation
    pub raw_mode: bool,
    /// `X`: replacement is executed, not typed
    pub execute_as_callback: bool,
    /// `Z`: forget typed context after firing
    pub reset_after_fire: bool,
    /// `S`: still active while the engine is suspended
    pub suspend_exempt: bool,
    /// `P<n>`: higher values are tried first
    pub priority: i32,
    /// `K<n>`: delay between typed characters in milliseconds, -1 when unset
    pub key_delay: i32,
    /// `SE` / `SP` / `SI`
    pub send_mode: SendMode,
}

impl Default for DefinitionOptions {
    fn default() -> Self {
        Self {
            fire_immediately: false,
            inside_word: false,
            no_backspace: false,
            case_sensitive: false,
            no_conformity: false,
            omit_end_char: false,
            raw_mode: false,
            execute_as_callback: false,
            reset_after_fire: false,
            suspend_exempt: false,
            priority: 0,
            key_delay: -1,
            send_mode: SendMode::Instant,
        }
    }
}

impl DefinitionOptions {
    /// Key delay in milliseconds when timed typing applies
    ///
    /// Timed typing needs both a delayed send mode and a non-negative `K`.
    pub fn typing_delay_ms(&self) -> Option<u64> {
        if self.send_mode.is_delayed() && self.key_delay >= 0 {
            Some(self.key_delay as u64)
        } else {
            None
        }
    }
}

/// Arguments handed to a callback when its definition fires
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackArgs {
    /// The full matched text (typed trigger or pattern match)
    pub matched: String,
    /// Capture groups of a pattern match, empty string for groups that did not participate
    pub groups: Vec<String>,
}

type CallbackFn = dyn Fn(&CallbackArgs) -> anyhow::Result<Option<String>>;

/// A user-supplied handler
///
/// Errors returned by the handler are not caught by the engine; they
/// propagate out of the input event that fired the definition.
#[derive(Clone)]
pub struct Callback {
    description: String,
    func: Rc<CallbackFn>,
}

impl Callback {
    /// Wraps a handler together with the text `search` matches against
    pub fn new<F>(description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallbackArgs) -> anyhow::Result<Option<String>> + 'static,
    {
        Self {
            description: description.into(),
            func: Rc::new(func),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn call(&self, args: &CallbackArgs) -> anyhow::Result<Option<String>> {
        (self.func)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// What a definition produces when it fires
#[derive(Clone, Debug)]
pub enum Replacement {
    /// Literal output text
    Text(String),
    /// Computed output
    Callback(Callback),
}

impl Replacement {
    /// Text used for searching: the literal text or the callback description
    pub fn searchable_text(&self) -> &str {
        match self {
            Replacement::Text(text) => text,
            Replacement::Callback(callback) => callback.description(),
        }
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::Text(text.to_string())
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Text(text)
    }
}

impl From<Callback> for Replacement {
    fn from(callback: Callback) -> Self {
        Replacement::Callback(callback)
    }
}

/// Options accepted by pattern registration
///
/// Only `priority` affects behaviour (registry ordering). The remaining
/// fields are stored on the definition and not consulted by matching or
/// execution.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PatternOptions {
    pub priority: i32,
    pub is_async: bool,
    pub block_input: bool,
    /// Milliseconds, 0 when unset
    pub timeout_ms: u64,
}

/// Literal or pattern trigger
#[derive(Clone, Debug)]
pub enum HotstringKind {
    /// Exact text, compared per the `case_sensitive` option
    Literal { trigger: String },
    /// Expression anchored to the end of the buffer
    Pattern {
        source: String,
        regex: Regex,
        options: PatternOptions,
    },
}

/// A complete registered hotstring
///
/// Immutable once registered; the import path rewrites the replacement
/// text through the escape translator before registration.
#[derive(Clone, Debug)]
pub struct Hotstring {
    pub kind: HotstringKind,
    pub replacement: Replacement,
    pub options: DefinitionOptions,
    /// `:OPTIONS:TRIGGER` as registered (literal kind only)
    pub label: Option<String>,
}

impl Hotstring {
    /// Literal trigger text, `None` for patterns
    pub fn literal_trigger(&self) -> Option<&str> {
        match &self.kind {
            HotstringKind::Literal { trigger } => Some(trigger),
            HotstringKind::Pattern { .. } => None,
        }
    }

    /// Trigger length in characters; patterns count as 0 for ordering
    pub fn trigger_len(&self) -> usize {
        self.literal_trigger()
            .map(|trigger| trigger.chars().count())
            .unwrap_or(0)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self.kind, HotstringKind::Pattern { .. })
    }

    /// Label used by `trigger` and returned by `search`
    ///
    /// Pattern definitions have no label and report their pattern source.
    pub fn display_label(&self) -> String {
        match (&self.label, &self.kind) {
            (Some(label), _) => label.clone(),
            (None, HotstringKind::Pattern { source, .. }) => source.clone(),
            (None, HotstringKind::Literal { trigger }) => format!("::{}", trigger),
        }
    }
}

impl fmt::Display for Hotstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_label())?;

        match &self.replacement {
            Replacement::Text(text) => write!(f, "::{}", text.escape_debug()),
            Replacement::Callback(callback) => write!(f, " => {}", callback.description()),
        }
    }
}

/// Serialisable view of a registered definition
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HotstringSummary {
    pub label: String,
    /// Literal trigger or pattern source
    pub trigger: String,
    pub is_pattern: bool,
    /// Literal text or callback description
    pub replacement: String,
    pub options: DefinitionOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_options: Option<PatternOptions>,
}

impl From<&Hotstring> for HotstringSummary {
    fn from(hotstring: &Hotstring) -> Self {
        let (trigger, pattern_options) = match &hotstring.kind {
            HotstringKind::Literal { trigger } => (trigger.clone(), None),
            HotstringKind::Pattern {
                source, options, ..
            } => (source.clone(), Some(*options)),
        };

        Self {
            label: hotstring.display_label(),
            trigger,
            is_pattern: hotstring.is_pattern(),
            replacement: hotstring.replacement.searchable_text().to_string(),
            options: hotstring.options.clone(),
            pattern_options,
        }
    }
}
