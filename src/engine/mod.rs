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

//! Hotstring engine - mediates between typed input, definitions and the host
//!
//! # Responsibilities
//!
//! - Own the registry, the detection buffer and the mode state
//! - Route host input events (keys, typed characters, focus, pointer, edits)
//! - Run the matcher on every accepted character
//! - Execute fired definitions: instant writes, callbacks and timed typing
//!
//! # Event flow
//!
//! ```text
//! key_down ──▶ (Locked? queue) ──▶ host applies key ──▶ char_input
//!                                                          │
//!              buffer append ◀─────────────────────────────┘
//!                    │
//!                 matcher ──▶ executor ──▶ host edit ──▶ buffer reset
//! ```
//!
//! Everything runs on one thread; the engine is driven by a serialized
//! event stream and never blocks. Timed typing is advanced by the driver
//! through `typing_step`, which returns the delay to wait before the next
//! call.
//!
//! Pattern callbacks run synchronously and are not placed under the input
//! lock. Errors they return propagate out of the event that fired them.

pub mod buffer;
pub mod executor;
pub mod input;
pub mod matcher;
pub mod state;
pub mod typing;

use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::core::import::{self, ImportError, ImportOptions, ImportReport};
use crate::core::parser::{parse_hotstring, parse_pattern, DefinitionError};
use crate::core::registry::Registry;
use crate::core::types::{Callback, CallbackArgs, Hotstring, PatternOptions, Replacement};
use crate::host::{CaretEdge, EngineObserver, MemoryHost, NoopObserver, TextHost};

use buffer::{BufferSnapshot, KeyBuffer, ResetReason};
use executor::{backspace_count, literal_output, translate_symbols, write_instant};
use input::{EditAction, Key, KeyDisposition, KeyPress};
use matcher::{find_match, EndChars, MatchKind};
use state::ModeState;
use typing::{TypingStep, TypingTask};

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A user callback returned an error while its definition fired
    #[error("Handler for '{label}' failed: {source}")]
    Handler {
        label: String,
        #[source]
        source: anyhow::Error,
    },
}

/// How a fired definition delivered its output
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delivery {
    /// Instant replacement written
    Written,
    /// Caret too close to the start of the text; host untouched
    Aborted,
    /// Timed typing started; drive it with `typing_step`
    Typing(Duration),
    /// `X` callback executed
    Executed,
    /// Callback produced no text
    NoOutput,
}

/// Result of a definition firing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FireOutcome {
    pub label: String,
    pub delivery: Delivery,
}

/// Text-expansion engine bound to one text host
pub struct Engine<H: TextHost> {
    host: H,
    registry: Registry,
    buffer: KeyBuffer,
    mute_buffer: String,
    end_chars: EndChars,
    reset_on_pointer: bool,
    mode: ModeState,
    typing: Option<TypingTask>,
    observer: Box<dyn EngineObserver>,
}

impl<H: TextHost> Engine<H> {
    /// Creates an engine with default configuration
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    pub fn with_config(host: H, config: EngineConfig) -> Self {
        Self {
            host,
            registry: Registry::new(),
            buffer: KeyBuffer::new(config.max_buffer_len),
            mute_buffer: String::new(),
            end_chars: EndChars::new(&config.end_chars),
            reset_on_pointer: config.reset_on_pointer,
            mode: ModeState::default(),
            typing: None,
            observer: Box::new(NoopObserver),
        }
    }

    /// Replaces the observer receiving buffer and status updates
    pub fn with_observer(mut self, observer: impl EngineObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn mode(&self) -> ModeState {
        self.mode
    }

    /// Current detection buffer content
    pub fn buffer_content(&self) -> String {
        self.buffer.content()
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    /// Registers a literal definition such as `:*:btw`
    ///
    /// # Errors
    ///
    /// Returns a `DefinitionError` when the definition string is malformed.
    pub fn register(
        &mut self,
        definition: &str,
        replacement: impl Into<Replacement>,
    ) -> Result<(), DefinitionError> {
        let hotstring = parse_hotstring(definition, replacement.into())?;
        debug!(label = definition, "hotstring registered");
        self.registry.register(hotstring);
        Ok(())
    }

    /// Registers a pattern definition
    ///
    /// The pattern is anchored to the end of the typed text. `handler`
    /// receives the full match and each capture group.
    pub fn register_pattern(
        &mut self,
        pattern: &str,
        handler: Callback,
        options: PatternOptions,
    ) -> Result<(), DefinitionError> {
        let hotstring = parse_pattern(pattern, handler, options)?;
        debug!(pattern, "pattern hotstring registered");
        self.registry.register(hotstring);
        Ok(())
    }

    /// Imports a hotstring script, see `core::import`
    pub fn import_script(
        &mut self,
        text: &str,
        options: ImportOptions,
    ) -> Result<ImportReport, ImportError> {
        import::import_script(&mut self.registry, text, options)
    }

    /// Removes every definition and clears the buffer
    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.reset_buffer(ResetReason::Cleared);
    }

    /// Labels of definitions whose replacement contains `query` (case-insensitive)
    ///
    /// Callback replacements are matched by their description. An empty
    /// query returns every label.
    pub fn search(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();

        self.collect_labels(|hotstring| {
            query_lower.is_empty()
                || hotstring
                    .replacement
                    .searchable_text()
                    .to_lowercase()
                    .contains(&query_lower)
        })
    }

    /// Labels of definitions whose replacement matches `pattern`
    pub fn search_regex(&self, pattern: &Regex) -> Vec<String> {
        self.collect_labels(|hotstring| pattern.is_match(hotstring.replacement.searchable_text()))
    }

    fn collect_labels<P>(&self, predicate: P) -> Vec<String>
    where
        P: Fn(&Hotstring) -> bool,
    {
        self.registry
            .iter()
            .filter(|hotstring| predicate(hotstring))
            .map(|hotstring| hotstring.display_label())
            .collect()
    }

    /// Runs a literal definition's action as if it had been typed
    ///
    /// Nothing is deleted and no end character is added. Unknown labels
    /// are logged and ignored.
    pub fn trigger(&mut self, label: &str) -> Result<Option<FireOutcome>, EngineError> {
        let Some(hotstring) = self
            .registry
            .find(|h| h.label.as_deref() == Some(label))
        else {
            warn!(label, "no hotstring registered with this label");
            return Ok(None);
        };

        self.fire_literal(&hotstring, "", None).map(Some)
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    /// Clears the detection buffer
    ///
    /// The mute buffer and the lock queue are left alone.
    pub fn reset_buffer(&mut self, reason: ResetReason) {
        self.buffer.reset(reason);
        self.notify_buffer();
    }

    /// Enters or leaves mute mode
    ///
    /// Leaving mute mode moves pending muted input into the buffer
    /// without running detection.
    pub fn set_mute_mode(&mut self, muted: bool) {
        if self.mode.is_muted() == muted {
            return;
        }

        self.mode.set_muted(muted);
        if !muted {
            let pending = std::mem::take(&mut self.mute_buffer);
            self.buffer.push_str(&pending);
        }

        self.notify_buffer();
        self.notify_status();
    }

    /// Flips suspend mode and returns the new state
    pub fn toggle_suspend(&mut self) -> bool {
        let suspended = self.mode.toggle_suspended();
        self.notify_status();
        suspended
    }

    pub fn set_boundary_reset_on_pointer(&mut self, enabled: bool) {
        self.reset_on_pointer = enabled;
    }

    /// Replaces the end character set
    pub fn set_end_chars(&mut self, chars: &str) {
        self.end_chars = EndChars::new(chars);
    }

    // ------------------------------------------------------------------
    // Input events
    // ------------------------------------------------------------------

    /// Handles a key press before the host applies it
    ///
    /// While timed typing runs, every key is queued and `Suppress` is
    /// returned. Otherwise navigation keys and Ctrl/Alt/Meta chords reset
    /// the buffer and Backspace drops its newest character.
    pub fn key_down(&mut self, press: KeyPress) -> KeyDisposition {
        if self.mode.is_locked() {
            if let Some(task) = self.typing.as_mut() {
                task.queue(press);
            }
            return KeyDisposition::Suppress;
        }

        if press.modifiers.is_command() {
            self.reset_buffer(ResetReason::ModifierCombo);
        } else if press.key.is_navigation() {
            self.reset_buffer(ResetReason::Navigation);
        } else if press.key == Key::Backspace {
            if self.mode.is_muted() {
                self.mute_buffer.pop();
            } else {
                self.buffer.pop();
            }
            self.notify_buffer();
        }

        KeyDisposition::Allow
    }

    /// Handles a character the host has just inserted
    ///
    /// Ignored while the engine itself is writing. Returns the outcome
    /// when a definition fired.
    pub fn char_input(&mut self, ch: char) -> Result<Option<FireOutcome>, EngineError> {
        if !self.mode.is_idle() {
            return Ok(None);
        }

        if self.mode.is_muted() {
            self.mute_buffer.push(ch);
            if !self.end_chars.contains(ch) {
                return Ok(None);
            }
            let pending = std::mem::take(&mut self.mute_buffer);
            self.buffer.push_str(&pending);
        } else {
            self.buffer.push(ch);
        }

        self.notify_buffer();
        self.detect()
    }

    pub fn focus_lost(&mut self) {
        self.reset_buffer(ResetReason::FocusLost);
    }

    /// Pointer pressed inside the host; resets unless disabled
    pub fn pointer_down(&mut self) {
        if self.reset_on_pointer {
            self.reset_buffer(ResetReason::PointerDown);
        }
    }

    pub fn edit_action(&mut self, action: EditAction) {
        let reason = match action {
            EditAction::Paste => ResetReason::Paste,
            EditAction::Cut => ResetReason::Cut,
            EditAction::Undo => ResetReason::Undo,
            EditAction::Redo => ResetReason::Redo,
        };
        self.reset_buffer(reason);
    }

    // ------------------------------------------------------------------
    // Timed typing
    // ------------------------------------------------------------------

    /// Types the next character of the running task
    ///
    /// Returns `Pending(delay)` while characters remain. After the last
    /// one, queued keystrokes are replayed and `Done` is returned.
    pub fn typing_step(&mut self) -> TypingStep {
        let Some(task) = self.typing.as_mut() else {
            return TypingStep::Done;
        };

        if task.type_next(&mut self.host) && !task.is_finished() {
            return TypingStep::Pending(task.delay());
        }

        self.finish_typing();
        TypingStep::Done
    }

    /// Drives the running task to completion, calling `sleep` between characters
    pub fn run_typing<F>(&mut self, mut sleep: F)
    where
        F: FnMut(Duration),
    {
        while let TypingStep::Pending(delay) = self.typing_step() {
            sleep(delay);
        }
    }

    fn finish_typing(&mut self) {
        let Some(task) = self.typing.take() else {
            return;
        };

        self.mode.begin_replay();
        self.notify_status();

        let replay = task.replay_text();
        if !replay.is_empty() {
            let selection = self.host.selection();
            self.host
                .replace_range(selection.start, selection.end, &replay, CaretEdge::End);
            self.host.notify_changed();

            if !task.reset_after_fire() {
                self.buffer.push_str(&replay);
            }
        }
        debug!(
            replayed = replay.chars().count(),
            queued = task.queued().len(),
            "timed typing finished"
        );

        self.mode.end_replay();
        self.notify_buffer();
        self.notify_status();
    }

    // ------------------------------------------------------------------
    // Detection and execution
    // ------------------------------------------------------------------

    fn detect(&mut self) -> Result<Option<FireOutcome>, EngineError> {
        let found = find_match(
            &self.registry,
            self.buffer.chars(),
            &self.end_chars,
            self.mode.is_suspended(),
        );

        let Some(found) = found else {
            return Ok(None);
        };

        let outcome = match found.kind {
            MatchKind::Literal { typed, boundary } => {
                self.fire_literal(&found.hotstring, &typed, boundary)?
            }
            MatchKind::Pattern { matched, groups } => {
                self.fire_pattern(&found.hotstring, matched, groups)?
            }
        };

        Ok(Some(outcome))
    }

    fn fire_literal(
        &mut self,
        hotstring: &Hotstring,
        typed: &str,
        boundary: Option<char>,
    ) -> Result<FireOutcome, EngineError> {
        self.reset_buffer(ResetReason::Fired);

        let label = hotstring.display_label();
        let options = &hotstring.options;
        let boundary_len = usize::from(boundary.is_some());
        let backspaces = backspace_count(typed.chars().count(), boundary_len, options);
        debug!(label = %label, backspaces, "hotstring fired");

        let args = CallbackArgs {
            matched: typed.to_string(),
            groups: Vec::new(),
        };

        let text = match &hotstring.replacement {
            Replacement::Callback(callback) if options.execute_as_callback => {
                if backspaces > 0 {
                    self.write_guarded(backspaces, "", true);
                }
                callback
                    .call(&args)
                    .map_err(|source| handler_error(&label, source))?;
                return Ok(FireOutcome {
                    label,
                    delivery: Delivery::Executed,
                });
            }
            Replacement::Callback(callback) => callback
                .call(&args)
                .map_err(|source| handler_error(&label, source))?
                .unwrap_or_default(),
            Replacement::Text(text) => text.clone(),
        };

        let output = literal_output(&text, typed, boundary, options);

        let delivery = match options.typing_delay_ms() {
            Some(ms) => self.start_typing(
                backspaces,
                &output,
                Duration::from_millis(ms),
                options.raw_mode,
                options.reset_after_fire,
            ),
            None if self.write_guarded(backspaces, &output, options.raw_mode) => Delivery::Written,
            None => Delivery::Aborted,
        };

        Ok(FireOutcome { label, delivery })
    }

    fn fire_pattern(
        &mut self,
        hotstring: &Hotstring,
        matched: String,
        groups: Vec<String>,
    ) -> Result<FireOutcome, EngineError> {
        self.reset_buffer(ResetReason::Fired);

        let label = hotstring.display_label();
        debug!(pattern = %label, matched = %matched, "pattern hotstring fired");

        let Replacement::Callback(callback) = &hotstring.replacement else {
            return Ok(FireOutcome {
                label,
                delivery: Delivery::NoOutput,
            });
        };

        let backspaces = matched.chars().count();
        let result = callback
            .call(&CallbackArgs { matched, groups })
            .map_err(|source| handler_error(&label, source))?;

        let delivery = match result {
            Some(text) if !text.is_empty() => {
                if self.write_guarded(backspaces, &text, false) {
                    Delivery::Written
                } else {
                    Delivery::Aborted
                }
            }
            _ => Delivery::NoOutput,
        };

        Ok(FireOutcome { label, delivery })
    }

    /// Instant write under the `Replacing` phase
    fn write_guarded(&mut self, backspaces: usize, output: &str, raw: bool) -> bool {
        if !self.mode.begin_replace() {
            return false;
        }
        self.notify_status();

        let written = write_instant(&mut self.host, backspaces, output, raw);

        self.mode.end_replace();
        self.notify_status();
        written
    }

    fn start_typing(
        &mut self,
        backspaces: usize,
        output: &str,
        delay: Duration,
        raw: bool,
        reset_after_fire: bool,
    ) -> Delivery {
        let selection = self.host.selection();
        let Some(start) = selection.start.checked_sub(backspaces) else {
            warn!(
                caret = selection.start,
                backspaces, "caret too close to start of text, timed typing aborted"
            );
            return Delivery::Aborted;
        };

        if !self.mode.lock() {
            return Delivery::Aborted;
        }
        self.notify_status();

        if backspaces > 0 {
            self.host
                .replace_range(start, selection.end, "", CaretEdge::End);
            self.host.notify_changed();
        }

        let output = if raw {
            output.to_string()
        } else {
            translate_symbols(output)
        };
        debug!(chars = output.chars().count(), ?delay, "timed typing started");

        self.typing = Some(TypingTask::new(&output, delay, reset_after_fire));
        Delivery::Typing(delay)
    }

    // ------------------------------------------------------------------
    // Observer
    // ------------------------------------------------------------------

    fn notify_buffer(&mut self) {
        let snapshot = BufferSnapshot {
            content: self.buffer.content(),
            muted: self.mode.is_muted(),
            locked: self.mode.is_locked(),
            last_reset: self.buffer.last_reset(),
        };
        self.observer.buffer_changed(&snapshot);
    }

    fn notify_status(&mut self) {
        self.observer.status_changed(self.mode.status());
    }
}

impl Engine<MemoryHost> {
    /// Feeds `text` through the engine one keystroke at a time
    ///
    /// Each character goes through `key_down`, is applied to the memory
    /// host unless suppressed, then through `char_input`. `\n`, `\t` and
    /// `\u{8}` are sent as Enter, Tab and Backspace. Timed typing is not
    /// driven; keystrokes typed while it runs are queued.
    pub fn simulate_typing(&mut self, text: &str) -> Result<Vec<FireOutcome>, EngineError> {
        let mut outcomes = Vec::new();

        for ch in text.chars() {
            let key = match ch {
                '\n' => Key::Enter,
                '\t' => Key::Tab,
                '\u{8}' => Key::Backspace,
                other => Key::Char(other),
            };

            if self.key_down(KeyPress::new(key)) == KeyDisposition::Suppress {
                continue;
            }

            if key == Key::Backspace {
                self.host.backspace();
                continue;
            }

            self.host.type_char(ch);
            if let Some(outcome) = self.char_input(ch)? {
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }
}

fn handler_error(label: &str, source: anyhow::Error) -> EngineError {
    EngineError::Handler {
        label: label.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests;
