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

//! Text host and observer interfaces
//!
//! The engine never owns the editable text. It talks to a `TextHost` that
//! exposes caret offsets and range replacement, and reports its internal
//! state to an optional `EngineObserver`.
//!
//! All offsets count `char`s, not bytes.
//!
//! `MemoryHost` is a plain in-memory implementation used by the CLI
//! simulator and the test suite.

use crate::engine::buffer::BufferSnapshot;

/// Caret/selection offsets within the editable range
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// Where the caret ends up after a range replacement
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaretEdge {
    Start,
    End,
}

/// Editable text surface the engine writes into
pub trait TextHost {
    /// Current selection; a collapsed selection is the caret
    fn selection(&self) -> Selection;

    /// Replace `start..end` with `text` and place the caret at `edge` of the inserted text
    fn replace_range(&mut self, start: usize, end: usize, text: &str, edge: CaretEdge);

    /// Move the caret, collapsing any selection
    fn set_caret(&mut self, offset: usize);

    /// Called after every engine-driven edit
    fn notify_changed(&mut self);
}

/// Receives engine state updates
///
/// Both methods default to doing nothing.
pub trait EngineObserver {
    fn buffer_changed(&mut self, _snapshot: &BufferSnapshot) {}

    fn status_changed(&mut self, _status: &str) {}
}

/// Observer that ignores every update
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}

/// In-memory text host
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryHost {
    text: String,
    selection: Selection,
    changes: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host pre-filled with `text`, caret at the end
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            selection: Selection::caret(text.chars().count()),
            changes: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of `notify_changed` calls received
    pub fn change_count(&self) -> usize {
        self.changes
    }

    /// Apply a typed character the way a real text field would
    pub fn type_char(&mut self, ch: char) {
        let Selection { start, end } = self.selection;
        let mut buf = [0u8; 4];
        self.replace_range(start, end, ch.encode_utf8(&mut buf), CaretEdge::End);
    }

    /// Apply a Backspace key press
    pub fn backspace(&mut self) {
        let Selection { start, end } = self.selection;
        if start != end {
            self.replace_range(start, end, "", CaretEdge::End);
        } else if start > 0 {
            self.replace_range(start - 1, start, "", CaretEdge::End);
        }
    }

    fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }
}

impl TextHost for MemoryHost {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str, edge: CaretEdge) {
        let (start, end) = (start.min(end), start.max(end));
        let byte_start = self.byte_offset(start);
        let byte_end = self.byte_offset(end);
        self.text.replace_range(byte_start..byte_end, text);

        let caret = match edge {
            CaretEdge::Start => start,
            CaretEdge::End => start + text.chars().count(),
        };
        self.selection = Selection::caret(caret);
    }

    fn set_caret(&mut self, offset: usize) {
        self.selection = Selection::caret(offset.min(self.text.chars().count()));
    }

    fn notify_changed(&mut self) {
        self.changes += 1;
    }
}
