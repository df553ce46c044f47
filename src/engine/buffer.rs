//! Bounded detection buffer
//!
//! Holds the most recently typed characters that have not been consumed by
//! a fired definition. When full, the oldest characters are dropped.

use std::collections::VecDeque;
use std::fmt;

/// Default maximum number of buffered characters
pub const DEFAULT_MAX_LEN: usize = 60;

/// Why the buffer was last cleared
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetReason {
    FocusLost,
    PointerDown,
    /// Arrow, paging, Home/End or Escape key
    Navigation,
    /// Key pressed together with Ctrl, Alt or Meta
    ModifierCombo,
    Paste,
    Cut,
    Undo,
    Redo,
    /// A definition fired
    Fired,
    /// Definitions were cleared
    Cleared,
    Manual,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResetReason::FocusLost => "focus lost",
            ResetReason::PointerDown => "pointer down",
            ResetReason::Navigation => "navigation key",
            ResetReason::ModifierCombo => "modifier combination",
            ResetReason::Paste => "paste",
            ResetReason::Cut => "cut",
            ResetReason::Undo => "undo",
            ResetReason::Redo => "redo",
            ResetReason::Fired => "fired",
            ResetReason::Cleared => "cleared",
            ResetReason::Manual => "manual",
        };
        write!(f, "{}", text)
    }
}

/// Observer view of the buffer and mode flags
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BufferSnapshot {
    pub content: String,
    pub muted: bool,
    pub locked: bool,
    pub last_reset: Option<ResetReason>,
}

#[derive(Clone, Debug)]
pub struct KeyBuffer {
    chars: VecDeque<char>,
    max_len: usize,
    last_reset: Option<ResetReason>,
}

impl KeyBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            chars: VecDeque::with_capacity(max_len),
            max_len,
            last_reset: None,
        }
    }

    pub fn push(&mut self, ch: char) {
        if self.max_len == 0 {
            return;
        }
        if self.chars.len() == self.max_len {
            self.chars.pop_front();
        }
        self.chars.push_back(ch);
    }

    pub fn push_str(&mut self, text: &str) {
        text.chars().for_each(|ch| self.push(ch));
    }

    /// Drop the newest character (Backspace)
    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop_back()
    }

    pub fn reset(&mut self, reason: ResetReason) {
        self.chars.clear();
        self.last_reset = Some(reason);
    }

    pub fn last_reset(&self) -> Option<ResetReason> {
        self.last_reset
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Contiguous view of the buffered characters, oldest first
    pub fn chars(&mut self) -> &[char] {
        self.chars.make_contiguous()
    }

    pub fn content(&self) -> String {
        self.chars.iter().collect()
    }
}

impl Default for KeyBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_backspace_shortens_by_one() {
        let mut buffer = KeyBuffer::default();
        buffer.push_str("abc");
        assert_eq!(buffer.pop(), Some('c'));
        assert_eq!(buffer.content(), "ab");
    }

    #[test]
    fn test_reset_on_empty_buffer() {
        let mut buffer = KeyBuffer::default();
        buffer.reset(ResetReason::Manual);
        buffer.reset(ResetReason::FocusLost);

        assert!(buffer.is_empty());
        assert_eq!(buffer.last_reset(), Some(ResetReason::FocusLost));
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut buffer = KeyBuffer::new(0);
        buffer.push('a');
        assert!(buffer.is_empty());
    }

    proptest! {
        #[test]
        fn buffer_keeps_last_max_chars(
            max_len in 1usize..80,
            input in "[a-z0-9 ]{0,200}",
        ) {
            let mut buffer = KeyBuffer::new(max_len);
            buffer.push_str(&input);

            let chars: Vec<char> = input.chars().collect();
            let expected: String = chars[chars.len().saturating_sub(max_len)..].iter().collect();

            prop_assert_eq!(buffer.len(), chars.len().min(max_len));
            prop_assert_eq!(buffer.content(), expected);
        }
    }
}
