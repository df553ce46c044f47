//! Keyboard and editing events delivered by the host
//!
//! These are platform-neutral: wiring real key events into them is the
//! host's job.

use std::fmt;

/// Non-character keys the engine cares about
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Escape,
}

impl Key {
    /// Keys that move the caret and invalidate typed context
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            Key::Left
                | Key::Right
                | Key::Up
                | Key::Down
                | Key::PageUp
                | Key::PageDown
                | Key::Home
                | Key::End
                | Key::Escape
        )
    }

    /// Text this key contributes when replayed after timed typing
    ///
    /// Backspace and navigation keys contribute nothing.
    pub fn replay_text(self) -> Option<char> {
        match self {
            Key::Char(ch) => Some(ch),
            Key::Enter => Some('\n'),
            Key::Tab => Some('\t'),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(ch) => write!(f, "{}", ch),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Ctrl, Alt or Meta held; Shift alone does not count
    pub fn is_command(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeyPress {
    fn from(key: Key) -> Self {
        KeyPress::new(key)
    }
}

impl From<char> for KeyPress {
    fn from(ch: char) -> Self {
        KeyPress::new(Key::Char(ch))
    }
}

/// Editing actions that alter content in bulk
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EditAction {
    Paste,
    Cut,
    Undo,
    Redo,
}

/// What the host should do with a key after `key_down`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyDisposition {
    /// Apply the key normally
    Allow,
    /// The engine captured the key; do not apply it
    Suppress,
}
