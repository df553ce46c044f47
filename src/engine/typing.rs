//! Timed typing with input lock and replay
//!
//! A `TypingTask` types its output one character per step. The engine
//! holds the task while it is in the `Locked` phase and diverts real
//! keystrokes into the task's queue. When the last character has been
//! typed, the queue is flushed as one insertion (the replay).
//!
//! Each call to `Engine::typing_step` is one suspension point; the driver waits `delay`
//! between steps. There is no cancellation: a started task always runs to
//! the end.

use std::collections::VecDeque;
use std::time::Duration;

use crate::engine::input::KeyPress;
use crate::host::{CaretEdge, TextHost};

/// Result of advancing timed typing
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypingStep {
    /// More characters remain; call again after the delay
    Pending(Duration),
    /// Output finished and queued input was replayed
    Done,
}

#[derive(Clone, Debug)]
pub struct TypingTask {
    remaining: VecDeque<char>,
    delay: Duration,
    queued: Vec<KeyPress>,
    /// Keep replayed text out of the detection buffer (`Z`)
    reset_after_fire: bool,
}

impl TypingTask {
    pub fn new(output: &str, delay: Duration, reset_after_fire: bool) -> Self {
        Self {
            remaining: output.chars().collect(),
            delay,
            queued: Vec::new(),
            reset_after_fire,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn reset_after_fire(&self) -> bool {
        self.reset_after_fire
    }

    /// Capture a real keystroke that arrived while locked
    pub fn queue(&mut self, key: KeyPress) {
        self.queued.push(key);
    }

    pub fn queued(&self) -> &[KeyPress] {
        &self.queued
    }

    /// Type the next character at the caret
    ///
    /// Returns false once nothing is left to type.
    pub fn type_next<H: TextHost>(&mut self, host: &mut H) -> bool {
        let Some(ch) = self.remaining.pop_front() else {
            return false;
        };

        let selection = host.selection();
        let mut buf = [0u8; 4];
        host.replace_range(
            selection.start,
            selection.end,
            ch.encode_utf8(&mut buf),
            CaretEdge::End,
        );
        host.notify_changed();
        true
    }

    /// Text produced by the queued keystrokes
    ///
    /// Enter and Tab become `\n` and `\t`; Backspace and navigation keys
    /// are dropped rather than replayed, as are Ctrl/Alt/Meta chords.
    pub fn replay_text(&self) -> String {
        self.queued
            .iter()
            .filter(|press| !press.modifiers.is_command())
            .filter_map(|press| press.key.replay_text())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::{Key, Modifiers};
    use crate::host::MemoryHost;

    #[test]
    fn test_types_one_char_per_step() {
        let mut host = MemoryHost::new();
        let mut task = TypingTask::new("hé", Duration::from_millis(5), false);

        assert!(task.type_next(&mut host));
        assert_eq!(host.text(), "h");
        assert!(task.type_next(&mut host));
        assert_eq!(host.text(), "hé");
        assert!(!task.type_next(&mut host));
        assert!(task.is_finished());
        assert_eq!(host.change_count(), 2);
    }

    #[test]
    fn test_replay_translates_and_drops_keys() {
        let mut task = TypingTask::new("", Duration::ZERO, false);
        task.queue('a'.into());
        task.queue(Key::Backspace.into());
        task.queue(Key::Enter.into());
        task.queue(Key::Left.into());
        task.queue(Key::Tab.into());
        task.queue('b'.into());

        assert_eq!(task.replay_text(), "a\n\tb");
    }

    #[test]
    fn test_replay_skips_command_chords() {
        let mut task = TypingTask::new("", Duration::ZERO, false);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        task.queue(KeyPress::with_modifiers(Key::Char('v'), ctrl));
        task.queue('x'.into());

        assert_eq!(task.replay_text(), "x");
    }
}
