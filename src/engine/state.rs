//! Engine mode state machine
//!
//! # States
//!
//! `Phase` tracks what the engine is doing with the host right now:
//!
//! ```text
//!            instant write                 timed typing
//!   Idle ───────────────▶ Replacing      Idle ──▶ Locked ──▶ Replaying ──▶ Idle
//!    ▲                        │
//!    └────────────────────────┘
//! ```
//!
//! `Locked` and `Replaying` are consecutive phases of one timed-typing
//! operation and never overlap. `muted` and `suspended` are overlays: they
//! compose with any phase and only change how typed input is routed.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    /// An instant replacement is being written; input must not re-enter matching
    Replacing,
    /// Timed typing in progress; real keystrokes are queued
    Locked,
    /// Queued keystrokes are being flushed after timed typing
    Replaying,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModeState {
    phase: Phase,
    muted: bool,
    suspended: bool,
}

impl ModeState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    pub fn is_replacing(&self) -> bool {
        self.phase == Phase::Replacing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_suspended(&mut self) -> bool {
        self.suspended = !self.suspended;
        self.suspended
    }

    /// Idle → Replacing
    ///
    /// Returns false when another write is already running.
    pub fn begin_replace(&mut self) -> bool {
        self.transition(Phase::Idle, Phase::Replacing)
    }

    /// Replacing → Idle
    pub fn end_replace(&mut self) -> bool {
        self.transition(Phase::Replacing, Phase::Idle)
    }

    /// Idle → Locked
    pub fn lock(&mut self) -> bool {
        self.transition(Phase::Idle, Phase::Locked)
    }

    /// Locked → Replaying
    pub fn begin_replay(&mut self) -> bool {
        self.transition(Phase::Locked, Phase::Replaying)
    }

    /// Replaying → Idle
    pub fn end_replay(&mut self) -> bool {
        self.transition(Phase::Replaying, Phase::Idle)
    }

    /// Status text for observers
    pub fn status(&self) -> &'static str {
        match self.phase {
            Phase::Locked => "Locked",
            Phase::Replaying => "Replaying",
            Phase::Replacing => "Replacing",
            Phase::Idle if self.suspended => "Suspended",
            Phase::Idle if self.muted => "Muted",
            Phase::Idle => "Ready",
        }
    }

    fn transition(&mut self, from: Phase, to: Phase) -> bool {
        if self.phase != from {
            return false;
        }
        self.phase = to;
        true
    }
}

impl fmt::Display for ModeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_typing_cycle() {
        let mut state = ModeState::default();
        assert!(state.lock());
        assert_eq!(state.status(), "Locked");
        assert!(!state.begin_replace());
        assert!(state.begin_replay());
        assert_eq!(state.status(), "Replaying");
        assert!(state.end_replay());
        assert_eq!(state.status(), "Ready");
    }

    #[test]
    fn test_lock_and_replay_are_exclusive() {
        let mut state = ModeState::default();
        assert!(!state.begin_replay());
        assert!(state.lock());
        assert!(!state.lock());
        assert!(!state.end_replay());
    }

    #[test]
    fn test_overlays_compose_with_phases() {
        let mut state = ModeState::default();
        state.set_muted(true);
        assert!(state.toggle_suspended());
        assert_eq!(state.status(), "Suspended");

        assert!(state.lock());
        assert!(state.is_muted());
        assert!(state.is_suspended());
        assert_eq!(state.status(), "Locked");
    }
}
