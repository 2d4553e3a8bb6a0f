// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Session lifecycle state machine.
//!
//! Every open/start/stop/close on a [`RigSession`](crate::RigSession) is
//! expressed as an event; transitions not listed in `next_state` are refused.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Events that drive session state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Native open succeeded
    Opened,
    /// Worker and poller spawned
    Started,
    /// Shutdown of the worker and poller began
    StopRequested,
    /// Worker drained and joined
    Stopped,
    /// Native close issued
    Closed,
}

/// Lifecycle state of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// No native connection
    #[default]
    Closed,
    /// Connected, calls run on the caller's thread
    Open,
    /// Connected, calls run on the worker and the poller refreshes the cache
    Running,
    /// Worker draining its queue, new submissions rejected
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
        }
    }
}

impl SessionState {
    /// The native handle is open.
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    state: SessionState,
    transition_count: u64,
    last_transition: Option<Instant>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
            transition_count: 0,
            last_transition: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn time_in_state(&self) -> Option<Duration> {
        self.last_transition.map(|t| t.elapsed())
    }

    /// Apply an event. Returns the previous state when a transition occurred.
    pub fn process_event(&mut self, event: SessionEvent) -> Option<SessionState> {
        let next = self.next_state(event)?;
        let previous = self.state;
        self.state = next;
        self.transition_count += 1;
        self.last_transition = Some(Instant::now());
        Some(previous)
    }

    fn next_state(&self, event: SessionEvent) -> Option<SessionState> {
        match (self.state, event) {
            (SessionState::Closed, SessionEvent::Opened) => Some(SessionState::Open),
            (SessionState::Open, SessionEvent::Started) => Some(SessionState::Running),
            (SessionState::Running, SessionEvent::StopRequested) => Some(SessionState::Stopping),
            (SessionState::Stopping, SessionEvent::Stopped) => Some(SessionState::Open),
            (SessionState::Open, SessionEvent::Closed) => Some(SessionState::Closed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sm = SessionStateMachine::new();
        assert_eq!(sm.state(), SessionState::Closed);
        assert_eq!(sm.transition_count(), 0);
        assert!(sm.time_in_state().is_none());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut sm = SessionStateMachine::new();

        assert_eq!(sm.process_event(SessionEvent::Opened), Some(SessionState::Closed));
        assert_eq!(sm.process_event(SessionEvent::Started), Some(SessionState::Open));
        assert!(sm.state().is_running());

        sm.process_event(SessionEvent::StopRequested);
        assert_eq!(sm.state(), SessionState::Stopping);
        assert!(sm.state().is_connected());

        sm.process_event(SessionEvent::Stopped);
        assert_eq!(sm.state(), SessionState::Open);

        sm.process_event(SessionEvent::Closed);
        assert_eq!(sm.state(), SessionState::Closed);
        assert_eq!(sm.transition_count(), 5);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut sm = SessionStateMachine::new();

        // Can't start before opening
        assert!(sm.process_event(SessionEvent::Started).is_none());
        assert_eq!(sm.state(), SessionState::Closed);

        sm.process_event(SessionEvent::Opened);
        // Second open is rejected
        assert!(sm.process_event(SessionEvent::Opened).is_none());

        sm.process_event(SessionEvent::Started);
        // Running sessions must stop before closing
        assert!(sm.process_event(SessionEvent::Closed).is_none());
        assert!(sm.process_event(SessionEvent::Started).is_none());
        assert_eq!(sm.state(), SessionState::Running);
    }
}
