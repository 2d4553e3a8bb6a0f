// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Session event notification.
//!
//! Listeners observe cache changes picked up by the poller, lifecycle
//! transitions, and the one-shot communication-lost shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::rig::types::{Passband, PttState, RigMode};

use super::machine::SessionState;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Trait for components that want to receive session events.
///
/// All methods have default no-op implementations. Callbacks run on the
/// session's worker or poller thread, or on the caller's thread for
/// lifecycle calls, and must not block on the session itself.
pub trait RigListener: Send + Sync {
    /// Called when the cached frequency changes.
    fn on_frequency_change(&self, _old_hz: f64, _new_hz: f64) {}

    /// Called when the cached mode or passband changes.
    fn on_mode_change(&self, _mode: RigMode, _width: Passband) {}

    /// Called when the cached PTT state changes.
    fn on_ptt_change(&self, _ptt: PttState) {}

    /// Called when the session state machine transitions.
    fn on_state_change(&self, _old: SessionState, _new: SessionState) {}

    /// Called once when the session closes itself after repeated failures.
    fn on_communication_lost(&self, _last_status: Option<&str>) {}
}

/// Manages registered listeners and dispatches events.
pub struct RigEventEmitter {
    listeners: Vec<(ListenerId, Arc<dyn RigListener>)>,
}

impl Default for RigEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RigEventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener. The returned id unregisters it.
    pub fn register(&mut self, listener: Arc<dyn RigListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push((id, listener));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify_frequency_change(&self, old_hz: f64, new_hz: f64) {
        for (_, listener) in &self.listeners {
            listener.on_frequency_change(old_hz, new_hz);
        }
    }

    pub fn notify_mode_change(&self, mode: RigMode, width: Passband) {
        for (_, listener) in &self.listeners {
            listener.on_mode_change(mode, width);
        }
    }

    pub fn notify_ptt_change(&self, ptt: PttState) {
        for (_, listener) in &self.listeners {
            listener.on_ptt_change(ptt);
        }
    }

    pub fn notify_state_change(&self, old: SessionState, new: SessionState) {
        for (_, listener) in &self.listeners {
            listener.on_state_change(old, new);
        }
    }

    pub fn notify_communication_lost(&self, last_status: Option<&str>) {
        for (_, listener) in &self.listeners {
            listener.on_communication_lost(last_status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    struct TestListener {
        freq_changed: AtomicBool,
        ptt_changed: AtomicBool,
        lost: AtomicUsize,
    }

    impl TestListener {
        fn new() -> Self {
            Self {
                freq_changed: AtomicBool::new(false),
                ptt_changed: AtomicBool::new(false),
                lost: AtomicUsize::new(0),
            }
        }
    }

    impl RigListener for TestListener {
        fn on_frequency_change(&self, _old_hz: f64, _new_hz: f64) {
            self.freq_changed.store(true, Ordering::Relaxed);
        }

        fn on_ptt_change(&self, _ptt: PttState) {
            self.ptt_changed.store(true, Ordering::Relaxed);
        }

        fn on_communication_lost(&self, _last_status: Option<&str>) {
            self.lost.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_register_and_notify() {
        let mut emitter = RigEventEmitter::new();
        let listener = Arc::new(TestListener::new());
        let id = emitter.register(listener.clone());

        assert_eq!(emitter.listener_count(), 1);

        emitter.notify_frequency_change(0.0, 14_200_000.0);
        assert!(listener.freq_changed.load(Ordering::Relaxed));
        assert!(!listener.ptt_changed.load(Ordering::Relaxed));

        emitter.notify_ptt_change(PttState::On);
        assert!(listener.ptt_changed.load(Ordering::Relaxed));

        emitter.unregister(id);
        assert_eq!(emitter.listener_count(), 0);

        emitter.notify_communication_lost(Some("timeout"));
        assert_eq!(listener.lost.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_multiple_listeners() {
        let mut emitter = RigEventEmitter::new();
        let listener1 = Arc::new(TestListener::new());
        let listener2 = Arc::new(TestListener::new());

        emitter.register(listener1.clone());
        emitter.register(listener2.clone());

        emitter.notify_communication_lost(None);
        assert_eq!(listener1.lost.load(Ordering::Relaxed), 1);
        assert_eq!(listener2.lost.load(Ordering::Relaxed), 1);
    }
}
