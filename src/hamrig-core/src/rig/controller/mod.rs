// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Session controller components.
//!
//! Lifecycle state machine, listener fan-out, and the polling and failure
//! policies the scheduler consults.

pub mod events;
pub mod machine;
pub mod policies;

pub use events::{ListenerId, RigEventEmitter, RigListener};
pub use machine::{SessionEvent, SessionState, SessionStateMachine};
pub use policies::{
    FailureThreshold, FixedPolling, PollingPolicy, DEFAULT_FAILURE_LIMIT, MIN_POLL_INTERVAL,
};
