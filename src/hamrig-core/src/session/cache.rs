// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::Serialize;

use crate::rig::controller::RigEventEmitter;
use crate::rig::types::{Passband, PttState, RigMode, PASSBAND_NORMAL};

/// Last known rig state as seen by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedState {
    pub frequency: f64,
    pub mode: RigMode,
    pub width: Passband,
    pub ptt: PttState,
    /// Message of the most recent failed command, cleared on success.
    pub last_status: Option<String>,
}

impl Default for CachedState {
    fn default() -> Self {
        Self {
            frequency: 0.0,
            mode: RigMode::NONE,
            width: PASSBAND_NORMAL,
            ptt: PttState::Off,
            last_status: None,
        }
    }
}

/// A value learned from a successful native call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheUpdate {
    Frequency(f64),
    Mode(RigMode, Passband),
    Ptt(PttState),
}

impl CachedState {
    /// Store `update`; returns the change to announce, if any.
    pub(crate) fn apply(&mut self, update: CacheUpdate) -> Option<CacheChange> {
        match update {
            CacheUpdate::Frequency(hz) => {
                let old = std::mem::replace(&mut self.frequency, hz);
                (old != hz).then_some(CacheChange::Frequency { old, new: hz })
            }
            CacheUpdate::Mode(mode, width) => {
                let changed = self.mode != mode || self.width != width;
                self.mode = mode;
                self.width = width;
                changed.then_some(CacheChange::Mode(mode, width))
            }
            CacheUpdate::Ptt(ptt) => {
                let old = std::mem::replace(&mut self.ptt, ptt);
                (old != ptt).then_some(CacheChange::Ptt(ptt))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CacheChange {
    Frequency { old: f64, new: f64 },
    Mode(RigMode, Passband),
    Ptt(PttState),
}

impl CacheChange {
    pub(crate) fn emit(self, emitter: &RigEventEmitter) {
        match self {
            Self::Frequency { old, new } => emitter.notify_frequency_change(old, new),
            Self::Mode(mode, width) => emitter.notify_mode_change(mode, width),
            Self::Ptt(ptt) => emitter.notify_ptt_change(ptt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reports_changes_only() {
        let mut cache = CachedState::default();
        assert_eq!(
            cache.apply(CacheUpdate::Frequency(14.074e6)),
            Some(CacheChange::Frequency { old: 0.0, new: 14.074e6 })
        );
        assert_eq!(cache.apply(CacheUpdate::Frequency(14.074e6)), None);

        assert!(cache.apply(CacheUpdate::Mode(RigMode::USB, 2400)).is_some());
        assert!(cache.apply(CacheUpdate::Mode(RigMode::USB, 1800)).is_some());
        assert_eq!(cache.apply(CacheUpdate::Mode(RigMode::USB, 1800)), None);

        assert_eq!(cache.apply(CacheUpdate::Ptt(PttState::Off)), None);
        assert_eq!(
            cache.apply(CacheUpdate::Ptt(PttState::On)),
            Some(CacheChange::Ptt(PttState::On))
        );
        assert_eq!(cache.frequency, 14.074e6);
        assert_eq!(cache.width, 1800);
    }
}
