// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Scriptable native rig for session tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::error::{NativeResult, NativeStatus};
use crate::rig::caps::CapabilitySet;
use crate::rig::native::NativeRig;
use crate::rig::types::{conf, ConfToken, Level, Passband, PttState, RigMode, Value, Vfo};

use super::{RigSession, SessionConfig};

const TOKENS: [&str; 10] = [
    conf::RIG_PATHNAME,
    conf::SERIAL_SPEED,
    conf::DATA_BITS,
    conf::STOP_BITS,
    conf::SERIAL_PARITY,
    conf::SERIAL_HANDSHAKE,
    conf::WRITE_DELAY,
    conf::POST_WRITE_DELAY,
    conf::TIMEOUT,
    conf::RETRY,
];

#[derive(Debug, Default)]
pub struct FakeState {
    pub calls: Vec<(String, ThreadId)>,
    pub open: bool,
    pub cleaned_up: bool,
    pub freq: f64,
    pub mode: (RigMode, Passband),
    pub ptt: PttState,
    pub vfo: Option<Vfo>,
    pub levels: HashMap<u64, Value>,
    pub conf: HashMap<i64, String>,
    /// Only this rate answers `get_ptt`, when set.
    pub accepted_baud: Option<u32>,
    pub fail_all: bool,
    pub failing: HashSet<&'static str>,
    pub delay: Duration,
}

/// Test-side handle to the state a [`FakeRig`] mutates.
#[derive(Debug, Clone, Default)]
pub struct FakeHandle(Arc<Mutex<FakeState>>);

impl FakeHandle {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn fail(&self, op: &'static str) {
        self.state().failing.insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.state().failing.remove(op);
    }
}

pub struct FakeRig {
    handle: FakeHandle,
}

impl FakeRig {
    pub fn new() -> (Self, FakeHandle) {
        let handle = FakeHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }

    /// Log the call, apply the scripted delay and failures.
    fn enter(&self, call: String, op: &'static str) -> NativeResult<MutexGuard<'_, FakeState>> {
        let delay = {
            let mut state = self.handle.state();
            state.calls.push((call, thread::current().id()));
            state.delay
        };
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let state = self.handle.state();
        if state.fail_all || state.failing.contains(op) {
            return Err(NativeStatus::Io);
        }
        Ok(state)
    }
}

impl NativeRig for FakeRig {
    fn open(&mut self) -> NativeResult<()> {
        let mut state = self.enter("open".into(), "open")?;
        state.open = true;
        Ok(())
    }

    fn close(&mut self) -> NativeResult<()> {
        let mut state = self.enter("close".into(), "close")?;
        state.open = false;
        Ok(())
    }

    fn cleanup(&mut self) -> NativeResult<()> {
        let mut state = self.enter("cleanup".into(), "cleanup")?;
        state.cleaned_up = true;
        Ok(())
    }

    fn token_lookup(&self, name: &str) -> NativeResult<ConfToken> {
        Ok(TOKENS
            .iter()
            .position(|t| *t == name)
            .map(|i| ConfToken(i as i64 + 1))
            .unwrap_or(ConfToken::NULL))
    }

    fn set_conf(&mut self, token: ConfToken, value: &str) -> NativeResult<()> {
        let mut state = self.enter(format!("set_conf {} {}", token.0, value), "set_conf")?;
        state.conf.insert(token.0, value.to_string());
        Ok(())
    }

    fn get_conf(&mut self, token: ConfToken) -> NativeResult<String> {
        let state = self.enter(format!("get_conf {}", token.0), "get_conf")?;
        state
            .conf
            .get(&token.0)
            .cloned()
            .ok_or(NativeStatus::InvalidParameter)
    }

    fn set_freq(&mut self, _vfo: Vfo, freq_hz: f64) -> NativeResult<()> {
        let mut state = self.enter(format!("set_freq {freq_hz}"), "set_freq")?;
        state.freq = freq_hz;
        Ok(())
    }

    fn get_freq(&mut self, _vfo: Vfo) -> NativeResult<f64> {
        Ok(self.enter("get_freq".into(), "get_freq")?.freq)
    }

    fn set_mode(&mut self, _vfo: Vfo, mode: RigMode, width: Passband) -> NativeResult<()> {
        let mut state = self.enter(format!("set_mode {mode} {width}"), "set_mode")?;
        state.mode = (mode, width);
        Ok(())
    }

    fn get_mode(&mut self, _vfo: Vfo) -> NativeResult<(RigMode, Passband)> {
        Ok(self.enter("get_mode".into(), "get_mode")?.mode)
    }

    fn set_ptt(&mut self, _vfo: Vfo, ptt: PttState) -> NativeResult<()> {
        let mut state = self.enter(format!("set_ptt {ptt:?}"), "set_ptt")?;
        state.ptt = ptt;
        Ok(())
    }

    fn get_ptt(&mut self, _vfo: Vfo) -> NativeResult<PttState> {
        let state = self.enter("get_ptt".into(), "get_ptt")?;
        if let Some(rate) = state.accepted_baud {
            let speed_token = ConfToken(2);
            if state.conf.get(&speed_token.0) != Some(&rate.to_string()) {
                return Err(NativeStatus::Timeout);
            }
        }
        Ok(state.ptt)
    }

    fn set_vfo(&mut self, vfo: Vfo) -> NativeResult<()> {
        let mut state = self.enter(format!("set_vfo {}", vfo.raw()), "set_vfo")?;
        state.vfo = Some(vfo);
        Ok(())
    }

    fn get_vfo(&mut self) -> NativeResult<Vfo> {
        let state = self.enter("get_vfo".into(), "get_vfo")?;
        state.vfo.ok_or(NativeStatus::NotAvailable)
    }

    fn set_level(&mut self, _vfo: Vfo, level: Level, value: Value) -> NativeResult<()> {
        let mut state = self.enter(format!("set_level {}", level.bits()), "set_level")?;
        state.levels.insert(level.bits(), value);
        Ok(())
    }

    fn get_level(&mut self, _vfo: Vfo, level: Level, kind: Value) -> NativeResult<Value> {
        let state = self.enter(format!("get_level {}", level.bits()), "get_level")?;
        Ok(state.levels.get(&level.bits()).copied().unwrap_or(kind))
    }
}

/// Session over a fresh [`FakeRig`] with default tunables.
pub fn fake_session(caps: CapabilitySet) -> (RigSession, FakeHandle) {
    let (rig, handle) = FakeRig::new();
    let session = RigSession::new(Box::new(rig), Arc::new(caps), SessionConfig::default());
    (session, handle)
}
