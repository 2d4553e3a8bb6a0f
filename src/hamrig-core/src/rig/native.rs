// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Boundary to the native rig-control library.
//!
//! [`NativeRig`] is one native rig handle. Calls are synchronous and
//! return the library's status unchanged; translation into [`RigError`]
//! happens in the session. Operations a backend does not bind default to
//! [`NativeStatus::NotImplemented`], which is also what the native library
//! reports for a model lacking the corresponding callback.
//!
//! [`RigError`]: crate::RigError

use crate::error::{NativeResult, NativeStatus};
use crate::rig::types::{
    ConfToken, DcdState, Func, Level, Parm, Passband, PowerState, PttState, RepeaterShift,
    ResetKind, RigMode, ScanOp, Split, Value, Vfo, VfoOp,
};

/// One native rig handle. Implementations are moved onto the session
/// worker thread, so they must be `Send`; nothing calls them concurrently.
pub trait NativeRig: Send {
    fn open(&mut self) -> NativeResult<()>;
    fn close(&mut self) -> NativeResult<()>;
    /// Release the native handle. Called once, after the final close.
    fn cleanup(&mut self) -> NativeResult<()>;

    /// Library description of a status code.
    fn error_text(&self, status: NativeStatus) -> String {
        status.fallback_text().to_string()
    }

    fn token_lookup(&self, name: &str) -> NativeResult<ConfToken>;
    fn set_conf(&mut self, token: ConfToken, value: &str) -> NativeResult<()>;
    fn get_conf(&mut self, token: ConfToken) -> NativeResult<String>;

    fn set_freq(&mut self, vfo: Vfo, freq_hz: f64) -> NativeResult<()>;
    fn get_freq(&mut self, vfo: Vfo) -> NativeResult<f64>;
    fn set_mode(&mut self, vfo: Vfo, mode: RigMode, width: Passband) -> NativeResult<()>;
    fn get_mode(&mut self, vfo: Vfo) -> NativeResult<(RigMode, Passband)>;
    fn set_ptt(&mut self, vfo: Vfo, ptt: PttState) -> NativeResult<()>;
    fn get_ptt(&mut self, vfo: Vfo) -> NativeResult<PttState>;

    fn set_vfo(&mut self, _vfo: Vfo) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_vfo(&mut self) -> NativeResult<Vfo> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_dcd(&mut self, _vfo: Vfo) -> NativeResult<DcdState> {
        Err(NativeStatus::NotImplemented)
    }

    fn set_level(&mut self, _vfo: Vfo, _level: Level, _value: Value) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    /// `kind` selects an int or float read; its payload is ignored.
    fn get_level(&mut self, _vfo: Vfo, _level: Level, _kind: Value) -> NativeResult<Value> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_parm(&mut self, _parm: Parm, _value: Value) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_parm(&mut self, _parm: Parm, _kind: Value) -> NativeResult<Value> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_func(&mut self, _vfo: Vfo, _func: Func, _on: bool) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_func(&mut self, _vfo: Vfo, _func: Func) -> NativeResult<bool> {
        Err(NativeStatus::NotImplemented)
    }

    fn set_split_freq(&mut self, _vfo: Vfo, _tx_freq_hz: f64) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_split_freq(&mut self, _vfo: Vfo) -> NativeResult<f64> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_split_mode(&mut self, _vfo: Vfo, _mode: RigMode, _width: Passband) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_split_mode(&mut self, _vfo: Vfo) -> NativeResult<(RigMode, Passband)> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_split_vfo(&mut self, _vfo: Vfo, _split: Split, _tx_vfo: Vfo) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_split_vfo(&mut self, _vfo: Vfo) -> NativeResult<(Split, Vfo)> {
        Err(NativeStatus::NotImplemented)
    }

    fn set_rit(&mut self, _vfo: Vfo, _offset_hz: i64) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_rit(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_xit(&mut self, _vfo: Vfo, _offset_hz: i64) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_xit(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_ts(&mut self, _vfo: Vfo, _step_hz: i64) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_ts(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        Err(NativeStatus::NotImplemented)
    }

    /// Tone in tenths of Hz (885 = 88.5 Hz).
    fn set_ctcss_tone(&mut self, _vfo: Vfo, _tone: u32) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_ctcss_tone(&mut self, _vfo: Vfo) -> NativeResult<u32> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_dcs_code(&mut self, _vfo: Vfo, _code: u32) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_dcs_code(&mut self, _vfo: Vfo) -> NativeResult<u32> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_rptr_shift(&mut self, _vfo: Vfo, _shift: RepeaterShift) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_rptr_shift(&mut self, _vfo: Vfo) -> NativeResult<RepeaterShift> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_rptr_offs(&mut self, _vfo: Vfo, _offset_hz: i64) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_rptr_offs(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        Err(NativeStatus::NotImplemented)
    }

    fn set_ant(&mut self, _vfo: Vfo, _ant: u32) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_ant(&mut self, _vfo: Vfo) -> NativeResult<u32> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_mem(&mut self, _vfo: Vfo, _channel: i32) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_mem(&mut self, _vfo: Vfo) -> NativeResult<i32> {
        Err(NativeStatus::NotImplemented)
    }
    fn set_bank(&mut self, _vfo: Vfo, _bank: i32) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn vfo_op(&mut self, _vfo: Vfo, _op: VfoOp) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn scan(&mut self, _vfo: Vfo, _scan: ScanOp, _channel: i32) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }

    fn set_powerstat(&mut self, _state: PowerState) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_powerstat(&mut self) -> NativeResult<PowerState> {
        Err(NativeStatus::NotImplemented)
    }
    fn reset(&mut self, _kind: ResetKind) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn send_morse(&mut self, _vfo: Vfo, _text: &str) -> NativeResult<()> {
        Err(NativeStatus::NotImplemented)
    }
    fn get_info(&mut self) -> NativeResult<String> {
        Err(NativeStatus::NotImplemented)
    }
}

/// Read access to memory owned by the native library.
///
/// Addresses are plain integers so the same decoder runs against the real
/// process and against synthetic blocks built for another data model.
pub trait NativeMemory {
    /// Fill `buf` from `addr`. Returns `false` when the range is unreadable.
    fn read(&self, addr: u64, buf: &mut [u8]) -> bool;

    /// Read a NUL-terminated string of at most `max` bytes.
    fn read_c_string(&self, addr: u64, max: usize) -> Option<String> {
        if addr == 0 {
            return None;
        }
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        for offset in 0..max as u64 {
            if !self.read(addr.checked_add(offset)?, &mut byte) {
                return None;
            }
            if byte[0] == 0 {
                break;
            }
            out.push(byte[0]);
        }
        Some(String::from_utf8_lossy(&out).into_owned())
    }
}
