// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::ffi::{c_char, c_int, CStr, CString};
use std::ptr::NonNull;
use std::sync::Arc;

use hamrig_core::rig::types::{
    ConfToken, DcdState, Func, Level, Parm, Passband, PowerState, PttState, RepeaterShift,
    ResetKind, RigMode, ScanOp, Split, Value, Vfo, VfoOp,
};
use hamrig_core::{NativeResult, NativeRig, NativeStatus};
use tracing::warn;

use super::ffi::{self, HamlibApi, RawValue, Rig};

const CONF_BUFFER: usize = 1024;

fn cstring(value: &str) -> NativeResult<CString> {
    CString::new(value).map_err(|_| NativeStatus::InvalidParameter)
}

fn raw_value(value: Value) -> RawValue {
    match value {
        Value::Int(i) => RawValue { i },
        Value::Float(f) => RawValue { f },
    }
}

/// Read the member of `raw` that `kind` names.
fn typed_value(raw: RawValue, kind: Value) -> Value {
    // SAFETY: the library wrote the member matching the setting's kind.
    unsafe {
        match kind {
            Value::Int(_) => Value::Int(raw.i),
            Value::Float(_) => Value::Float(raw.f),
        }
    }
}

fn empty_value() -> RawValue {
    RawValue {
        s: std::ptr::null(),
    }
}

/// One `RIG *` owned by this process.
pub struct HamlibRig {
    api: Arc<HamlibApi>,
    handle: Option<NonNull<Rig>>,
}

// SAFETY: the handle is only ever used from one thread at a time; the
// session moves it onto its worker and serializes every call.
unsafe impl Send for HamlibRig {}

impl HamlibRig {
    /// Take ownership of a handle returned by `rig_init`.
    pub(crate) fn new(api: Arc<HamlibApi>, handle: NonNull<Rig>) -> Self {
        Self {
            api,
            handle: Some(handle),
        }
    }

    fn handle(&self) -> NativeResult<*mut Rig> {
        self.handle
            .map(NonNull::as_ptr)
            .ok_or(NativeStatus::InvalidHandle)
    }

    /// Run a status-returning call against the handle.
    fn call(&self, f: impl FnOnce(*mut Rig) -> c_int) -> NativeResult<()> {
        let rig = self.handle()?;
        NativeStatus::check(f(rig))
    }

    fn vfo(vfo: Vfo) -> ffi::Vfo {
        vfo.raw()
    }
}

impl Drop for HamlibRig {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.cleanup() {
                warn!("rig_cleanup on drop failed: {}", e);
            }
        }
    }
}

impl NativeRig for HamlibRig {
    fn open(&mut self) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_open)(rig) })
    }

    fn close(&mut self) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_close)(rig) })
    }

    fn cleanup(&mut self) -> NativeResult<()> {
        let rig = self.handle()?;
        self.handle = None;
        NativeStatus::check(unsafe { (self.api.rig_cleanup)(rig) })
    }

    fn error_text(&self, status: NativeStatus) -> String {
        self.api
            .error_text(-status.code())
            .unwrap_or_else(|| status.fallback_text().to_string())
    }

    fn token_lookup(&self, name: &str) -> NativeResult<ConfToken> {
        let rig = self.handle()?;
        let name = cstring(name)?;
        let token = unsafe { (self.api.rig_token_lookup)(rig, name.as_ptr()) };
        Ok(ConfToken(token as i64))
    }

    fn set_conf(&mut self, token: ConfToken, value: &str) -> NativeResult<()> {
        let value = cstring(value)?;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_conf)(rig, token.0 as ffi::Token, value.as_ptr()) })
    }

    fn get_conf(&mut self, token: ConfToken) -> NativeResult<String> {
        let mut buf = vec![0 as c_char; CONF_BUFFER];
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_get_conf)(rig, token.0 as ffi::Token, buf.as_mut_ptr())
        })?;
        buf[CONF_BUFFER - 1] = 0;
        // SAFETY: the buffer is NUL-terminated above.
        Ok(unsafe { CStr::from_ptr(buf.as_ptr()) }
            .to_string_lossy()
            .into_owned())
    }

    fn set_freq(&mut self, vfo: Vfo, freq_hz: f64) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_freq)(rig, Self::vfo(vfo), freq_hz) })
    }

    fn get_freq(&mut self, vfo: Vfo) -> NativeResult<f64> {
        let mut freq = 0.0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_freq)(rig, Self::vfo(vfo), &mut freq) })?;
        Ok(freq)
    }

    fn set_mode(&mut self, vfo: Vfo, mode: RigMode, width: Passband) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_mode)(rig, Self::vfo(vfo), mode.bits(), width as ffi::ShortFreq)
        })
    }

    fn get_mode(&mut self, vfo: Vfo) -> NativeResult<(RigMode, Passband)> {
        let (mut mode, mut width) = (0, 0);
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_mode)(rig, Self::vfo(vfo), &mut mode, &mut width) })?;
        Ok((RigMode(mode), width as Passband))
    }

    fn set_ptt(&mut self, vfo: Vfo, ptt: PttState) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_ptt)(rig, Self::vfo(vfo), ptt.raw()) })
    }

    fn get_ptt(&mut self, vfo: Vfo) -> NativeResult<PttState> {
        let mut ptt = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_ptt)(rig, Self::vfo(vfo), &mut ptt) })?;
        Ok(PttState::from_raw(ptt))
    }

    fn set_vfo(&mut self, vfo: Vfo) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_vfo)(rig, Self::vfo(vfo)) })
    }

    fn get_vfo(&mut self) -> NativeResult<Vfo> {
        let mut vfo = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_vfo)(rig, &mut vfo) })?;
        Ok(Vfo(vfo))
    }

    fn get_dcd(&mut self, vfo: Vfo) -> NativeResult<DcdState> {
        let mut dcd = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_dcd)(rig, Self::vfo(vfo), &mut dcd) })?;
        Ok(DcdState::from_raw(dcd))
    }

    fn set_level(&mut self, vfo: Vfo, level: Level, value: Value) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_level)(
                rig,
                Self::vfo(vfo),
                level.bits() as ffi::Setting,
                raw_value(value),
            )
        })
    }

    fn get_level(&mut self, vfo: Vfo, level: Level, kind: Value) -> NativeResult<Value> {
        let mut raw = empty_value();
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_get_level)(rig, Self::vfo(vfo), level.bits() as ffi::Setting, &mut raw)
        })?;
        Ok(typed_value(raw, kind))
    }

    fn set_parm(&mut self, parm: Parm, value: Value) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_parm)(rig, parm.bits() as ffi::Setting, raw_value(value))
        })
    }

    fn get_parm(&mut self, parm: Parm, kind: Value) -> NativeResult<Value> {
        let mut raw = empty_value();
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_parm)(rig, parm.bits() as ffi::Setting, &mut raw) })?;
        Ok(typed_value(raw, kind))
    }

    fn set_func(&mut self, vfo: Vfo, func: Func, on: bool) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_func)(rig, Self::vfo(vfo), func.bits() as ffi::Setting, on as c_int)
        })
    }

    fn get_func(&mut self, vfo: Vfo, func: Func) -> NativeResult<bool> {
        let mut status = 0;
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_get_func)(rig, Self::vfo(vfo), func.bits() as ffi::Setting, &mut status)
        })?;
        Ok(status != 0)
    }

    fn set_split_freq(&mut self, vfo: Vfo, tx_freq_hz: f64) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_split_freq)(rig, Self::vfo(vfo), tx_freq_hz) })
    }

    fn get_split_freq(&mut self, vfo: Vfo) -> NativeResult<f64> {
        let mut freq = 0.0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_split_freq)(rig, Self::vfo(vfo), &mut freq) })?;
        Ok(freq)
    }

    fn set_split_mode(&mut self, vfo: Vfo, mode: RigMode, width: Passband) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_split_mode)(rig, Self::vfo(vfo), mode.bits(), width as ffi::ShortFreq)
        })
    }

    fn get_split_mode(&mut self, vfo: Vfo) -> NativeResult<(RigMode, Passband)> {
        let (mut mode, mut width) = (0, 0);
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_get_split_mode)(rig, Self::vfo(vfo), &mut mode, &mut width)
        })?;
        Ok((RigMode(mode), width as Passband))
    }

    fn set_split_vfo(&mut self, vfo: Vfo, split: Split, tx_vfo: Vfo) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_split_vfo)(rig, Self::vfo(vfo), split.raw(), Self::vfo(tx_vfo))
        })
    }

    fn get_split_vfo(&mut self, vfo: Vfo) -> NativeResult<(Split, Vfo)> {
        let (mut split, mut tx_vfo) = (0, 0);
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_get_split_vfo)(rig, Self::vfo(vfo), &mut split, &mut tx_vfo)
        })?;
        Ok((Split::from_raw(split), Vfo(tx_vfo)))
    }

    fn set_rit(&mut self, vfo: Vfo, offset_hz: i64) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_rit)(rig, Self::vfo(vfo), offset_hz as ffi::ShortFreq)
        })
    }

    fn get_rit(&mut self, vfo: Vfo) -> NativeResult<i64> {
        let mut offset = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_rit)(rig, Self::vfo(vfo), &mut offset) })?;
        Ok(offset as i64)
    }

    fn set_xit(&mut self, vfo: Vfo, offset_hz: i64) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_xit)(rig, Self::vfo(vfo), offset_hz as ffi::ShortFreq)
        })
    }

    fn get_xit(&mut self, vfo: Vfo) -> NativeResult<i64> {
        let mut offset = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_xit)(rig, Self::vfo(vfo), &mut offset) })?;
        Ok(offset as i64)
    }

    fn set_ts(&mut self, vfo: Vfo, step_hz: i64) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_ts)(rig, Self::vfo(vfo), step_hz as ffi::ShortFreq) })
    }

    fn get_ts(&mut self, vfo: Vfo) -> NativeResult<i64> {
        let mut step = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_ts)(rig, Self::vfo(vfo), &mut step) })?;
        Ok(step as i64)
    }

    fn set_ctcss_tone(&mut self, vfo: Vfo, tone: u32) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_ctcss_tone)(rig, Self::vfo(vfo), tone) })
    }

    fn get_ctcss_tone(&mut self, vfo: Vfo) -> NativeResult<u32> {
        let mut tone = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_ctcss_tone)(rig, Self::vfo(vfo), &mut tone) })?;
        Ok(tone)
    }

    fn set_dcs_code(&mut self, vfo: Vfo, code: u32) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_dcs_code)(rig, Self::vfo(vfo), code) })
    }

    fn get_dcs_code(&mut self, vfo: Vfo) -> NativeResult<u32> {
        let mut code = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_dcs_code)(rig, Self::vfo(vfo), &mut code) })?;
        Ok(code)
    }

    fn set_rptr_shift(&mut self, vfo: Vfo, shift: RepeaterShift) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_rptr_shift)(rig, Self::vfo(vfo), shift.raw()) })
    }

    fn get_rptr_shift(&mut self, vfo: Vfo) -> NativeResult<RepeaterShift> {
        let mut shift = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_rptr_shift)(rig, Self::vfo(vfo), &mut shift) })?;
        Ok(RepeaterShift::from_raw(shift))
    }

    fn set_rptr_offs(&mut self, vfo: Vfo, offset_hz: i64) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_set_rptr_offs)(rig, Self::vfo(vfo), offset_hz as ffi::ShortFreq)
        })
    }

    fn get_rptr_offs(&mut self, vfo: Vfo) -> NativeResult<i64> {
        let mut offset = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_rptr_offs)(rig, Self::vfo(vfo), &mut offset) })?;
        Ok(offset as i64)
    }

    fn set_ant(&mut self, vfo: Vfo, ant: u32) -> NativeResult<()> {
        let ant = c_int::try_from(ant).map_err(|_| NativeStatus::InvalidParameter)?;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_ant)(rig, Self::vfo(vfo), ant) })
    }

    fn get_ant(&mut self, vfo: Vfo) -> NativeResult<u32> {
        let mut ant = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_ant)(rig, Self::vfo(vfo), &mut ant) })?;
        Ok(ant.max(0) as u32)
    }

    fn set_mem(&mut self, vfo: Vfo, channel: i32) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_mem)(rig, Self::vfo(vfo), channel) })
    }

    fn get_mem(&mut self, vfo: Vfo) -> NativeResult<i32> {
        let mut channel = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_mem)(rig, Self::vfo(vfo), &mut channel) })?;
        Ok(channel)
    }

    fn set_bank(&mut self, vfo: Vfo, bank: i32) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_bank)(rig, Self::vfo(vfo), bank) })
    }

    fn vfo_op(&mut self, vfo: Vfo, op: VfoOp) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_vfo_op)(rig, Self::vfo(vfo), op.bits() as c_int) })
    }

    fn scan(&mut self, vfo: Vfo, scan: ScanOp, channel: i32) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe {
            (api.rig_scan)(rig, Self::vfo(vfo), scan.bits() as c_int, channel)
        })
    }

    fn set_powerstat(&mut self, state: PowerState) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_set_powerstat)(rig, state.raw()) })
    }

    fn get_powerstat(&mut self) -> NativeResult<PowerState> {
        let mut state = 0;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_get_powerstat)(rig, &mut state) })?;
        Ok(PowerState::from_raw(state))
    }

    fn reset(&mut self, kind: ResetKind) -> NativeResult<()> {
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_reset)(rig, kind.raw()) })
    }

    fn send_morse(&mut self, vfo: Vfo, text: &str) -> NativeResult<()> {
        let text = cstring(text)?;
        let api = &self.api;
        self.call(|rig| unsafe { (api.rig_send_morse)(rig, Self::vfo(vfo), text.as_ptr()) })
    }

    fn get_info(&mut self) -> NativeResult<String> {
        let rig = self.handle()?;
        unsafe { ffi::c_string((self.api.rig_get_info)(rig)) }.ok_or(NativeStatus::NotAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_union_members() {
        let raw = raw_value(Value::Float(0.25));
        assert_eq!(typed_value(raw, Value::Float(0.0)), Value::Float(0.25));
        let raw = raw_value(Value::Int(-12));
        assert_eq!(typed_value(raw, Value::Int(0)), Value::Int(-12));
    }

    #[test]
    fn test_value_union_is_pointer_sized() {
        assert_eq!(
            std::mem::size_of::<RawValue>(),
            std::mem::size_of::<*const c_char>()
        );
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        assert_eq!(cstring("CQ\0CQ").err(), Some(NativeStatus::InvalidParameter));
    }
}
