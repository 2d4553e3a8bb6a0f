// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Bound native operations on a [`RigSession`].
//!
//! Frequency, mode and PTT setters and the `update_*` refreshers are
//! fire-and-forget while running. Everything else waits for its reply.

use crate::error::{NativeStatus, RigError, RigResult};
use crate::rig::controller::SessionState;
use crate::rig::types::{
    conf, ConfToken, DcdState, Func, Level, Parm, Passband, PowerState, PttState, RepeaterShift,
    ResetKind, RigMode, ScanOp, Split, Value, Vfo, VfoOp,
};

use super::{Admit, CacheUpdate, Refresh, RigSession};

fn check_kind(
    what: &str,
    names: &[&str],
    float_setting: bool,
    float_value: bool,
) -> RigResult<()> {
    if float_setting == float_value {
        return Ok(());
    }
    let expected = if float_setting { "float" } else { "int" };
    Err(RigError::native(
        NativeStatus::InvalidParameter,
        format!("{what} {} takes {expected} values", names.join("|")),
    ))
}

fn probe(float: bool) -> Value {
    if float {
        Value::Float(0.0)
    } else {
        Value::Int(0)
    }
}

impl RigSession {
    // Configuration

    pub fn token_lookup(&self, name: &str) -> RigResult<ConfToken> {
        let name = name.to_string();
        self.call(Admit::Any, move |s| s.lookup(&name))
    }

    pub fn set_conf(&self, name: &str, value: &str) -> RigResult<()> {
        let (name, value) = (name.to_string(), value.to_string());
        self.call(Admit::Any, move |s| s.set_conf(&name, &value))
    }

    pub fn get_conf(&self, name: &str) -> RigResult<String> {
        let name = name.to_string();
        self.call(Admit::Any, move |s| s.get_conf(&name))
    }

    pub fn set_conf_token(&self, token: ConfToken, value: &str) -> RigResult<()> {
        let value = value.to_string();
        self.call(Admit::Any, move |s| {
            s.native(|rig| rig.set_conf(token, &value))
        })
    }

    pub fn get_conf_token(&self, token: ConfToken) -> RigResult<String> {
        self.call(Admit::Any, move |s| s.native(|rig| rig.get_conf(token)))
    }

    /// Line rate the backend is configured for.
    pub fn serial_rate(&self) -> RigResult<u32> {
        let value = self.call(Admit::Open, |s| s.get_conf(conf::SERIAL_SPEED))?;
        value.trim().parse().map_err(|_| {
            RigError::native(
                NativeStatus::Protocol,
                format!("unexpected serial_speed value {value:?}"),
            )
        })
    }

    pub fn rig_path(&self) -> RigResult<String> {
        self.call(Admit::Open, |s| s.get_conf(conf::RIG_PATHNAME))
    }

    /// Library description of a native status.
    pub fn error_text(&self, status: NativeStatus) -> String {
        super::lock(&self.shared.rig).error_text(status)
    }

    // Frequency, mode, PTT

    pub fn set_frequency(&self, freq_hz: f64) -> RigResult<()> {
        self.post(move |s| {
            s.native(|rig| rig.set_freq(Vfo::CURRENT, freq_hz))?;
            s.apply(CacheUpdate::Frequency(freq_hz));
            Ok(())
        })
    }

    pub fn get_frequency(&self) -> RigResult<f64> {
        self.call(Admit::Open, |s| {
            let hz = s.native(|rig| rig.get_freq(Vfo::CURRENT))?;
            s.apply(CacheUpdate::Frequency(hz));
            Ok(hz)
        })
    }

    /// Cached frequency while running, a direct read otherwise.
    pub fn frequency(&self) -> RigResult<f64> {
        if self.state() == SessionState::Running {
            return Ok(self.cached().frequency);
        }
        self.get_frequency()
    }

    pub fn update_frequency(&self) -> RigResult<()> {
        self.post(|s| s.refresh(Refresh::Frequency))
    }

    pub fn set_mode(&self, mode: RigMode, width: Passband) -> RigResult<()> {
        self.post(move |s| {
            s.native(|rig| rig.set_mode(Vfo::CURRENT, mode, width))?;
            s.apply(CacheUpdate::Mode(mode, width));
            Ok(())
        })
    }

    pub fn get_mode(&self) -> RigResult<(RigMode, Passband)> {
        self.call(Admit::Open, |s| {
            let (mode, width) = s.native(|rig| rig.get_mode(Vfo::CURRENT))?;
            s.apply(CacheUpdate::Mode(mode, width));
            Ok((mode, width))
        })
    }

    pub fn mode(&self) -> RigResult<(RigMode, Passband)> {
        if self.state() == SessionState::Running {
            let cached = self.cached();
            return Ok((cached.mode, cached.width));
        }
        self.get_mode()
    }

    pub fn update_mode(&self) -> RigResult<()> {
        self.post(|s| s.refresh(Refresh::Mode))
    }

    pub fn set_ptt(&self, ptt: PttState) -> RigResult<()> {
        self.post(move |s| {
            s.native(|rig| rig.set_ptt(Vfo::CURRENT, ptt))?;
            s.apply(CacheUpdate::Ptt(ptt));
            Ok(())
        })
    }

    pub fn get_ptt(&self) -> RigResult<PttState> {
        self.call(Admit::Open, |s| {
            let ptt = s.native(|rig| rig.get_ptt(Vfo::CURRENT))?;
            s.apply(CacheUpdate::Ptt(ptt));
            Ok(ptt)
        })
    }

    pub fn ptt(&self) -> RigResult<PttState> {
        if self.state() == SessionState::Running {
            return Ok(self.cached().ptt);
        }
        self.get_ptt()
    }

    pub fn update_ptt(&self) -> RigResult<()> {
        self.post(|s| s.refresh(Refresh::Ptt))
    }

    // VFO and squelch

    pub fn set_vfo(&self, vfo: Vfo) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_vfo(vfo)))
    }

    pub fn get_vfo(&self) -> RigResult<Vfo> {
        self.call(Admit::Open, |s| s.native(|rig| rig.get_vfo()))
    }

    pub fn get_dcd(&self, vfo: Vfo) -> RigResult<DcdState> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_dcd(vfo)))
    }

    // Levels, parameters, functions

    pub fn set_level(&self, vfo: Vfo, level: Level, value: Value) -> RigResult<()> {
        check_kind("level", &level.names(), level.is_float(), value.is_float())?;
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.set_level(vfo, level, value))
        })
    }

    fn get_level(&self, vfo: Vfo, level: Level, float: bool) -> RigResult<Value> {
        check_kind("level", &level.names(), level.is_float(), float)?;
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.get_level(vfo, level, probe(float)))
        })
    }

    pub fn get_level_int(&self, vfo: Vfo, level: Level) -> RigResult<i32> {
        let value = self.get_level(vfo, level, false)?;
        value.as_int().ok_or_else(|| mistyped_reply("level"))
    }

    pub fn get_level_float(&self, vfo: Vfo, level: Level) -> RigResult<f32> {
        let value = self.get_level(vfo, level, true)?;
        value.as_float().ok_or_else(|| mistyped_reply("level"))
    }

    pub fn set_parm(&self, parm: Parm, value: Value) -> RigResult<()> {
        check_kind("parm", &parm.names(), parm.is_float(), value.is_float())?;
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_parm(parm, value)))
    }

    fn get_parm(&self, parm: Parm, float: bool) -> RigResult<Value> {
        check_kind("parm", &parm.names(), parm.is_float(), float)?;
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.get_parm(parm, probe(float)))
        })
    }

    pub fn get_parm_int(&self, parm: Parm) -> RigResult<i32> {
        let value = self.get_parm(parm, false)?;
        value.as_int().ok_or_else(|| mistyped_reply("parm"))
    }

    pub fn get_parm_float(&self, parm: Parm) -> RigResult<f32> {
        let value = self.get_parm(parm, true)?;
        value.as_float().ok_or_else(|| mistyped_reply("parm"))
    }

    pub fn set_func(&self, vfo: Vfo, func: Func, on: bool) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_func(vfo, func, on)))
    }

    pub fn get_func(&self, vfo: Vfo, func: Func) -> RigResult<bool> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_func(vfo, func)))
    }

    // Split

    pub fn set_split_freq(&self, vfo: Vfo, tx_freq_hz: f64) -> RigResult<()> {
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.set_split_freq(vfo, tx_freq_hz))
        })
    }

    pub fn get_split_freq(&self, vfo: Vfo) -> RigResult<f64> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_split_freq(vfo)))
    }

    pub fn set_split_mode(&self, vfo: Vfo, mode: RigMode, width: Passband) -> RigResult<()> {
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.set_split_mode(vfo, mode, width))
        })
    }

    pub fn get_split_mode(&self, vfo: Vfo) -> RigResult<(RigMode, Passband)> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_split_mode(vfo)))
    }

    pub fn set_split_vfo(&self, vfo: Vfo, split: Split, tx_vfo: Vfo) -> RigResult<()> {
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.set_split_vfo(vfo, split, tx_vfo))
        })
    }

    pub fn get_split_vfo(&self, vfo: Vfo) -> RigResult<(Split, Vfo)> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_split_vfo(vfo)))
    }

    // Offsets and steps

    pub fn set_rit(&self, vfo: Vfo, offset_hz: i64) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_rit(vfo, offset_hz)))
    }

    pub fn get_rit(&self, vfo: Vfo) -> RigResult<i64> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_rit(vfo)))
    }

    pub fn set_xit(&self, vfo: Vfo, offset_hz: i64) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_xit(vfo, offset_hz)))
    }

    pub fn get_xit(&self, vfo: Vfo) -> RigResult<i64> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_xit(vfo)))
    }

    pub fn set_ts(&self, vfo: Vfo, step_hz: i64) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_ts(vfo, step_hz)))
    }

    pub fn get_ts(&self, vfo: Vfo) -> RigResult<i64> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_ts(vfo)))
    }

    // Tones and repeater

    pub fn set_ctcss_tone(&self, vfo: Vfo, tone: u32) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_ctcss_tone(vfo, tone)))
    }

    pub fn get_ctcss_tone(&self, vfo: Vfo) -> RigResult<u32> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_ctcss_tone(vfo)))
    }

    pub fn set_dcs_code(&self, vfo: Vfo, code: u32) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_dcs_code(vfo, code)))
    }

    pub fn get_dcs_code(&self, vfo: Vfo) -> RigResult<u32> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_dcs_code(vfo)))
    }

    pub fn set_rptr_shift(&self, vfo: Vfo, shift: RepeaterShift) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_rptr_shift(vfo, shift)))
    }

    pub fn get_rptr_shift(&self, vfo: Vfo) -> RigResult<RepeaterShift> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_rptr_shift(vfo)))
    }

    pub fn set_rptr_offs(&self, vfo: Vfo, offset_hz: i64) -> RigResult<()> {
        self.call(Admit::Open, move |s| {
            s.native(|rig| rig.set_rptr_offs(vfo, offset_hz))
        })
    }

    pub fn get_rptr_offs(&self, vfo: Vfo) -> RigResult<i64> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_rptr_offs(vfo)))
    }

    // Antenna and memory

    pub fn set_ant(&self, vfo: Vfo, ant: u32) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_ant(vfo, ant)))
    }

    pub fn get_ant(&self, vfo: Vfo) -> RigResult<u32> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_ant(vfo)))
    }

    pub fn set_mem(&self, vfo: Vfo, channel: i32) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_mem(vfo, channel)))
    }

    pub fn get_mem(&self, vfo: Vfo) -> RigResult<i32> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.get_mem(vfo)))
    }

    pub fn set_bank(&self, vfo: Vfo, bank: i32) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_bank(vfo, bank)))
    }

    pub fn vfo_op(&self, vfo: Vfo, op: VfoOp) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.vfo_op(vfo, op)))
    }

    pub fn scan(&self, vfo: Vfo, scan: ScanOp, channel: i32) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.scan(vfo, scan, channel)))
    }

    // Power and misc

    pub fn set_powerstat(&self, state: PowerState) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.set_powerstat(state)))
    }

    pub fn get_powerstat(&self) -> RigResult<PowerState> {
        self.call(Admit::Open, |s| s.native(|rig| rig.get_powerstat()))
    }

    pub fn reset(&self, kind: ResetKind) -> RigResult<()> {
        self.call(Admit::Open, move |s| s.native(|rig| rig.reset(kind)))
    }

    pub fn send_morse(&self, vfo: Vfo, text: &str) -> RigResult<()> {
        let text = text.to_string();
        self.call(Admit::Open, move |s| s.native(|rig| rig.send_morse(vfo, &text)))
    }

    pub fn get_info(&self) -> RigResult<String> {
        self.call(Admit::Open, |s| s.native(|rig| rig.get_info()))
    }
}

fn mistyped_reply(what: &str) -> RigError {
    RigError::native(
        NativeStatus::Protocol,
        format!("backend returned a {what} value of the wrong kind"),
    )
}
