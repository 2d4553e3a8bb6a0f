// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Dummy rig backend for development and testing.
//!
//! Holds rig state in memory and responds to all commands immediately.
//! No native library or hardware required.

use std::collections::HashMap;

use hamrig_core::radio::format_frequency;
use hamrig_core::rig::caps::{CapabilitySet, FreqRange, ModeValue};
use hamrig_core::rig::types::{
    conf, BackendStatus, ConfToken, Func, Level, Parm, Passband, PowerState, PttState,
    RepeaterShift, RigMode, RigType, ScanOp, Split, Value, Vfo, VfoOp, DUMMY_MODEL,
};
use hamrig_core::{NativeResult, NativeRig, NativeStatus, RigProvider, RigRegistry, RigResult};
use tracing::debug;

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

const BANDS_HZ: [(f64, f64); 9] = [
    (1_800_000.0, 2_000_000.0),
    (3_500_000.0, 4_000_000.0),
    (7_000_000.0, 7_300_000.0),
    (14_000_000.0, 14_350_000.0),
    (21_000_000.0, 21_450_000.0),
    (28_000_000.0, 29_700_000.0),
    (50_000_000.0, 54_000_000.0),
    (144_000_000.0, 148_000_000.0),
    (430_000_000.0, 440_000_000.0),
];

#[derive(Debug, Clone, Copy)]
struct VfoState {
    freq: f64,
    mode: RigMode,
    width: Passband,
}

pub struct DummyRig {
    open: bool,
    conf: HashMap<i64, String>,
    vfos: [VfoState; 2],
    active_vfo: usize,
    ptt: PttState,
    split: Split,
    tx_vfo: usize,
    levels: HashMap<u64, Value>,
    parms: HashMap<u64, Value>,
    funcs: Func,
    rit: i64,
    xit: i64,
    ts: i64,
    ctcss_tone: u32,
    dcs_code: u32,
    rptr_shift: RepeaterShift,
    rptr_offs: i64,
    ant: u32,
    mem: i32,
    bank: i32,
    power: PowerState,
}

impl DummyRig {
    pub fn new() -> Self {
        Self {
            open: false,
            conf: HashMap::new(),
            vfos: [
                VfoState {
                    freq: 144_300_000.0,
                    mode: RigMode::USB,
                    width: 2400,
                },
                VfoState {
                    freq: 7_100_000.0,
                    mode: RigMode::LSB,
                    width: 2400,
                },
            ],
            active_vfo: 0,
            ptt: PttState::Off,
            split: Split::Off,
            tx_vfo: 1,
            levels: HashMap::new(),
            parms: HashMap::new(),
            funcs: Func::NONE,
            rit: 0,
            xit: 0,
            ts: 100,
            ctcss_tone: 0,
            dcs_code: 0,
            rptr_shift: RepeaterShift::None,
            rptr_offs: 0,
            ant: 1,
            mem: 0,
            bank: 0,
            power: PowerState::On,
        }
    }

    fn ready(&self) -> NativeResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(NativeStatus::InvalidHandle)
        }
    }

    /// Index of the VFO a selector addresses.
    fn slot(&self, vfo: Vfo) -> NativeResult<usize> {
        if vfo == Vfo::A || vfo == Vfo::MAIN {
            Ok(0)
        } else if vfo == Vfo::B || vfo == Vfo::SUB {
            Ok(1)
        } else if vfo == Vfo::TX {
            Ok(match self.split {
                Split::On => self.tx_vfo,
                Split::Off => self.active_vfo,
            })
        } else if vfo == Vfo::CURRENT || vfo == Vfo::VFO || vfo == Vfo::NONE {
            Ok(self.active_vfo)
        } else {
            Err(NativeStatus::InvalidVfo)
        }
    }

    fn vfo_mut(&mut self, vfo: Vfo) -> NativeResult<&mut VfoState> {
        self.ready()?;
        let idx = self.slot(vfo)?;
        Ok(&mut self.vfos[idx])
    }

    fn vfo(&self, vfo: Vfo) -> NativeResult<VfoState> {
        self.ready()?;
        Ok(self.vfos[self.slot(vfo)?])
    }
}

impl Default for DummyRig {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRig for DummyRig {
    fn open(&mut self) -> NativeResult<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> NativeResult<()> {
        self.open = false;
        Ok(())
    }

    fn cleanup(&mut self) -> NativeResult<()> {
        self.open = false;
        self.conf.clear();
        Ok(())
    }

    fn token_lookup(&self, name: &str) -> NativeResult<ConfToken> {
        Ok(TOKENS
            .iter()
            .position(|t| *t == name)
            .map(|idx| ConfToken(idx as i64 + 1))
            .unwrap_or(ConfToken::NULL))
    }

    fn set_conf(&mut self, token: ConfToken, value: &str) -> NativeResult<()> {
        if token.is_null() || token.0 > TOKENS.len() as i64 {
            return Err(NativeStatus::InvalidParameter);
        }
        self.conf.insert(token.0, value.to_string());
        Ok(())
    }

    fn get_conf(&mut self, token: ConfToken) -> NativeResult<String> {
        self.conf
            .get(&token.0)
            .cloned()
            .ok_or(NativeStatus::InvalidParameter)
    }

    fn set_freq(&mut self, vfo: Vfo, freq_hz: f64) -> NativeResult<()> {
        self.vfo_mut(vfo)?.freq = freq_hz;
        debug!("Dummy tuned to {}", format_frequency(freq_hz));
        Ok(())
    }

    fn get_freq(&mut self, vfo: Vfo) -> NativeResult<f64> {
        Ok(self.vfo(vfo)?.freq)
    }

    fn set_mode(&mut self, vfo: Vfo, mode: RigMode, width: Passband) -> NativeResult<()> {
        let state = self.vfo_mut(vfo)?;
        state.mode = mode;
        if width != 0 {
            state.width = width;
        }
        Ok(())
    }

    fn get_mode(&mut self, vfo: Vfo) -> NativeResult<(RigMode, Passband)> {
        let state = self.vfo(vfo)?;
        Ok((state.mode, state.width))
    }

    fn set_ptt(&mut self, _vfo: Vfo, ptt: PttState) -> NativeResult<()> {
        self.ready()?;
        self.ptt = ptt;
        Ok(())
    }

    fn get_ptt(&mut self, _vfo: Vfo) -> NativeResult<PttState> {
        self.ready()?;
        Ok(self.ptt)
    }

    fn set_vfo(&mut self, vfo: Vfo) -> NativeResult<()> {
        self.ready()?;
        self.active_vfo = self.slot(vfo)?;
        Ok(())
    }

    fn get_vfo(&mut self) -> NativeResult<Vfo> {
        self.ready()?;
        Ok(if self.active_vfo == 0 { Vfo::A } else { Vfo::B })
    }

    fn set_level(&mut self, _vfo: Vfo, level: Level, value: Value) -> NativeResult<()> {
        self.ready()?;
        if level.is_float() != value.is_float() {
            return Err(NativeStatus::InvalidParameter);
        }
        self.levels.insert(level.bits(), value);
        Ok(())
    }

    fn get_level(&mut self, _vfo: Vfo, level: Level, kind: Value) -> NativeResult<Value> {
        self.ready()?;
        if level == Level::STRENGTH {
            return Ok(Value::Int(if self.ptt.is_transmitting() { 0 } else { -54 }));
        }
        Ok(self.levels.get(&level.bits()).copied().unwrap_or(match kind {
            Value::Int(_) => Value::Int(0),
            Value::Float(_) => Value::Float(0.0),
        }))
    }

    fn set_parm(&mut self, parm: Parm, value: Value) -> NativeResult<()> {
        self.ready()?;
        self.parms.insert(parm.bits(), value);
        Ok(())
    }

    fn get_parm(&mut self, parm: Parm, kind: Value) -> NativeResult<Value> {
        self.ready()?;
        Ok(self.parms.get(&parm.bits()).copied().unwrap_or(kind))
    }

    fn set_func(&mut self, _vfo: Vfo, func: Func, on: bool) -> NativeResult<()> {
        self.ready()?;
        self.funcs = if on {
            self.funcs | func
        } else {
            Func(self.funcs.bits() & !func.bits())
        };
        Ok(())
    }

    fn get_func(&mut self, _vfo: Vfo, func: Func) -> NativeResult<bool> {
        self.ready()?;
        Ok(self.funcs.contains(func))
    }

    fn set_split_freq(&mut self, _vfo: Vfo, tx_freq_hz: f64) -> NativeResult<()> {
        self.ready()?;
        self.vfos[self.tx_vfo].freq = tx_freq_hz;
        Ok(())
    }

    fn get_split_freq(&mut self, _vfo: Vfo) -> NativeResult<f64> {
        self.ready()?;
        Ok(self.vfos[self.tx_vfo].freq)
    }

    fn set_split_mode(&mut self, _vfo: Vfo, mode: RigMode, width: Passband) -> NativeResult<()> {
        self.ready()?;
        let tx = &mut self.vfos[self.tx_vfo];
        tx.mode = mode;
        if width != 0 {
            tx.width = width;
        }
        Ok(())
    }

    fn get_split_mode(&mut self, _vfo: Vfo) -> NativeResult<(RigMode, Passband)> {
        self.ready()?;
        let tx = self.vfos[self.tx_vfo];
        Ok((tx.mode, tx.width))
    }

    fn set_split_vfo(&mut self, _vfo: Vfo, split: Split, tx_vfo: Vfo) -> NativeResult<()> {
        self.ready()?;
        self.tx_vfo = self.slot(tx_vfo)?;
        self.split = split;
        Ok(())
    }

    fn get_split_vfo(&mut self, _vfo: Vfo) -> NativeResult<(Split, Vfo)> {
        self.ready()?;
        let tx = if self.tx_vfo == 0 { Vfo::A } else { Vfo::B };
        Ok((self.split, tx))
    }

    fn set_rit(&mut self, _vfo: Vfo, offset_hz: i64) -> NativeResult<()> {
        self.ready()?;
        self.rit = offset_hz;
        Ok(())
    }

    fn get_rit(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        self.ready()?;
        Ok(self.rit)
    }

    fn set_xit(&mut self, _vfo: Vfo, offset_hz: i64) -> NativeResult<()> {
        self.ready()?;
        self.xit = offset_hz;
        Ok(())
    }

    fn get_xit(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        self.ready()?;
        Ok(self.xit)
    }

    fn set_ts(&mut self, _vfo: Vfo, step_hz: i64) -> NativeResult<()> {
        self.ready()?;
        self.ts = step_hz;
        Ok(())
    }

    fn get_ts(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        self.ready()?;
        Ok(self.ts)
    }

    fn set_ctcss_tone(&mut self, _vfo: Vfo, tone: u32) -> NativeResult<()> {
        self.ready()?;
        self.ctcss_tone = tone;
        Ok(())
    }

    fn get_ctcss_tone(&mut self, _vfo: Vfo) -> NativeResult<u32> {
        self.ready()?;
        Ok(self.ctcss_tone)
    }

    fn set_dcs_code(&mut self, _vfo: Vfo, code: u32) -> NativeResult<()> {
        self.ready()?;
        self.dcs_code = code;
        Ok(())
    }

    fn get_dcs_code(&mut self, _vfo: Vfo) -> NativeResult<u32> {
        self.ready()?;
        Ok(self.dcs_code)
    }

    fn set_rptr_shift(&mut self, _vfo: Vfo, shift: RepeaterShift) -> NativeResult<()> {
        self.ready()?;
        self.rptr_shift = shift;
        Ok(())
    }

    fn get_rptr_shift(&mut self, _vfo: Vfo) -> NativeResult<RepeaterShift> {
        self.ready()?;
        Ok(self.rptr_shift)
    }

    fn set_rptr_offs(&mut self, _vfo: Vfo, offset_hz: i64) -> NativeResult<()> {
        self.ready()?;
        self.rptr_offs = offset_hz;
        Ok(())
    }

    fn get_rptr_offs(&mut self, _vfo: Vfo) -> NativeResult<i64> {
        self.ready()?;
        Ok(self.rptr_offs)
    }

    fn set_ant(&mut self, _vfo: Vfo, ant: u32) -> NativeResult<()> {
        self.ready()?;
        self.ant = ant;
        Ok(())
    }

    fn get_ant(&mut self, _vfo: Vfo) -> NativeResult<u32> {
        self.ready()?;
        Ok(self.ant)
    }

    fn set_mem(&mut self, _vfo: Vfo, channel: i32) -> NativeResult<()> {
        self.ready()?;
        self.mem = channel;
        Ok(())
    }

    fn get_mem(&mut self, _vfo: Vfo) -> NativeResult<i32> {
        self.ready()?;
        Ok(self.mem)
    }

    fn set_bank(&mut self, _vfo: Vfo, bank: i32) -> NativeResult<()> {
        self.ready()?;
        self.bank = bank;
        Ok(())
    }

    fn vfo_op(&mut self, _vfo: Vfo, op: VfoOp) -> NativeResult<()> {
        self.ready()?;
        if op == VfoOp::XCHG {
            self.vfos.swap(0, 1);
        } else if op == VfoOp::CPY {
            self.vfos[1] = self.vfos[0];
        } else if op == VfoOp::TOGGLE {
            self.active_vfo = 1 - self.active_vfo;
        } else {
            return Err(NativeStatus::NotImplemented);
        }
        Ok(())
    }

    fn scan(&mut self, _vfo: Vfo, scan: ScanOp, _channel: i32) -> NativeResult<()> {
        self.ready()?;
        debug!("Dummy scan {}", scan.names().join("|"));
        Ok(())
    }

    fn set_powerstat(&mut self, state: PowerState) -> NativeResult<()> {
        self.ready()?;
        self.power = state;
        Ok(())
    }

    fn get_powerstat(&mut self) -> NativeResult<PowerState> {
        self.ready()?;
        Ok(self.power)
    }

    fn send_morse(&mut self, _vfo: Vfo, text: &str) -> NativeResult<()> {
        self.ready()?;
        debug!("Dummy keying {:?}", text);
        Ok(())
    }

    fn get_info(&mut self) -> NativeResult<String> {
        self.ready()?;
        Ok("Nothing much (dummy)".to_string())
    }
}

/// Capability set of the in-memory rig.
pub fn dummy_caps() -> CapabilitySet {
    let all_modes = RigMode::AM
        | RigMode::CW
        | RigMode::USB
        | RigMode::LSB
        | RigMode::RTTY
        | RigMode::FM
        | RigMode::WFM
        | RigMode::CWR;
    let ranges: Vec<FreqRange> = BANDS_HZ
        .iter()
        .map(|(start, end)| FreqRange {
            start_hz: *start,
            end_hz: *end,
            modes: all_modes,
            low_power: -1,
            high_power: -1,
            vfo: Vfo(Vfo::A.raw() | Vfo::B.raw()),
            ant: 1,
        })
        .collect();
    let float_levels = Level::AF | Level::RF | Level::SQL | Level::RFPOWER | Level::MICGAIN;
    let int_levels = Level::PREAMP | Level::ATT | Level::AGC | Level::KEYSPD | Level::STRENGTH;

    CapabilitySet {
        model: DUMMY_MODEL,
        model_name: "Dummy".to_string(),
        mfg_name: "Hamrig".to_string(),
        version: "0.5".to_string(),
        copyright: "BSD-2-Clause".to_string(),
        status: BackendStatus::Beta,
        rig_type: RigType(RigType::RECEIVER | RigType::TRANSMITTER | RigType::COMPUTER),
        has_get_func: Func::NB | Func::COMP | Func::VOX | Func::LOCK | Func::MUTE,
        has_set_func: Func::NB | Func::COMP | Func::VOX | Func::LOCK | Func::MUTE,
        has_get_level: float_levels | int_levels,
        has_set_level: float_levels | Level::PREAMP | Level::ATT | Level::AGC | Level::KEYSPD,
        has_get_parm: Parm::BACKLIGHT | Parm::BEEP,
        has_set_parm: Parm::BACKLIGHT | Parm::BEEP,
        preamp: vec![10],
        attenuator: vec![10, 20, 30],
        max_rit: 9_990,
        max_xit: 9_990,
        vfo_ops: VfoOp::CPY | VfoOp::XCHG | VfoOp::TOGGLE,
        scan_ops: ScanOp::VFO | ScanOp::MEM | ScanOp::STOP,
        bank_qty: 8,
        rx_range_list1: ranges.clone(),
        tx_range_list1: ranges,
        tuning_steps: vec![
            ModeValue {
                modes: all_modes,
                value: 1,
            },
            ModeValue {
                modes: all_modes,
                value: 100,
            },
        ],
        filters: vec![
            ModeValue {
                modes: RigMode::USB | RigMode::LSB,
                value: 2400,
            },
            ModeValue {
                modes: RigMode::CW | RigMode::CWR,
                value: 500,
            },
            ModeValue {
                modes: RigMode::FM,
                value: 15_000,
            },
        ],
        ctcss_list: vec![670, 719, 770, 885, 1000, 1318, 1622],
        dcs_list: vec![23, 25, 26, 31, 32],
        ..Default::default()
    }
}

/// Provider exposing the in-memory rig as its only model.
pub struct DummyProvider {
    registry: RigRegistry,
}

impl DummyProvider {
    pub fn new() -> Self {
        let mut registry = RigRegistry::new();
        registry.add(dummy_caps());
        Self { registry }
    }
}

impl Default for DummyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RigProvider for DummyProvider {
    fn registry(&self) -> &RigRegistry {
        &self.registry
    }

    fn create(&self, _caps: &CapabilitySet) -> RigResult<Box<dyn NativeRig>> {
        Ok(Box::new(DummyRig::new()))
    }
}

#[cfg(test)]
mod tests {
    use hamrig_core::radio::khz;
    use hamrig_core::{RigSession, SessionConfig};

    use super::*;

    #[test]
    fn test_calls_before_open_fail() {
        let mut rig = DummyRig::new();
        assert_eq!(rig.get_freq(Vfo::CURRENT), Err(NativeStatus::InvalidHandle));
        rig.open().unwrap();
        assert_eq!(rig.get_freq(Vfo::CURRENT), Ok(144_300_000.0));
    }

    #[test]
    fn test_vfo_selection_and_exchange() {
        let mut rig = DummyRig::new();
        rig.open().unwrap();
        rig.set_freq(Vfo::B, 3_573_000.0).unwrap();
        assert_eq!(rig.get_freq(Vfo::A), Ok(144_300_000.0));

        rig.set_vfo(Vfo::B).unwrap();
        assert_eq!(rig.get_vfo(), Ok(Vfo::B));
        assert_eq!(rig.get_freq(Vfo::CURRENT), Ok(3_573_000.0));

        rig.vfo_op(Vfo::CURRENT, VfoOp::XCHG).unwrap();
        assert_eq!(rig.get_freq(Vfo::A), Ok(3_573_000.0));
        assert_eq!(rig.get_freq(Vfo::C), Err(NativeStatus::InvalidVfo));
    }

    #[test]
    fn test_split_targets_tx_vfo() {
        let mut rig = DummyRig::new();
        rig.open().unwrap();
        rig.set_split_vfo(Vfo::CURRENT, Split::On, Vfo::B).unwrap();
        rig.set_split_freq(Vfo::CURRENT, 14_200_000.0).unwrap();
        assert_eq!(rig.get_freq(Vfo::TX), Ok(14_200_000.0));
        assert_eq!(rig.get_split_vfo(Vfo::CURRENT), Ok((Split::On, Vfo::B)));
    }

    #[test]
    fn test_level_kind_is_enforced() {
        let mut rig = DummyRig::new();
        rig.open().unwrap();
        assert_eq!(
            rig.set_level(Vfo::CURRENT, Level::AF, Value::Int(3)),
            Err(NativeStatus::InvalidParameter)
        );
        rig.set_level(Vfo::CURRENT, Level::AF, Value::Float(0.5)).unwrap();
        assert_eq!(
            rig.get_level(Vfo::CURRENT, Level::AF, Value::Float(0.0)),
            Ok(Value::Float(0.5))
        );
    }

    #[test]
    fn test_provider_session_roundtrip() {
        let provider = DummyProvider::new();
        let session =
            RigSession::from_provider(&provider, "Dummy", SessionConfig::default()).unwrap();
        session.open_default().unwrap();
        session.set_frequency(khz(7074.0)).unwrap();
        assert_eq!(session.get_frequency().unwrap(), 7_074_000.0);
        session.close().unwrap();
        assert!(!session.is_open());
    }
}
