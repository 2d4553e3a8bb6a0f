// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::Serialize;

use crate::rig::types::{
    Announce, BackendStatus, ChannelType, DcdType, Func, Level, ModelId, Parm, PttType,
    RigMode, RigPort, RigType, ScanOp, SerialHandshake, SerialParity, Transceive, Vfo, VfoOp,
    STANDARD_BAUD_RATES,
};

/// Frequency range a model can receive or transmit on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreqRange {
    pub start_hz: f64,
    pub end_hz: f64,
    pub modes: RigMode,
    /// Milliwatts, `-1` when not applicable.
    pub low_power: i32,
    pub high_power: i32,
    pub vfo: Vfo,
    pub ant: i32,
}

impl FreqRange {
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.start_hz && freq_hz <= self.end_hz
    }
}

/// Mode mask paired with a value (tuning step or filter width, in Hz).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeValue {
    pub modes: RigMode,
    pub value: i64,
}

/// Which channel fields a memory range can store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelCaps {
    pub bank_num: bool,
    pub vfo: bool,
    pub ant: bool,
    pub freq: bool,
    pub mode: bool,
    pub width: bool,
    pub tx_freq: bool,
    pub tx_mode: bool,
    pub tx_width: bool,
    pub split: bool,
    pub tx_vfo: bool,
    pub rptr_shift: bool,
    pub rptr_offs: bool,
    pub tuning_step: bool,
    pub rit: bool,
    pub xit: bool,
    pub funcs: Func,
    pub levels: Level,
    pub ctcss_tone: bool,
    pub ctcss_sql: bool,
    pub dcs_code: bool,
    pub dcs_sql: bool,
    pub scan_group: bool,
    pub flags: bool,
    pub channel_desc: bool,
    pub ext_levels: bool,
}

impl ChannelCaps {
    /// Build from the two bitfield words that bracket the funcs/levels masks.
    pub fn from_words(head: u32, funcs: Func, levels: Level, tail: u32) -> Self {
        let bit = |word: u32, n: u32| word & (1 << n) != 0;
        Self {
            bank_num: bit(head, 0),
            vfo: bit(head, 1),
            ant: bit(head, 2),
            freq: bit(head, 3),
            mode: bit(head, 4),
            width: bit(head, 5),
            tx_freq: bit(head, 6),
            tx_mode: bit(head, 7),
            tx_width: bit(head, 8),
            split: bit(head, 9),
            tx_vfo: bit(head, 10),
            rptr_shift: bit(head, 11),
            rptr_offs: bit(head, 12),
            tuning_step: bit(head, 13),
            rit: bit(head, 14),
            xit: bit(head, 15),
            funcs,
            levels,
            ctcss_tone: bit(tail, 0),
            ctcss_sql: bit(tail, 1),
            dcs_code: bit(tail, 2),
            dcs_sql: bit(tail, 3),
            scan_group: bit(tail, 4),
            flags: bit(tail, 5),
            channel_desc: bit(tail, 6),
            ext_levels: bit(tail, 7),
        }
    }
}

/// A contiguous range of memory channels of one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelList {
    pub start: i32,
    pub end: i32,
    pub kind: ChannelType,
    pub mem_caps: ChannelCaps,
}

/// Decoded, read-only description of one rig model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapabilitySet {
    pub model: ModelId,
    pub model_name: String,
    pub mfg_name: String,
    pub version: String,
    pub copyright: String,
    pub status: BackendStatus,
    pub rig_type: RigType,
    pub ptt_type: PttType,
    pub dcd_type: DcdType,
    pub port_type: RigPort,

    pub serial_rate_min: u32,
    pub serial_rate_max: u32,
    pub serial_data_bits: u8,
    pub serial_stop_bits: u8,
    pub serial_parity: SerialParity,
    pub serial_handshake: SerialHandshake,
    pub write_delay: i32,
    pub post_write_delay: i32,
    pub timeout: i32,
    pub retry: i32,

    pub has_get_func: Func,
    pub has_set_func: Func,
    pub has_get_level: Level,
    pub has_set_level: Level,
    pub has_get_parm: Parm,
    pub has_set_parm: Parm,

    pub preamp: Vec<i32>,
    pub attenuator: Vec<i32>,
    pub max_rit: i64,
    pub max_xit: i64,
    pub max_ifshift: i64,
    pub announces: Announce,
    pub vfo_ops: VfoOp,
    pub scan_ops: ScanOp,
    pub targetable_vfo: i32,
    pub transceive: Transceive,
    pub bank_qty: i32,
    pub chan_desc_sz: i32,
    pub chan_list: Vec<ChannelList>,

    pub rx_range_list1: Vec<FreqRange>,
    pub tx_range_list1: Vec<FreqRange>,
    pub rx_range_list2: Vec<FreqRange>,
    pub tx_range_list2: Vec<FreqRange>,
    pub tuning_steps: Vec<ModeValue>,
    pub filters: Vec<ModeValue>,
    /// CTCSS tones in tenths of Hz.
    pub ctcss_list: Vec<u32>,
    pub dcs_list: Vec<u32>,
    pub has_priv_data: bool,
}

impl CapabilitySet {
    pub fn has_get_level(&self, level: Level) -> bool {
        self.has_get_level.contains(level)
    }

    pub fn has_set_level(&self, level: Level) -> bool {
        self.has_set_level.contains(level)
    }

    pub fn has_get_func(&self, func: Func) -> bool {
        self.has_get_func.contains(func)
    }

    pub fn has_set_func(&self, func: Func) -> bool {
        self.has_set_func.contains(func)
    }

    pub fn has_get_parm(&self, parm: Parm) -> bool {
        self.has_get_parm.contains(parm)
    }

    pub fn has_set_parm(&self, parm: Parm) -> bool {
        self.has_set_parm.contains(parm)
    }

    pub fn has_vfo_op(&self, op: VfoOp) -> bool {
        self.vfo_ops.contains(op)
    }

    pub fn has_scan(&self, scan: ScanOp) -> bool {
        self.scan_ops.contains(scan)
    }

    pub fn is_serial(&self) -> bool {
        self.port_type == RigPort::Serial
    }

    /// Standard line rates inside the model's supported range, ascending.
    pub fn candidate_baud_rates(&self) -> Vec<u32> {
        STANDARD_BAUD_RATES
            .iter()
            .copied()
            .filter(|rate| *rate >= self.serial_rate_min && *rate <= self.serial_rate_max)
            .collect()
    }

    /// Union of every mode the model can receive in either region.
    pub fn rx_modes(&self) -> RigMode {
        self.rx_range_list1
            .iter()
            .chain(self.rx_range_list2.iter())
            .fold(RigMode::NONE, |acc, range| acc | range.modes)
    }

    /// Filter widths listed for `mode`, in table order.
    pub fn filters_for(&self, mode: RigMode) -> Vec<i64> {
        self.filters
            .iter()
            .filter(|f| f.modes.contains(mode))
            .map(|f| f.value)
            .collect()
    }

    pub fn can_receive(&self, freq_hz: f64) -> bool {
        self.rx_range_list1
            .iter()
            .chain(self.rx_range_list2.iter())
            .any(|r| r.contains(freq_hz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_baud_rates_respect_range() {
        let caps = CapabilitySet {
            serial_rate_min: 4800,
            serial_rate_max: 38400,
            ..Default::default()
        };
        assert_eq!(caps.candidate_baud_rates(), vec![4800, 9600, 19200, 38400]);

        let none = CapabilitySet::default();
        assert!(none.candidate_baud_rates().is_empty());
    }

    #[test]
    fn test_candidate_baud_rates_stop_at_115200() {
        let caps = CapabilitySet {
            serial_rate_min: 57600,
            serial_rate_max: 256000,
            ..Default::default()
        };
        assert_eq!(caps.candidate_baud_rates(), vec![57600, 115200]);
    }

    #[test]
    fn test_channel_caps_bits() {
        let caps = ChannelCaps::from_words(0b1_0000_0000_1000, Func::NB, Level::AF, 0b100);
        assert!(caps.freq);
        assert!(caps.rptr_offs);
        assert!(!caps.bank_num);
        assert!(caps.dcs_code);
        assert!(!caps.ctcss_tone);
        assert_eq!(caps.funcs, Func::NB);
    }

    #[test]
    fn test_mode_helpers() {
        let caps = CapabilitySet {
            rx_range_list1: vec![FreqRange {
                start_hz: 1.8e6,
                end_hz: 30e6,
                modes: RigMode::USB | RigMode::LSB,
                low_power: -1,
                high_power: -1,
                vfo: Vfo::A,
                ant: 0,
            }],
            filters: vec![
                ModeValue { modes: RigMode::USB | RigMode::LSB, value: 2400 },
                ModeValue { modes: RigMode::CW, value: 500 },
            ],
            has_get_level: Level::AF | Level::SWR,
            ..Default::default()
        };
        assert!(caps.rx_modes().contains(RigMode::LSB));
        assert!(caps.can_receive(14.074e6));
        assert!(!caps.can_receive(144e6));
        assert_eq!(caps.filters_for(RigMode::USB), vec![2400]);
        assert!(caps.has_get_level(Level::SWR));
        assert!(!caps.has_set_level(Level::AF));
    }
}
