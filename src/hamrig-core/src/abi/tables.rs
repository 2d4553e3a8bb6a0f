// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Field tables for the native capability block, per library generation.
//!
//! A generation's block is assembled from shared segments; only the filter
//! table length and the split frequency+mode callback pair differ.

use std::fmt;

use serde::Serialize;

use super::layout::{FieldDef, FieldKind};

/// Native library releases with distinct capability block layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LibraryGeneration {
    /// 3.1 and later
    Current,
    /// 3.0.1 and earlier 3.x
    Legacy301,
    /// 1.x and 2.x
    LegacyV2,
}

impl LibraryGeneration {
    /// Order in which layouts are tried against the probe block.
    pub const DETECTION_ORDER: [Self; 3] = [Self::Current, Self::Legacy301, Self::LegacyV2];

    pub fn filter_slots(self) -> usize {
        match self {
            Self::Current | Self::Legacy301 => 60,
            Self::LegacyV2 => 42,
        }
    }

    pub fn has_split_freq_mode(self) -> bool {
        matches!(self, Self::Current)
    }
}

impl fmt::Display for LibraryGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Legacy301 => write!(f, "3.0.1"),
            Self::LegacyV2 => write!(f, "2.x"),
        }
    }
}

pub const SETTING_MAX: usize = 32;
pub const MAXDBLSTSIZ: usize = 8;
pub const CHANLSTSIZ: usize = 16;
pub const FRQRANGESIZ: usize = 30;
pub const TSLSTSIZ: usize = 20;
pub const MAX_CAL_LENGTH: usize = 32;

/// `gran_t`: three `value_t` unions, each pointer sized.
pub const GRANULARITY: &[FieldDef] = &[
    FieldDef::new("min", FieldKind::Ptr),
    FieldDef::new("max", FieldKind::Ptr),
    FieldDef::new("step", FieldKind::Ptr),
];

/// `channel_cap_t`: bitfield word, func/level masks, bitfield word.
pub const CHANNEL_CAP: &[FieldDef] = &[
    FieldDef::new("head", FieldKind::UInt),
    FieldDef::new("funcs", FieldKind::ULong),
    FieldDef::new("levels", FieldKind::ULong),
    FieldDef::new("tail", FieldKind::UInt),
];

const CHANNEL_CAP_KIND: FieldKind = FieldKind::Struct(CHANNEL_CAP);

pub const CHANNEL_LIST: &[FieldDef] = &[
    FieldDef::new("start", FieldKind::Int),
    FieldDef::new("end", FieldKind::Int),
    FieldDef::new("type", FieldKind::Int),
    FieldDef::new("mem_caps", CHANNEL_CAP_KIND),
];

pub const FREQ_RANGE: &[FieldDef] = &[
    FieldDef::new("start", FieldKind::Double),
    FieldDef::new("end", FieldKind::Double),
    FieldDef::new("modes", FieldKind::UInt),
    FieldDef::new("low_power", FieldKind::Int),
    FieldDef::new("high_power", FieldKind::Int),
    FieldDef::new("vfo", FieldKind::Int),
    FieldDef::new("ant", FieldKind::Int),
];

/// Tuning step and filter entries share this shape.
pub const MODE_VALUE: &[FieldDef] = &[
    FieldDef::new("modes", FieldKind::UInt),
    FieldDef::new("value", FieldKind::Long),
];

const CAL_ENTRY: &[FieldDef] = &[
    FieldDef::new("raw", FieldKind::Int),
    FieldDef::new("val", FieldKind::Int),
];

const CAL_ENTRY_KIND: FieldKind = FieldKind::Struct(CAL_ENTRY);

const CAL_TABLE: &[FieldDef] = &[
    FieldDef::new("size", FieldKind::Int),
    FieldDef::new("table", FieldKind::Array(&CAL_ENTRY_KIND, MAX_CAL_LENGTH)),
];

const GRANULARITY_KIND: FieldKind = FieldKind::Struct(GRANULARITY);
const CHANNEL_LIST_KIND: FieldKind = FieldKind::Struct(CHANNEL_LIST);
const FREQ_RANGE_KIND: FieldKind = FieldKind::Struct(FREQ_RANGE);
const MODE_VALUE_KIND: FieldKind = FieldKind::Struct(MODE_VALUE);
const INT_KIND: FieldKind = FieldKind::Int;

const fn ranges(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Array(&FREQ_RANGE_KIND, FRQRANGESIZ))
}

const fn ptr(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Ptr)
}

/// From the model id up to and including the tuning step table.
const HEAD: &[FieldDef] = &[
    FieldDef::new("rig_model", FieldKind::Int),
    ptr("model_name"),
    ptr("mfg_name"),
    ptr("version"),
    ptr("copyright"),
    FieldDef::new("status", FieldKind::Int),
    FieldDef::new("rig_type", FieldKind::Int),
    FieldDef::new("ptt_type", FieldKind::Int),
    FieldDef::new("dcd_type", FieldKind::Int),
    FieldDef::new("port_type", FieldKind::Int),
    FieldDef::new("serial_rate_min", FieldKind::Int),
    FieldDef::new("serial_rate_max", FieldKind::Int),
    FieldDef::new("serial_data_bits", FieldKind::Int),
    FieldDef::new("serial_stop_bits", FieldKind::Int),
    FieldDef::new("serial_parity", FieldKind::Int),
    FieldDef::new("serial_handshake", FieldKind::Int),
    FieldDef::new("write_delay", FieldKind::Int),
    FieldDef::new("post_write_delay", FieldKind::Int),
    FieldDef::new("timeout", FieldKind::Int),
    FieldDef::new("retry", FieldKind::Int),
    FieldDef::new("has_get_func", FieldKind::ULong),
    FieldDef::new("has_set_func", FieldKind::ULong),
    FieldDef::new("has_get_level", FieldKind::ULong),
    FieldDef::new("has_set_level", FieldKind::ULong),
    FieldDef::new("has_get_parm", FieldKind::ULong),
    FieldDef::new("has_set_parm", FieldKind::ULong),
    FieldDef::new("level_gran", FieldKind::Array(&GRANULARITY_KIND, SETTING_MAX)),
    FieldDef::new("parm_gran", FieldKind::Array(&GRANULARITY_KIND, SETTING_MAX)),
    ptr("extparms"),
    ptr("extlevels"),
    ptr("ctcss_list"),
    ptr("dcs_list"),
    FieldDef::new("preamp", FieldKind::Array(&INT_KIND, MAXDBLSTSIZ)),
    FieldDef::new("attenuator", FieldKind::Array(&INT_KIND, MAXDBLSTSIZ)),
    FieldDef::new("max_rit", FieldKind::Long),
    FieldDef::new("max_xit", FieldKind::Long),
    FieldDef::new("max_ifshift", FieldKind::Long),
    FieldDef::new("announces", FieldKind::Int),
    FieldDef::new("vfo_ops", FieldKind::Int),
    FieldDef::new("scan_ops", FieldKind::Int),
    FieldDef::new("targetable_vfo", FieldKind::Int),
    FieldDef::new("transceive", FieldKind::Int),
    FieldDef::new("bank_qty", FieldKind::Int),
    FieldDef::new("chan_desc_sz", FieldKind::Int),
    FieldDef::new("chan_list", FieldKind::Array(&CHANNEL_LIST_KIND, CHANLSTSIZ)),
    ranges("rx_range_list1"),
    ranges("tx_range_list1"),
    ranges("rx_range_list2"),
    ranges("tx_range_list2"),
    FieldDef::new("tuning_steps", FieldKind::Array(&MODE_VALUE_KIND, TSLSTSIZ)),
];

const FILTERS_60: &[FieldDef] = &[FieldDef::new(
    "filters",
    FieldKind::Array(&MODE_VALUE_KIND, 60),
)];

const FILTERS_42: &[FieldDef] = &[FieldDef::new(
    "filters",
    FieldKind::Array(&MODE_VALUE_KIND, 42),
)];

/// Calibration table, private pointers, and callbacks through split mode.
const MIDDLE: &[FieldDef] = &[
    FieldDef::new("str_cal", FieldKind::Struct(CAL_TABLE)),
    ptr("cfgparams"),
    ptr("priv"),
    ptr("rig_init"),
    ptr("rig_cleanup"),
    ptr("rig_open"),
    ptr("rig_close"),
    ptr("set_freq"),
    ptr("get_freq"),
    ptr("set_mode"),
    ptr("get_mode"),
    ptr("set_vfo"),
    ptr("get_vfo"),
    ptr("set_ptt"),
    ptr("get_ptt"),
    ptr("get_dcd"),
    ptr("set_rptr_shift"),
    ptr("get_rptr_shift"),
    ptr("set_rptr_offs"),
    ptr("get_rptr_offs"),
    ptr("set_split_freq"),
    ptr("get_split_freq"),
    ptr("set_split_mode"),
    ptr("get_split_mode"),
];

const SPLIT_FREQ_MODE: &[FieldDef] = &[ptr("set_split_freq_mode"), ptr("get_split_freq_mode")];

/// Remaining callbacks, ending with the clone combo strings.
const TAIL: &[FieldDef] = &[
    ptr("set_split_vfo"),
    ptr("get_split_vfo"),
    ptr("set_rit"),
    ptr("get_rit"),
    ptr("set_xit"),
    ptr("get_xit"),
    ptr("set_ts"),
    ptr("get_ts"),
    ptr("set_dcs_code"),
    ptr("get_dcs_code"),
    ptr("set_tone"),
    ptr("get_tone"),
    ptr("set_ctcss_tone"),
    ptr("get_ctcss_tone"),
    ptr("set_dcs_sql"),
    ptr("get_dcs_sql"),
    ptr("set_tone_sql"),
    ptr("get_tone_sql"),
    ptr("set_ctcss_sql"),
    ptr("get_ctcss_sql"),
    ptr("power2mW"),
    ptr("mW2power"),
    ptr("set_powerstat"),
    ptr("get_powerstat"),
    ptr("reset"),
    ptr("set_ant"),
    ptr("get_ant"),
    ptr("set_level"),
    ptr("get_level"),
    ptr("set_func"),
    ptr("get_func"),
    ptr("set_parm"),
    ptr("get_parm"),
    ptr("set_ext_level"),
    ptr("get_ext_level"),
    ptr("set_ext_parm"),
    ptr("get_ext_parm"),
    ptr("set_conf"),
    ptr("get_conf"),
    ptr("send_dtmf"),
    ptr("recv_dtmf"),
    ptr("send_morse"),
    ptr("set_bank"),
    ptr("set_mem"),
    ptr("get_mem"),
    ptr("vfo_op"),
    ptr("scan"),
    ptr("set_trn"),
    ptr("get_trn"),
    ptr("decode_event"),
    ptr("set_channel"),
    ptr("get_channel"),
    ptr("get_info"),
    ptr("set_chan_all_cb"),
    ptr("get_chan_all_cb"),
    ptr("set_mem_all_cb"),
    ptr("get_mem_all_cb"),
    ptr("clone_combo_set"),
    ptr("clone_combo_get"),
];

/// Member list of the capability block for `generation`.
pub fn capability_fields(generation: LibraryGeneration) -> Vec<FieldDef> {
    let filters = match generation {
        LibraryGeneration::LegacyV2 => FILTERS_42,
        LibraryGeneration::Current | LibraryGeneration::Legacy301 => FILTERS_60,
    };
    let mut fields = Vec::with_capacity(HEAD.len() + MIDDLE.len() + TAIL.len() + 3);
    fields.extend_from_slice(HEAD);
    fields.extend_from_slice(filters);
    fields.extend_from_slice(MIDDLE);
    if generation.has_split_freq_mode() {
        fields.extend_from_slice(SPLIT_FREQ_MODE);
    }
    fields.extend_from_slice(TAIL);
    fields
}

/// Names of the callback pointer members, in declaration order.
pub fn callback_names(generation: LibraryGeneration) -> Vec<&'static str> {
    capability_fields(generation)
        .into_iter()
        .skip_while(|f| f.name != "rig_init")
        .filter(|f| !f.name.starts_with("clone_combo"))
        .map(|f| f.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::layout::{DataModel, StructLayout};

    #[test]
    fn test_generations_differ_where_expected() {
        let current = capability_fields(LibraryGeneration::Current);
        let legacy301 = capability_fields(LibraryGeneration::Legacy301);
        let legacy_v2 = capability_fields(LibraryGeneration::LegacyV2);

        assert_eq!(current.len(), legacy301.len() + 2);
        assert_eq!(legacy301.len(), legacy_v2.len());
        assert!(current.iter().any(|f| f.name == "get_split_freq_mode"));
        assert!(!legacy301.iter().any(|f| f.name == "get_split_freq_mode"));
    }

    #[test]
    fn test_sentinel_offsets_shift_between_generations() {
        let model = DataModel::LP64;
        let current = StructLayout::compute(&capability_fields(LibraryGeneration::Current), &model);
        let legacy301 =
            StructLayout::compute(&capability_fields(LibraryGeneration::Legacy301), &model);
        let legacy_v2 =
            StructLayout::compute(&capability_fields(LibraryGeneration::LegacyV2), &model);

        // priv sits before the split callbacks, so only the filter count moves it
        assert_eq!(current.offset_of("priv"), legacy301.offset_of("priv"));
        assert_eq!(
            current.offset_of("priv").unwrap() - legacy_v2.offset_of("priv").unwrap(),
            18 * 16
        );
        assert_eq!(
            current.offset_of("decode_event").unwrap() - legacy301.offset_of("decode_event").unwrap(),
            2 * 8
        );
    }

    #[test]
    fn test_element_sizes() {
        let lp64 = DataModel::LP64;
        assert_eq!(StructLayout::compute(FREQ_RANGE, &lp64).size, 40);
        assert_eq!(StructLayout::compute(MODE_VALUE, &lp64).size, 16);
        assert_eq!(StructLayout::compute(CHANNEL_LIST, &lp64).size, 48);
        assert_eq!(StructLayout::compute(GRANULARITY, &lp64).size, 24);

        let ilp32 = DataModel::ILP32;
        assert_eq!(StructLayout::compute(FREQ_RANGE, &ilp32).size, 36);
        assert_eq!(StructLayout::compute(MODE_VALUE, &ilp32).size, 8);
        assert_eq!(StructLayout::compute(CHANNEL_LIST, &ilp32).size, 28);
    }

    #[test]
    fn test_callback_names() {
        let names = callback_names(LibraryGeneration::Legacy301);
        assert_eq!(names.first(), Some(&"rig_init"));
        assert_eq!(names.last(), Some(&"get_mem_all_cb"));
        assert!(names.contains(&"decode_event"));
    }
}
