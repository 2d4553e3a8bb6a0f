// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Capability block decoding under a resolved [`AbiProfile`].

use crate::error::{RigError, RigResult};
use crate::rig::caps::{CapabilitySet, ChannelCaps, ChannelList, FreqRange, ModeValue};
use crate::rig::native::NativeMemory;
use crate::rig::types::{
    Announce, BackendStatus, ChannelType, DcdType, Func, Level, Parm, PttType, RigMode,
    RigPort, RigType, ScanOp, SerialHandshake, SerialParity, Transceive, Vfo, VfoOp,
};

use super::layout::{DataModel, StructLayout};
use super::resolver::AbiProfile;
use super::tables::{
    capability_fields, CHANNEL_CAP, CHANNEL_LIST, FREQ_RANGE, MAXDBLSTSIZ, MODE_VALUE,
};

const MAX_STRING: usize = 1024;
const MAX_TONES: usize = 256;

/// Precomputed offsets for decoding capability blocks of one profile.
#[derive(Debug, Clone)]
pub struct CapsLayout {
    profile: AbiProfile,
    block: StructLayout,
    channel: StructLayout,
    channel_cap: StructLayout,
    range: StructLayout,
    mode_value: StructLayout,
}

impl CapsLayout {
    pub fn new(profile: AbiProfile) -> Self {
        let model = &profile.data_model;
        Self {
            profile,
            block: StructLayout::compute(&capability_fields(profile.generation), model),
            channel: StructLayout::compute(CHANNEL_LIST, model),
            channel_cap: StructLayout::compute(CHANNEL_CAP, model),
            range: StructLayout::compute(FREQ_RANGE, model),
            mode_value: StructLayout::compute(MODE_VALUE, model),
        }
    }

    pub fn profile(&self) -> AbiProfile {
        self.profile
    }

    pub fn block(&self) -> &StructLayout {
        &self.block
    }

    /// Offset of a capability block member.
    pub fn offset(&self, name: &str) -> RigResult<usize> {
        self.block
            .offset_of(name)
            .ok_or_else(|| RigError::library(format!("capability block has no member {name}")))
    }

    /// Offset of element `index` of an array member.
    pub(crate) fn element(&self, name: &str, index: usize) -> Option<usize> {
        self.block
            .element_offset(name, index, &self.profile.data_model)
    }
}

/// Typed reads at offsets from one base address.
///
/// An address that would run past the end of the address space is
/// unreadable, like any other address the memory refuses.
pub struct BlockReader<'a> {
    mem: &'a dyn NativeMemory,
    base: Option<u64>,
    model: DataModel,
}

impl<'a> BlockReader<'a> {
    pub fn new(mem: &'a dyn NativeMemory, base: u64, model: DataModel) -> Self {
        Self {
            mem,
            base: Some(base),
            model,
        }
    }

    /// Reader positioned `offset` bytes further into the same memory.
    pub fn at(&self, offset: usize) -> BlockReader<'a> {
        BlockReader {
            mem: self.mem,
            base: self.address(offset),
            model: self.model,
        }
    }

    fn address(&self, offset: usize) -> Option<u64> {
        self.base?.checked_add(u64::try_from(offset).ok()?)
    }

    fn raw<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        let addr = self.address(offset)?;
        let mut buf = [0u8; N];
        self.mem.read(addr, &mut buf).then_some(buf)
    }

    pub fn int(&self, offset: usize) -> Option<i32> {
        self.raw::<4>(offset).map(i32::from_ne_bytes)
    }

    pub fn uint(&self, offset: usize) -> Option<u32> {
        self.raw::<4>(offset).map(u32::from_ne_bytes)
    }

    pub fn long(&self, offset: usize) -> Option<i64> {
        match self.model.long_size {
            4 => self.int(offset).map(i64::from),
            _ => self.raw::<8>(offset).map(i64::from_ne_bytes),
        }
    }

    pub fn ulong(&self, offset: usize) -> Option<u64> {
        match self.model.long_size {
            4 => self.uint(offset).map(u64::from),
            _ => self.raw::<8>(offset).map(u64::from_ne_bytes),
        }
    }

    pub fn double(&self, offset: usize) -> Option<f64> {
        self.raw::<8>(offset).map(f64::from_ne_bytes)
    }

    pub fn ptr(&self, offset: usize) -> Option<u64> {
        match self.model.pointer_size() {
            4 => self.uint(offset).map(u64::from),
            _ => self.raw::<8>(offset).map(u64::from_ne_bytes),
        }
    }

    /// Follow the pointer at `offset` to a C string. Null reads as empty.
    pub fn string(&self, offset: usize) -> Option<String> {
        match self.ptr(offset)? {
            0 => Some(String::new()),
            addr => self.mem.read_c_string(addr, MAX_STRING),
        }
    }
}

fn unreadable(what: &str) -> RigError {
    RigError::library(format!("unreadable {what} in capability block"))
}

struct Decoder<'a> {
    layout: &'a CapsLayout,
    reader: BlockReader<'a>,
}

impl Decoder<'_> {
    fn int(&self, name: &str) -> RigResult<i32> {
        self.reader
            .int(self.layout.offset(name)?)
            .ok_or_else(|| unreadable(name))
    }

    fn long(&self, name: &str) -> RigResult<i64> {
        self.reader
            .long(self.layout.offset(name)?)
            .ok_or_else(|| unreadable(name))
    }

    fn ulong(&self, name: &str) -> RigResult<u64> {
        self.reader
            .ulong(self.layout.offset(name)?)
            .ok_or_else(|| unreadable(name))
    }

    fn ptr(&self, name: &str) -> RigResult<u64> {
        self.reader
            .ptr(self.layout.offset(name)?)
            .ok_or_else(|| unreadable(name))
    }

    fn string(&self, name: &str) -> RigResult<String> {
        self.reader
            .string(self.layout.offset(name)?)
            .ok_or_else(|| unreadable(name))
    }

    /// Embedded int array terminated by 0.
    fn int_list(&self, name: &str) -> RigResult<Vec<i32>> {
        let mut out = Vec::new();
        for index in 0..MAXDBLSTSIZ {
            let offset = self
                .layout
                .element(name, index)
                .ok_or_else(|| unreadable(name))?;
            match self.reader.int(offset).ok_or_else(|| unreadable(name))? {
                0 => break,
                value => out.push(value),
            }
        }
        Ok(out)
    }

    /// Pointer to a 0-terminated `tone_t` array; null means no list.
    fn tone_list(&self, name: &str) -> RigResult<Vec<u32>> {
        let addr = self.ptr(name)?;
        if addr == 0 {
            return Ok(Vec::new());
        }
        let list = BlockReader::new(self.reader.mem, addr, self.reader.model);
        let mut out = Vec::new();
        for index in 0..MAX_TONES {
            match list.uint(index * 4).ok_or_else(|| unreadable(name))? {
                0 => break,
                tone => out.push(tone),
            }
        }
        Ok(out)
    }

    fn array_elements<T>(
        &self,
        name: &str,
        mut decode: impl FnMut(&BlockReader<'_>) -> Option<Option<T>>,
    ) -> RigResult<Vec<T>> {
        let mut out = Vec::new();
        let mut index = 0;
        while let Some(offset) = self.layout.element(name, index) {
            let element = self.reader.at(offset);
            match decode(&element).ok_or_else(|| unreadable(name))? {
                Some(item) => out.push(item),
                None => break,
            }
            index += 1;
        }
        Ok(out)
    }

    fn channels(&self) -> RigResult<Vec<ChannelList>> {
        let l = &self.layout.channel;
        let cap = &self.layout.channel_cap;
        let caps_at = l.offset_of("mem_caps").unwrap_or_default();
        let field = |layout: &StructLayout, name: &str| layout.offset_of(name).unwrap_or_default();
        self.array_elements("chan_list", |r| {
            let kind = ChannelType::from_raw(r.int(field(l, "type"))?);
            if kind == ChannelType::None {
                return Some(None);
            }
            let caps = r.at(caps_at);
            Some(Some(ChannelList {
                start: r.int(field(l, "start"))?,
                end: r.int(field(l, "end"))?,
                kind,
                mem_caps: ChannelCaps::from_words(
                    caps.uint(field(cap, "head"))?,
                    Func(caps.ulong(field(cap, "funcs"))?),
                    Level(caps.ulong(field(cap, "levels"))?),
                    caps.uint(field(cap, "tail"))?,
                ),
            }))
        })
    }

    fn ranges(&self, name: &str) -> RigResult<Vec<FreqRange>> {
        let l = &self.layout.range;
        let field = |name: &str| l.offset_of(name).unwrap_or_default();
        self.array_elements(name, |r| {
            let start_hz = r.double(field("start"))?;
            let end_hz = r.double(field("end"))?;
            if start_hz == 0.0 && end_hz == 0.0 {
                return Some(None);
            }
            Some(Some(FreqRange {
                start_hz,
                end_hz,
                modes: RigMode(r.uint(field("modes"))?),
                low_power: r.int(field("low_power"))?,
                high_power: r.int(field("high_power"))?,
                vfo: Vfo(r.int(field("vfo"))?),
                ant: r.int(field("ant"))?,
            }))
        })
    }

    fn mode_values(&self, name: &str) -> RigResult<Vec<ModeValue>> {
        let l = &self.layout.mode_value;
        let modes_at = l.offset_of("modes").unwrap_or_default();
        let value_at = l.offset_of("value").unwrap_or_default();
        self.array_elements(name, |r| {
            let modes = RigMode(r.uint(modes_at)?);
            let value = r.long(value_at)?;
            if modes.is_empty() && value == 0 {
                return Some(None);
            }
            Some(Some(ModeValue { modes, value }))
        })
    }
}

/// Decode the capability block at `caps_addr`.
pub fn decode_caps(
    mem: &dyn NativeMemory,
    caps_addr: u64,
    layout: &CapsLayout,
) -> RigResult<CapabilitySet> {
    if caps_addr == 0 {
        return Err(RigError::library("null capability block"));
    }
    let d = Decoder {
        layout,
        reader: BlockReader::new(mem, caps_addr, layout.profile.data_model),
    };

    Ok(CapabilitySet {
        model: d.int("rig_model")?,
        model_name: d.string("model_name")?,
        mfg_name: d.string("mfg_name")?,
        version: d.string("version")?,
        copyright: d.string("copyright")?,
        status: BackendStatus::from_raw(d.int("status")?),
        rig_type: RigType(d.int("rig_type")?),
        ptt_type: PttType::from_raw(d.int("ptt_type")?),
        dcd_type: DcdType::from_raw(d.int("dcd_type")?),
        port_type: RigPort::from_raw(d.int("port_type")?),
        serial_rate_min: d.int("serial_rate_min")?.max(0) as u32,
        serial_rate_max: d.int("serial_rate_max")?.max(0) as u32,
        serial_data_bits: d.int("serial_data_bits")?.clamp(0, u8::MAX as i32) as u8,
        serial_stop_bits: d.int("serial_stop_bits")?.clamp(0, u8::MAX as i32) as u8,
        serial_parity: SerialParity::from_raw(d.int("serial_parity")?),
        serial_handshake: SerialHandshake::from_raw(d.int("serial_handshake")?),
        write_delay: d.int("write_delay")?,
        post_write_delay: d.int("post_write_delay")?,
        timeout: d.int("timeout")?,
        retry: d.int("retry")?,
        has_get_func: Func(d.ulong("has_get_func")?),
        has_set_func: Func(d.ulong("has_set_func")?),
        has_get_level: Level(d.ulong("has_get_level")?),
        has_set_level: Level(d.ulong("has_set_level")?),
        has_get_parm: Parm(d.ulong("has_get_parm")?),
        has_set_parm: Parm(d.ulong("has_set_parm")?),
        preamp: d.int_list("preamp")?,
        attenuator: d.int_list("attenuator")?,
        max_rit: d.long("max_rit")?,
        max_xit: d.long("max_xit")?,
        max_ifshift: d.long("max_ifshift")?,
        announces: Announce(d.int("announces")? as u32),
        vfo_ops: VfoOp(d.int("vfo_ops")? as u32),
        scan_ops: ScanOp(d.int("scan_ops")? as u32),
        targetable_vfo: d.int("targetable_vfo")?,
        transceive: Transceive::from_raw(d.int("transceive")?),
        bank_qty: d.int("bank_qty")?,
        chan_desc_sz: d.int("chan_desc_sz")?,
        chan_list: d.channels()?,
        rx_range_list1: d.ranges("rx_range_list1")?,
        tx_range_list1: d.ranges("tx_range_list1")?,
        rx_range_list2: d.ranges("rx_range_list2")?,
        tx_range_list2: d.ranges("tx_range_list2")?,
        tuning_steps: d.mode_values("tuning_steps")?,
        filters: d.mode_values("filters")?,
        ctcss_list: d.tone_list("ctcss_list")?,
        dcs_list: d.tone_list("dcs_list")?,
        has_priv_data: d.ptr("priv")? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::tables::LibraryGeneration;
    use crate::abi::testing::{CapsBlockBuilder, SyntheticMemory};

    fn sample_block(profile: AbiProfile) -> (SyntheticMemory, u64) {
        let mut b = CapsBlockBuilder::new(profile);
        b.int("rig_model", 2029);
        b.string("model_name", "IC-7300");
        b.string("mfg_name", "Icom");
        b.string("version", "20200323.0");
        b.int("port_type", 1);
        b.int("serial_rate_min", 300);
        b.int("serial_rate_max", 115200);
        b.int("serial_data_bits", 8);
        b.int("serial_stop_bits", 1);
        b.ulong("has_get_level", Level::AF.0 | Level::SWR.0);
        b.long("max_rit", -9999);
        b.int_array("preamp", &[10, 20]);
        b.range("rx_range_list1", 0, 30e3, 74.8e6, RigMode::USB.0 | RigMode::LSB.0);
        b.range("tx_range_list1", 0, 1.8e6, 1.99999e6, RigMode::CW.0);
        b.range("tx_range_list1", 1, 3.5e6, 3.99999e6, RigMode::CW.0);
        b.mode_value("filters", 0, RigMode::USB.0, 2400);
        b.mode_value("filters", 1, RigMode::CW.0, 500);
        b.mode_value("tuning_steps", 0, RigMode::USB.0, 10);
        b.channel("chan_list", 0, 1, 99, ChannelType::Memory.raw(), 0b1000, 0b1);
        b.tones("ctcss_list", &[670, 719, 885]);
        b.finish()
    }

    #[test]
    fn test_decode_representative_fields_per_generation() {
        for generation in LibraryGeneration::DETECTION_ORDER {
            for model in [DataModel::ILP32, DataModel::LP64, DataModel::LLP64] {
                let profile = AbiProfile::new(model, generation);
                let (mem, addr) = sample_block(profile);
                let caps = decode_caps(&mem, addr, &CapsLayout::new(profile)).unwrap();

                assert_eq!(caps.model, 2029, "{profile}");
                assert_eq!(caps.model_name, "IC-7300");
                assert_eq!(caps.mfg_name, "Icom");
                assert_eq!(caps.copyright, "");
                assert!(caps.is_serial());
                assert_eq!(caps.serial_rate_max, 115200);
                assert!(caps.has_get_level(Level::SWR));
                assert_eq!(caps.max_rit, -9999);
                assert_eq!(caps.preamp, vec![10, 20]);
                assert_eq!(caps.rx_range_list1.len(), 1);
                assert_eq!(caps.rx_range_list1[0].end_hz, 74.8e6);
                assert_eq!(caps.tx_range_list1.len(), 2);
                assert!(caps.rx_range_list2.is_empty());
                assert_eq!(caps.filters.len(), 2);
                assert_eq!(caps.filters[1].value, 500);
                assert_eq!(caps.tuning_steps.len(), 1);
                assert_eq!(caps.chan_list.len(), 1);
                assert_eq!(caps.chan_list[0].end, 99);
                assert!(caps.chan_list[0].mem_caps.freq);
                assert!(caps.chan_list[0].mem_caps.ctcss_tone);
                assert_eq!(caps.ctcss_list, vec![670, 719, 885]);
                assert!(caps.dcs_list.is_empty());
                assert!(!caps.has_priv_data);
            }
        }
    }

    #[test]
    fn test_truncated_block_is_an_error() {
        let profile = AbiProfile::new(DataModel::LP64, LibraryGeneration::Current);
        let mut mem = SyntheticMemory::new();
        mem.map(0x1000, vec![0u8; 64]);
        let err = decode_caps(&mem, 0x1000, &CapsLayout::new(profile)).unwrap_err();
        assert!(matches!(err, RigError::Library(_)));
        assert!(decode_caps(&mem, 0, &CapsLayout::new(profile)).is_err());
    }

    #[test]
    fn test_list_pointer_near_address_space_end_is_an_error() {
        let profile = AbiProfile::new(DataModel::LP64, LibraryGeneration::Current);
        let mut b = CapsBlockBuilder::new(profile);
        b.int("rig_model", 1);
        b.ptr("ctcss_list", u64::MAX - 1);
        let (mem, addr) = b.finish();
        let err = decode_caps(&mem, addr, &CapsLayout::new(profile)).unwrap_err();
        assert!(matches!(err, RigError::Library(_)));
        assert!(decode_caps(&mem, u64::MAX - 16, &CapsLayout::new(profile)).is_err());
    }

    #[test]
    fn test_reader_offsets_do_not_wrap() {
        let mut mem = SyntheticMemory::new();
        mem.map(0, vec![7u8; 16]);
        let reader = BlockReader::new(&mem, u64::MAX - 2, DataModel::LP64);
        assert_eq!(reader.int(4), None);
        assert_eq!(reader.at(8).int(0), None);
        assert_eq!(reader.at(usize::MAX).ptr(0), None);
        assert_eq!(mem.read_c_string(u64::MAX, 8), None);
    }

    #[test]
    fn test_long_reads_follow_data_model() {
        let mut mem = SyntheticMemory::new();
        mem.map(0x10, (-2i32).to_ne_bytes().to_vec());
        let reader = BlockReader::new(&mem, 0x10, DataModel::LLP64);
        assert_eq!(reader.long(0), Some(-2));
        assert_eq!(reader.ulong(0), Some(u32::MAX as u64 - 1));
        let wide = BlockReader::new(&mem, 0x10, DataModel::LP64);
        assert_eq!(wide.long(0), None);
    }
}
