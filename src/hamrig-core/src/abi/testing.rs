// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Synthetic native memory and capability block builder for tests.

use crate::rig::native::NativeMemory;

use super::decode::CapsLayout;
use super::layout::{DataModel, StructLayout};
use super::resolver::AbiProfile;
use super::tables::{callback_names, CHANNEL_CAP, CHANNEL_LIST, FREQ_RANGE, MODE_VALUE};

/// Sparse address space made of mapped regions.
#[derive(Debug, Default)]
pub struct SyntheticMemory {
    regions: Vec<(u64, Vec<u8>)>,
}

impl SyntheticMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&mut self, addr: u64, bytes: Vec<u8>) {
        self.regions.push((addr, bytes));
    }
}

impl NativeMemory for SyntheticMemory {
    fn read(&self, addr: u64, buf: &mut [u8]) -> bool {
        let Some(end) = addr.checked_add(buf.len() as u64) else {
            return false;
        };
        for (start, bytes) in &self.regions {
            if addr >= *start && end <= start + bytes.len() as u64 {
                let from = (addr - start) as usize;
                buf.copy_from_slice(&bytes[from..from + buf.len()]);
                return true;
            }
        }
        false
    }
}

const BLOCK_BASE: u64 = 0x1_0000;
const HEAP_BASE: u64 = 0x8_0000;

/// Builds a capability block laid out for one [`AbiProfile`].
pub struct CapsBlockBuilder {
    model: DataModel,
    layout: CapsLayout,
    block: Vec<u8>,
    heap: Vec<u8>,
    range: StructLayout,
    mode_value: StructLayout,
    channel: StructLayout,
    channel_cap: StructLayout,
}

impl CapsBlockBuilder {
    pub fn new(profile: AbiProfile) -> Self {
        let model = profile.data_model;
        let layout = CapsLayout::new(profile);
        let size = layout.block().size;
        Self {
            model,
            layout,
            block: vec![0; size],
            heap: Vec::new(),
            range: StructLayout::compute(FREQ_RANGE, &model),
            mode_value: StructLayout::compute(MODE_VALUE, &model),
            channel: StructLayout::compute(CHANNEL_LIST, &model),
            channel_cap: StructLayout::compute(CHANNEL_CAP, &model),
        }
    }

    fn put(&mut self, offset: usize, bytes: &[u8]) {
        self.block[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn put_int(&mut self, offset: usize, value: i32) {
        self.put(offset, &value.to_ne_bytes());
    }

    fn put_long(&mut self, offset: usize, value: i64) {
        match self.model.long_size {
            4 => self.put(offset, &(value as i32).to_ne_bytes()),
            _ => self.put(offset, &value.to_ne_bytes()),
        }
    }

    fn put_ptr(&mut self, offset: usize, value: u64) {
        match self.model.pointer_size() {
            4 => self.put(offset, &(value as u32).to_ne_bytes()),
            _ => self.put(offset, &value.to_ne_bytes()),
        }
    }

    fn offset(&self, name: &str) -> usize {
        self.layout.offset(name).expect("member exists")
    }

    fn element(&self, name: &str, index: usize) -> usize {
        self.layout.element(name, index).expect("element in range")
    }

    fn alloc(&mut self, bytes: &[u8]) -> u64 {
        let addr = HEAP_BASE + self.heap.len() as u64;
        self.heap.extend_from_slice(bytes);
        while self.heap.len() % 8 != 0 {
            self.heap.push(0);
        }
        addr
    }

    pub fn int(&mut self, name: &str, value: i32) {
        self.put_int(self.offset(name), value);
    }

    pub fn long(&mut self, name: &str, value: i64) {
        self.put_long(self.offset(name), value);
    }

    pub fn ulong(&mut self, name: &str, value: u64) {
        self.put_long(self.offset(name), value as i64);
    }

    pub fn ptr(&mut self, name: &str, value: u64) {
        self.put_ptr(self.offset(name), value);
    }

    pub fn string(&mut self, name: &str, value: &str) {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        let addr = self.alloc(&bytes);
        self.ptr(name, addr);
    }

    pub fn int_array(&mut self, name: &str, values: &[i32]) {
        for (index, value) in values.iter().enumerate() {
            self.put_int(self.element(name, index), *value);
        }
    }

    /// Zero-terminated tone table referenced by pointer.
    pub fn tones(&mut self, name: &str, values: &[u32]) {
        let mut bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        bytes.extend_from_slice(&0u32.to_ne_bytes());
        let addr = self.alloc(&bytes);
        self.ptr(name, addr);
    }

    pub fn range(&mut self, name: &str, index: usize, start: f64, end: f64, modes: u32) {
        let base = self.element(name, index);
        let at = |n: &str| base + self.range.offset_of(n).expect("range member");
        let (s, e, m, lo, hi) = (at("start"), at("end"), at("modes"), at("low_power"), at("high_power"));
        self.put(s, &start.to_ne_bytes());
        self.put(e, &end.to_ne_bytes());
        self.put(m, &modes.to_ne_bytes());
        self.put_int(lo, -1);
        self.put_int(hi, -1);
    }

    pub fn mode_value(&mut self, name: &str, index: usize, modes: u32, value: i64) {
        let base = self.element(name, index);
        let modes_at = base + self.mode_value.offset_of("modes").expect("modes");
        let value_at = base + self.mode_value.offset_of("value").expect("value");
        self.put(modes_at, &modes.to_ne_bytes());
        self.put_long(value_at, value);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn channel(
        &mut self,
        name: &str,
        index: usize,
        start: i32,
        end: i32,
        kind: i32,
        head: u32,
        tail: u32,
    ) {
        let base = self.element(name, index);
        let at = |n: &str| base + self.channel.offset_of(n).expect("channel member");
        let caps = at("mem_caps");
        let (s, e, t) = (at("start"), at("end"), at("type"));
        let head_at = caps + self.channel_cap.offset_of("head").expect("head");
        let tail_at = caps + self.channel_cap.offset_of("tail").expect("tail");
        self.put_int(s, start);
        self.put_int(e, end);
        self.put_int(t, kind);
        self.put(head_at, &head.to_ne_bytes());
        self.put(tail_at, &tail.to_ne_bytes());
    }

    /// Point every callback except `decode_event` at distinct nonzero code
    /// addresses, as a loaded backend would.
    pub fn fill_callbacks(&mut self) {
        for (n, name) in callback_names(self.layout.profile().generation)
            .into_iter()
            .enumerate()
        {
            if name != "decode_event" {
                self.ptr(name, 0x40_0000 + n as u64 * 0x10);
            }
        }
    }

    /// Map the block and its heap; returns the block address.
    pub fn finish(self) -> (SyntheticMemory, u64) {
        let mut mem = SyntheticMemory::new();
        mem.map(BLOCK_BASE, self.block);
        mem.map(HEAP_BASE, self.heap);
        (mem, BLOCK_BASE)
    }
}
