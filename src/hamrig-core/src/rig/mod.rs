// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod caps;
pub mod controller;
pub mod native;
pub mod types;

pub use caps::{CapabilitySet, ChannelCaps, ChannelList, FreqRange, ModeValue};
pub use native::{NativeMemory, NativeRig};
