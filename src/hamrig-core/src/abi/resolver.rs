// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Detection of the native library's capability block layout.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{RigError, RigResult};
use crate::rig::native::NativeMemory;

use super::decode::{BlockReader, CapsLayout};
use super::layout::DataModel;
use super::tables::LibraryGeneration;

/// Data model and library generation every capability decode runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AbiProfile {
    pub data_model: DataModel,
    pub generation: LibraryGeneration,
}

impl AbiProfile {
    pub fn new(data_model: DataModel, generation: LibraryGeneration) -> Self {
        Self {
            data_model,
            generation,
        }
    }
}

impl fmt::Display for AbiProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} layout, {}", self.generation, self.data_model)
    }
}

/// `true` when the pointer at `offset` reads as null. Unreadable is not null.
fn reads_null(reader: &BlockReader<'_>, offset: usize) -> bool {
    reader.ptr(offset) == Some(0)
}

/// Pick the layout under which the dummy model's capability block at
/// `caps_addr` has null `priv` and `decode_event` members.
pub fn resolve(
    mem: &dyn NativeMemory,
    caps_addr: u64,
    data_model: DataModel,
) -> RigResult<AbiProfile> {
    if caps_addr == 0 {
        warn!("Probe rig returned no capability block");
        return Err(RigError::UnsupportedLibraryVersion);
    }
    let reader = BlockReader::new(mem, caps_addr, data_model);

    for generation in LibraryGeneration::DETECTION_ORDER {
        let profile = AbiProfile::new(data_model, generation);
        let layout = CapsLayout::new(profile);
        let priv_at = layout.offset("priv")?;
        let decode_at = layout.offset("decode_event")?;

        let priv_null = reads_null(&reader, priv_at);
        let decode_null = reads_null(&reader, decode_at);
        debug!(
            "Layout {}: priv@{} null={} decode_event@{} null={}",
            profile, priv_at, priv_null, decode_at, decode_null
        );
        if priv_null && decode_null {
            info!("Native library uses the {}", profile);
            return Ok(profile);
        }
    }

    warn!("No known capability layout matches the native library");
    Err(RigError::UnsupportedLibraryVersion)
}

/// Address of the capability block referenced by a rig instance, which is
/// its first member.
pub fn caps_address_from_rig(
    mem: &dyn NativeMemory,
    rig_addr: u64,
    data_model: DataModel,
) -> RigResult<u64> {
    BlockReader::new(mem, rig_addr, data_model)
        .ptr(0)
        .filter(|addr| *addr != 0)
        .ok_or_else(|| RigError::library("rig instance has no capability block"))
}

/// Resolve-once holder for the [`AbiProfile`].
///
/// A failed resolution is cached as well; later callers get the same error
/// without probing again.
#[derive(Debug, Default)]
pub struct AbiCache {
    cell: OnceLock<RigResult<AbiProfile>>,
}

static PROCESS_CACHE: AbiCache = AbiCache::new();

impl AbiCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// A cache already holding `profile`.
    pub fn with_profile(profile: AbiProfile) -> Self {
        let cache = Self::new();
        let _ = cache.cell.set(Ok(profile));
        cache
    }

    /// The cache shared by every backend in this process.
    pub fn process() -> &'static AbiCache {
        &PROCESS_CACHE
    }

    pub fn get(&self) -> Option<RigResult<AbiProfile>> {
        self.cell.get().cloned()
    }

    /// Return the cached outcome, running `probe` only on first use.
    pub fn get_or_resolve<F>(&self, probe: F) -> RigResult<AbiProfile>
    where
        F: FnOnce() -> RigResult<AbiProfile>,
    {
        self.cell.get_or_init(probe).clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::abi::testing::{CapsBlockBuilder, SyntheticMemory};

    const MODELS: [DataModel; 4] = [
        DataModel::ILP32,
        DataModel::ILP32_ALIGN8,
        DataModel::LP64,
        DataModel::LLP64,
    ];

    fn dummy_block(profile: AbiProfile) -> (SyntheticMemory, u64) {
        let mut b = CapsBlockBuilder::new(profile);
        b.int("rig_model", 1);
        b.string("model_name", "Dummy");
        b.fill_callbacks();
        b.finish()
    }

    #[test]
    fn test_resolves_each_layout_for_each_data_model() {
        for model in MODELS {
            for generation in LibraryGeneration::DETECTION_ORDER {
                let expected = AbiProfile::new(model, generation);
                let (mem, addr) = dummy_block(expected);
                assert_eq!(resolve(&mem, addr, model).unwrap(), expected, "{expected}");
            }
        }
    }

    #[test]
    fn test_corrupted_block_is_unsupported() {
        let profile = AbiProfile::new(DataModel::LP64, LibraryGeneration::Current);
        let mut b = CapsBlockBuilder::new(profile);
        b.fill_callbacks();
        b.ptr("priv", 0xdead_0000);
        let (mem, addr) = b.finish();
        assert_eq!(
            resolve(&mem, addr, DataModel::LP64),
            Err(RigError::UnsupportedLibraryVersion)
        );
        assert_eq!(
            resolve(&mem, 0, DataModel::LP64),
            Err(RigError::UnsupportedLibraryVersion)
        );
    }

    #[test]
    fn test_block_at_top_of_address_space_is_unsupported() {
        let mem = SyntheticMemory::new();
        for addr in [u64::MAX, u64::MAX - 16] {
            assert_eq!(
                resolve(&mem, addr, DataModel::LP64),
                Err(RigError::UnsupportedLibraryVersion)
            );
        }
        assert!(caps_address_from_rig(&mem, u64::MAX - 2, DataModel::LP64).is_err());
    }

    #[test]
    fn test_truncated_block_counts_as_not_null() {
        let mut mem = SyntheticMemory::new();
        mem.map(0x4000, vec![0u8; 128]);
        assert_eq!(
            resolve(&mem, 0x4000, DataModel::LP64),
            Err(RigError::UnsupportedLibraryVersion)
        );
    }

    #[test]
    fn test_caps_address_from_rig() {
        let mut mem = SyntheticMemory::new();
        mem.map(0x100, 0x8000u64.to_ne_bytes().to_vec());
        mem.map(0x200, 0x9000u32.to_ne_bytes().to_vec());
        assert_eq!(caps_address_from_rig(&mem, 0x100, DataModel::LP64), Ok(0x8000));
        assert_eq!(caps_address_from_rig(&mem, 0x200, DataModel::ILP32), Ok(0x9000));
        assert!(caps_address_from_rig(&mem, 0x300, DataModel::LP64).is_err());
    }

    #[test]
    fn test_cache_resolves_once() {
        let cache = AbiCache::new();
        let probes = AtomicUsize::new(0);
        let probe = || {
            probes.fetch_add(1, Ordering::SeqCst);
            Err(RigError::UnsupportedLibraryVersion)
        };
        assert!(cache.get().is_none());
        assert_eq!(cache.get_or_resolve(probe), Err(RigError::UnsupportedLibraryVersion));
        assert_eq!(
            cache.get_or_resolve(|| {
                probes.fetch_add(1, Ordering::SeqCst);
                Ok(AbiProfile::new(DataModel::LP64, LibraryGeneration::Current))
            }),
            Err(RigError::UnsupportedLibraryVersion)
        );
        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_injected_profile() {
        let profile = AbiProfile::new(DataModel::LLP64, LibraryGeneration::LegacyV2);
        let cache = AbiCache::with_profile(profile);
        assert_eq!(cache.get(), Some(Ok(profile)));
        assert_eq!(cache.get_or_resolve(|| Err(RigError::UnsupportedLibraryVersion)), Ok(profile));
    }
}
