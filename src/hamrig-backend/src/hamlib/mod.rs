// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! libhamlib backend.
//!
//! The library is loaded at runtime. Loading probes the dummy model once to
//! settle the capability block layout, then enumerates every model the
//! library ships into a [`RigRegistry`].

mod ffi;
mod memory;
mod rig;

use std::ffi::{c_int, c_void};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use hamrig_core::abi::{caps_address_from_rig, decode_caps, resolve, CapsLayout};
use hamrig_core::rig::types::DUMMY_MODEL;
use hamrig_core::{
    AbiCache, AbiProfile, CapabilitySet, DataModel, NativeRig, RigError, RigProvider,
    RigRegistry, RigResult,
};
use tracing::{debug, info, warn};

pub use memory::ProcessMemory;
pub use rig::HamlibRig;

use ffi::HamlibApi;

const LIBRARY_ENV: &str = "HAMRIG_HAMLIB_PATH";

#[cfg(windows)]
const DEFAULT_LIBRARIES: &[&str] = &["libhamlib-4.dll", "libhamlib-2.dll"];
#[cfg(target_os = "macos")]
const DEFAULT_LIBRARIES: &[&str] = &["libhamlib.4.dylib", "libhamlib.2.dylib", "libhamlib.dylib"];
#[cfg(all(unix, not(target_os = "macos")))]
const DEFAULT_LIBRARIES: &[&str] = &["libhamlib.so.4", "libhamlib.so.2", "libhamlib.so"];

/// `RIG_DEBUG_NONE`
const DEBUG_NONE: c_int = 0;

const UNKNOWN_VERSION: &str = "3.0.1 or earlier";
const UNKNOWN: &str = "Unknown";

/// Candidate libraries in the order they are tried.
fn library_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(path) = std::env::var(LIBRARY_ENV) {
        if !path.trim().is_empty() {
            paths.push(PathBuf::from(path));
        }
    }
    if let Some(path) = configured {
        paths.push(path.to_path_buf());
    }
    paths.extend(DEFAULT_LIBRARIES.iter().map(PathBuf::from));
    paths
}

fn load_api(configured: Option<&Path>) -> RigResult<(HamlibApi, PathBuf)> {
    let mut last_err = RigError::library("no candidate library");
    for path in library_candidates(configured) {
        match HamlibApi::load(&path) {
            Ok(api) => return Ok((api, path)),
            Err(e) => {
                debug!("Skipping {:?}: {}", path, e);
                last_err = e;
            }
        }
    }
    Err(last_err)
}

/// Strip the "Hamlib" prefix the library puts on its version string.
fn clean_version(raw: Option<String>) -> String {
    raw.map(|v| v.replace("Hamlib", "").trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

/// Settle the layout against a throwaway dummy rig.
fn probe_profile(api: &HamlibApi, data_model: DataModel) -> RigResult<AbiProfile> {
    let rig = unsafe { (api.rig_init)(DUMMY_MODEL) };
    let Some(rig) = NonNull::new(rig) else {
        warn!("rig_init returned null for the dummy model");
        return Err(RigError::UnsupportedLibraryVersion);
    };
    let result = caps_address_from_rig(&ProcessMemory, rig.as_ptr() as u64, data_model)
        .and_then(|caps| resolve(&ProcessMemory, caps, data_model));
    unsafe { (api.rig_cleanup)(rig.as_ptr()) };
    result
}

unsafe extern "C" fn collect_caps(caps: *const c_void, data: *mut c_void) -> c_int {
    // SAFETY: `data` is the Vec passed to rig_list_foreach below.
    let out = &mut *(data as *mut Vec<u64>);
    out.push(caps as u64);
    1
}

fn enumerate(api: &HamlibApi, profile: AbiProfile) -> RigResult<RigRegistry> {
    let ret = unsafe { (api.rig_load_all_backends)() };
    if ret != 0 {
        warn!("rig_load_all_backends returned {}", ret);
    }

    let mut addresses: Vec<u64> = Vec::new();
    let ret = unsafe {
        (api.rig_list_foreach)(collect_caps, &mut addresses as *mut Vec<u64> as *mut c_void)
    };
    if ret != 0 {
        warn!("rig_list_foreach returned {}", ret);
    }

    let layout = CapsLayout::new(profile);
    let mut registry = RigRegistry::new();
    for addr in addresses {
        match decode_caps(&ProcessMemory, addr, &layout) {
            Ok(caps) => {
                registry.add(caps);
            }
            Err(e) => warn!("Skipping capability block at {:#x}: {}", addr, e),
        }
    }
    Ok(registry)
}

/// A loaded libhamlib and the models it supports.
pub struct HamlibProvider {
    api: Arc<HamlibApi>,
    path: PathBuf,
    profile: AbiProfile,
    registry: RigRegistry,
    version: String,
    copyright: String,
    license: String,
}

impl HamlibProvider {
    /// Load libhamlib, resolving the layout through the process-wide cache.
    pub fn load(configured: Option<&Path>) -> RigResult<Self> {
        Self::load_with_cache(configured, AbiCache::process())
    }

    pub fn load_with_cache(configured: Option<&Path>, cache: &AbiCache) -> RigResult<Self> {
        let (api, path) = load_api(configured)?;
        info!("Loaded native library {:?}", path);

        unsafe { (api.rig_set_debug)(DEBUG_NONE) };
        let profile = cache.get_or_resolve(|| probe_profile(&api, DataModel::host()))?;

        let version = clean_version(api.rig_version.and_then(|f| unsafe { ffi::c_string(f()) }));
        let copyright = api
            .rig_copyright
            .and_then(|f| unsafe { ffi::c_string(f()) })
            .unwrap_or_else(|| UNKNOWN.to_string());
        let license = api
            .rig_license
            .and_then(|f| unsafe { ffi::c_string(f()) })
            .unwrap_or_else(|| UNKNOWN.to_string());

        let registry = enumerate(&api, profile)?;
        info!(
            "libhamlib {} ({}): {} models",
            version,
            profile,
            registry.len()
        );

        Ok(Self {
            api: Arc::new(api),
            path,
            profile,
            registry,
            version,
            copyright,
            license,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> AbiProfile {
        self.profile
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    pub fn license(&self) -> &str {
        &self.license
    }
}

impl RigProvider for HamlibProvider {
    fn registry(&self) -> &RigRegistry {
        &self.registry
    }

    fn create(&self, caps: &CapabilitySet) -> RigResult<Box<dyn NativeRig>> {
        let handle = unsafe { (self.api.rig_init)(caps.model) };
        let handle = NonNull::new(handle).ok_or_else(|| {
            RigError::library(format!("rig_init failed for model {}", caps.model))
        })?;
        Ok(Box::new(HamlibRig::new(Arc::clone(&self.api), handle)))
    }
}
