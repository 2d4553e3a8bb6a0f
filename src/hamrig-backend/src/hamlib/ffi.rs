// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Entry points of libhamlib, resolved at load time.
//!
//! Types follow the 3.x headers: `vfo_t`, `rmode_t` and `rig_model_t` are
//! 32-bit, `setting_t`, `token_t` and the `shortfreq_t` family are C
//! `long`.

use std::ffi::{c_char, c_int, c_long, c_uint, c_ulong, c_void, CStr};
use std::path::Path;

use hamrig_core::{RigError, RigResult};
use libloading::{Library, Symbol};
use tracing::debug;

pub type Rig = c_void;
pub type Vfo = c_int;
pub type RMode = c_uint;
pub type Setting = c_ulong;
pub type Token = c_long;
pub type ShortFreq = c_long;

/// `value_t`: the numeric members and the string pointer that sets its size.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawValue {
    pub i: c_int,
    pub f: f32,
    pub s: *const c_char,
}

pub type ListCallback = unsafe extern "C" fn(caps: *const c_void, data: *mut c_void) -> c_int;

/// Function table of a loaded libhamlib. The library stays loaded for as
/// long as the table lives.
pub struct HamlibApi {
    pub rig_set_debug: unsafe extern "C" fn(c_int),
    pub rig_load_all_backends: unsafe extern "C" fn() -> c_int,
    pub rig_list_foreach: unsafe extern "C" fn(ListCallback, *mut c_void) -> c_int,
    pub rig_init: unsafe extern "C" fn(c_int) -> *mut Rig,
    pub rig_open: unsafe extern "C" fn(*mut Rig) -> c_int,
    pub rig_close: unsafe extern "C" fn(*mut Rig) -> c_int,
    pub rig_cleanup: unsafe extern "C" fn(*mut Rig) -> c_int,
    pub rigerror: unsafe extern "C" fn(c_int) -> *const c_char,

    pub rig_token_lookup: unsafe extern "C" fn(*mut Rig, *const c_char) -> Token,
    pub rig_set_conf: unsafe extern "C" fn(*mut Rig, Token, *const c_char) -> c_int,
    pub rig_get_conf: unsafe extern "C" fn(*mut Rig, Token, *mut c_char) -> c_int,

    pub rig_set_freq: unsafe extern "C" fn(*mut Rig, Vfo, f64) -> c_int,
    pub rig_get_freq: unsafe extern "C" fn(*mut Rig, Vfo, *mut f64) -> c_int,
    pub rig_set_mode: unsafe extern "C" fn(*mut Rig, Vfo, RMode, ShortFreq) -> c_int,
    pub rig_get_mode: unsafe extern "C" fn(*mut Rig, Vfo, *mut RMode, *mut ShortFreq) -> c_int,
    pub rig_set_vfo: unsafe extern "C" fn(*mut Rig, Vfo) -> c_int,
    pub rig_get_vfo: unsafe extern "C" fn(*mut Rig, *mut Vfo) -> c_int,
    pub rig_set_ptt: unsafe extern "C" fn(*mut Rig, Vfo, c_int) -> c_int,
    pub rig_get_ptt: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_int) -> c_int,
    pub rig_get_dcd: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_int) -> c_int,

    pub rig_set_level: unsafe extern "C" fn(*mut Rig, Vfo, Setting, RawValue) -> c_int,
    pub rig_get_level: unsafe extern "C" fn(*mut Rig, Vfo, Setting, *mut RawValue) -> c_int,
    pub rig_set_parm: unsafe extern "C" fn(*mut Rig, Setting, RawValue) -> c_int,
    pub rig_get_parm: unsafe extern "C" fn(*mut Rig, Setting, *mut RawValue) -> c_int,
    pub rig_set_func: unsafe extern "C" fn(*mut Rig, Vfo, Setting, c_int) -> c_int,
    pub rig_get_func: unsafe extern "C" fn(*mut Rig, Vfo, Setting, *mut c_int) -> c_int,

    pub rig_set_split_freq: unsafe extern "C" fn(*mut Rig, Vfo, f64) -> c_int,
    pub rig_get_split_freq: unsafe extern "C" fn(*mut Rig, Vfo, *mut f64) -> c_int,
    pub rig_set_split_mode: unsafe extern "C" fn(*mut Rig, Vfo, RMode, ShortFreq) -> c_int,
    pub rig_get_split_mode:
        unsafe extern "C" fn(*mut Rig, Vfo, *mut RMode, *mut ShortFreq) -> c_int,
    pub rig_set_split_vfo: unsafe extern "C" fn(*mut Rig, Vfo, c_int, Vfo) -> c_int,
    pub rig_get_split_vfo: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_int, *mut Vfo) -> c_int,

    pub rig_set_rit: unsafe extern "C" fn(*mut Rig, Vfo, ShortFreq) -> c_int,
    pub rig_get_rit: unsafe extern "C" fn(*mut Rig, Vfo, *mut ShortFreq) -> c_int,
    pub rig_set_xit: unsafe extern "C" fn(*mut Rig, Vfo, ShortFreq) -> c_int,
    pub rig_get_xit: unsafe extern "C" fn(*mut Rig, Vfo, *mut ShortFreq) -> c_int,
    pub rig_set_ts: unsafe extern "C" fn(*mut Rig, Vfo, ShortFreq) -> c_int,
    pub rig_get_ts: unsafe extern "C" fn(*mut Rig, Vfo, *mut ShortFreq) -> c_int,

    pub rig_set_ctcss_tone: unsafe extern "C" fn(*mut Rig, Vfo, c_uint) -> c_int,
    pub rig_get_ctcss_tone: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_uint) -> c_int,
    pub rig_set_dcs_code: unsafe extern "C" fn(*mut Rig, Vfo, c_uint) -> c_int,
    pub rig_get_dcs_code: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_uint) -> c_int,
    pub rig_set_rptr_shift: unsafe extern "C" fn(*mut Rig, Vfo, c_int) -> c_int,
    pub rig_get_rptr_shift: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_int) -> c_int,
    pub rig_set_rptr_offs: unsafe extern "C" fn(*mut Rig, Vfo, ShortFreq) -> c_int,
    pub rig_get_rptr_offs: unsafe extern "C" fn(*mut Rig, Vfo, *mut ShortFreq) -> c_int,

    pub rig_set_ant: unsafe extern "C" fn(*mut Rig, Vfo, c_int) -> c_int,
    pub rig_get_ant: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_int) -> c_int,
    pub rig_set_mem: unsafe extern "C" fn(*mut Rig, Vfo, c_int) -> c_int,
    pub rig_get_mem: unsafe extern "C" fn(*mut Rig, Vfo, *mut c_int) -> c_int,
    pub rig_set_bank: unsafe extern "C" fn(*mut Rig, Vfo, c_int) -> c_int,
    pub rig_vfo_op: unsafe extern "C" fn(*mut Rig, Vfo, c_int) -> c_int,
    pub rig_scan: unsafe extern "C" fn(*mut Rig, Vfo, c_int, c_int) -> c_int,

    pub rig_set_powerstat: unsafe extern "C" fn(*mut Rig, c_int) -> c_int,
    pub rig_get_powerstat: unsafe extern "C" fn(*mut Rig, *mut c_int) -> c_int,
    pub rig_reset: unsafe extern "C" fn(*mut Rig, c_int) -> c_int,
    pub rig_send_morse: unsafe extern "C" fn(*mut Rig, Vfo, *const c_char) -> c_int,
    pub rig_get_info: unsafe extern "C" fn(*mut Rig) -> *const c_char,

    /// Present from 3.1 on.
    pub rig_version: Option<unsafe extern "C" fn() -> *const c_char>,
    pub rig_copyright: Option<unsafe extern "C" fn() -> *const c_char>,
    pub rig_license: Option<unsafe extern "C" fn() -> *const c_char>,

    _lib: Library,
}

/// Copy a function pointer out of `lib`.
///
/// # Safety
/// `T` must match the C signature of `name`.
unsafe fn sym<T: Copy>(lib: &Library, name: &str) -> RigResult<T> {
    let symbol: Symbol<T> = lib
        .get(name.as_bytes())
        .map_err(|e| RigError::library(format!("missing symbol {}: {}", name, e)))?;
    Ok(*symbol)
}

unsafe fn optional_sym<T: Copy>(lib: &Library, name: &str) -> Option<T> {
    match lib.get::<T>(name.as_bytes()) {
        Ok(symbol) => Some(*symbol),
        Err(_) => {
            debug!("Optional symbol {} not exported", name);
            None
        }
    }
}

impl HamlibApi {
    /// Load the library at `path` (a file path or a bare soname) and resolve
    /// every entry point.
    pub fn load(path: &Path) -> RigResult<Self> {
        unsafe {
            let lib = Library::new(path)
                .map_err(|e| RigError::library(format!("failed to load {:?}: {}", path, e)))?;
            Ok(Self {
                rig_set_debug: sym(&lib, "rig_set_debug")?,
                rig_load_all_backends: sym(&lib, "rig_load_all_backends")?,
                rig_list_foreach: sym(&lib, "rig_list_foreach")?,
                rig_init: sym(&lib, "rig_init")?,
                rig_open: sym(&lib, "rig_open")?,
                rig_close: sym(&lib, "rig_close")?,
                rig_cleanup: sym(&lib, "rig_cleanup")?,
                rigerror: sym(&lib, "rigerror")?,
                rig_token_lookup: sym(&lib, "rig_token_lookup")?,
                rig_set_conf: sym(&lib, "rig_set_conf")?,
                rig_get_conf: sym(&lib, "rig_get_conf")?,
                rig_set_freq: sym(&lib, "rig_set_freq")?,
                rig_get_freq: sym(&lib, "rig_get_freq")?,
                rig_set_mode: sym(&lib, "rig_set_mode")?,
                rig_get_mode: sym(&lib, "rig_get_mode")?,
                rig_set_vfo: sym(&lib, "rig_set_vfo")?,
                rig_get_vfo: sym(&lib, "rig_get_vfo")?,
                rig_set_ptt: sym(&lib, "rig_set_ptt")?,
                rig_get_ptt: sym(&lib, "rig_get_ptt")?,
                rig_get_dcd: sym(&lib, "rig_get_dcd")?,
                rig_set_level: sym(&lib, "rig_set_level")?,
                rig_get_level: sym(&lib, "rig_get_level")?,
                rig_set_parm: sym(&lib, "rig_set_parm")?,
                rig_get_parm: sym(&lib, "rig_get_parm")?,
                rig_set_func: sym(&lib, "rig_set_func")?,
                rig_get_func: sym(&lib, "rig_get_func")?,
                rig_set_split_freq: sym(&lib, "rig_set_split_freq")?,
                rig_get_split_freq: sym(&lib, "rig_get_split_freq")?,
                rig_set_split_mode: sym(&lib, "rig_set_split_mode")?,
                rig_get_split_mode: sym(&lib, "rig_get_split_mode")?,
                rig_set_split_vfo: sym(&lib, "rig_set_split_vfo")?,
                rig_get_split_vfo: sym(&lib, "rig_get_split_vfo")?,
                rig_set_rit: sym(&lib, "rig_set_rit")?,
                rig_get_rit: sym(&lib, "rig_get_rit")?,
                rig_set_xit: sym(&lib, "rig_set_xit")?,
                rig_get_xit: sym(&lib, "rig_get_xit")?,
                rig_set_ts: sym(&lib, "rig_set_ts")?,
                rig_get_ts: sym(&lib, "rig_get_ts")?,
                rig_set_ctcss_tone: sym(&lib, "rig_set_ctcss_tone")?,
                rig_get_ctcss_tone: sym(&lib, "rig_get_ctcss_tone")?,
                rig_set_dcs_code: sym(&lib, "rig_set_dcs_code")?,
                rig_get_dcs_code: sym(&lib, "rig_get_dcs_code")?,
                rig_set_rptr_shift: sym(&lib, "rig_set_rptr_shift")?,
                rig_get_rptr_shift: sym(&lib, "rig_get_rptr_shift")?,
                rig_set_rptr_offs: sym(&lib, "rig_set_rptr_offs")?,
                rig_get_rptr_offs: sym(&lib, "rig_get_rptr_offs")?,
                rig_set_ant: sym(&lib, "rig_set_ant")?,
                rig_get_ant: sym(&lib, "rig_get_ant")?,
                rig_set_mem: sym(&lib, "rig_set_mem")?,
                rig_get_mem: sym(&lib, "rig_get_mem")?,
                rig_set_bank: sym(&lib, "rig_set_bank")?,
                rig_vfo_op: sym(&lib, "rig_vfo_op")?,
                rig_scan: sym(&lib, "rig_scan")?,
                rig_set_powerstat: sym(&lib, "rig_set_powerstat")?,
                rig_get_powerstat: sym(&lib, "rig_get_powerstat")?,
                rig_reset: sym(&lib, "rig_reset")?,
                rig_send_morse: sym(&lib, "rig_send_morse")?,
                rig_get_info: sym(&lib, "rig_get_info")?,
                rig_version: optional_sym(&lib, "rig_version"),
                rig_copyright: optional_sym(&lib, "rig_copyright"),
                rig_license: optional_sym(&lib, "rig_license"),
                _lib: lib,
            })
        }
    }

    /// Library description of a (negative) status code.
    pub fn error_text(&self, code: c_int) -> Option<String> {
        unsafe { c_string((self.rigerror)(code)) }
    }
}

/// Owned copy of a C string the library returned, `None` for null.
///
/// # Safety
/// `ptr` must be null or point at a NUL-terminated string.
pub unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}
