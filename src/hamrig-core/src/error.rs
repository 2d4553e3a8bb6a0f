// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Error type returned by session, registry and decoder operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum RigError {
    /// A native call returned a nonzero status.
    #[error("{description} (status {code})")]
    NativeCallFailed { code: i32, description: String },

    /// None of the known capability layouts matched the loaded library.
    #[error("unsupported or incompatible native library version")]
    UnsupportedLibraryVersion,

    /// Model name lookup miss.
    #[error("rig model not found: {0}")]
    DeviceNotFound(String),

    /// The device could not be opened (including an exhausted baud search).
    #[error("open failed: {0}")]
    OpenFailed(String),

    /// The session closed itself after too many consecutive failures.
    #[error("communication with rig lost")]
    CommunicationLost,

    /// The operation is not allowed in the current session state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The native library could not be loaded, or memory it returned was unreadable.
    #[error("native library: {0}")]
    Library(String),

    /// A worker thread could not be spawned.
    #[error("failed to spawn {0}")]
    Spawn(String),
}

pub type RigResult<T> = Result<T, RigError>;

impl RigError {
    pub fn native(status: NativeStatus, description: impl Into<String>) -> Self {
        Self::NativeCallFailed {
            code: status.code(),
            description: description.into(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn library(msg: impl Into<String>) -> Self {
        Self::Library(msg.into())
    }

    /// The native status carried by this error, if it came from a native call.
    pub fn native_status(&self) -> Option<NativeStatus> {
        match self {
            Self::NativeCallFailed { code, .. } => Some(NativeStatus::from_code(*code)),
            _ => None,
        }
    }
}

/// Status codes returned by the native library (`-code` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NativeStatus {
    InvalidParameter,
    InvalidConfiguration,
    NoMemory,
    NotImplemented,
    Timeout,
    Io,
    Internal,
    Protocol,
    Rejected,
    ArgTruncated,
    NotAvailable,
    VfoNotTargetable,
    BusError,
    BusBusy,
    InvalidHandle,
    InvalidVfo,
    Domain,
    Unknown(i32),
}

pub type NativeResult<T> = Result<T, NativeStatus>;

impl NativeStatus {
    const TABLE: [NativeStatus; 17] = [
        Self::InvalidParameter,
        Self::InvalidConfiguration,
        Self::NoMemory,
        Self::NotImplemented,
        Self::Timeout,
        Self::Io,
        Self::Internal,
        Self::Protocol,
        Self::Rejected,
        Self::ArgTruncated,
        Self::NotAvailable,
        Self::VfoNotTargetable,
        Self::BusError,
        Self::BusBusy,
        Self::InvalidHandle,
        Self::InvalidVfo,
        Self::Domain,
    ];

    /// Positive error number as enumerated by the native library.
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown(code) => code,
            known => Self::TABLE
                .iter()
                .position(|s| *s == known)
                .map(|idx| idx as i32 + 1)
                .unwrap_or(0),
        }
    }

    /// Build from either sign of the error number.
    pub fn from_code(code: i32) -> Self {
        let idx = code.unsigned_abs() as usize;
        if idx >= 1 && idx <= Self::TABLE.len() {
            Self::TABLE[idx - 1]
        } else {
            Self::Unknown(code.saturating_abs())
        }
    }

    /// Convert a raw native return value (0 = success, negative = error).
    pub fn check(ret: i32) -> NativeResult<()> {
        if ret == 0 {
            Ok(())
        } else {
            Err(Self::from_code(ret))
        }
    }

    /// Text used when the native library cannot describe the status itself.
    pub fn fallback_text(self) -> &'static str {
        match self {
            Self::InvalidParameter => "Invalid parameter",
            Self::InvalidConfiguration => "Invalid configuration (serial,..)",
            Self::NoMemory => "Memory shortage",
            Self::NotImplemented => "Feature not implemented",
            Self::Timeout => "Communication timed out",
            Self::Io => "IO error, including open failed",
            Self::Internal => "Internal Hamlib error, huh!",
            Self::Protocol => "Protocol error",
            Self::Rejected => "Command rejected by the rig",
            Self::ArgTruncated => "Command performed, but arg truncated",
            Self::NotAvailable => "Function not available",
            Self::VfoNotTargetable => "VFO not targetable",
            Self::BusError => "Error talking on the bus",
            Self::BusBusy => "Collision on the bus",
            Self::InvalidHandle => "NULL RIG handle or any invalid pointer parameter in get arg",
            Self::InvalidVfo => "Invalid VFO",
            Self::Domain => "Argument out of domain of func",
            Self::Unknown(_) => "Unknown error",
        }
    }
}

impl fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fallback_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip_both_signs() {
        assert_eq!(NativeStatus::from_code(-6), NativeStatus::Io);
        assert_eq!(NativeStatus::from_code(6), NativeStatus::Io);
        assert_eq!(NativeStatus::Io.code(), 6);
        assert_eq!(NativeStatus::Domain.code(), 17);
        assert_eq!(NativeStatus::from_code(-99), NativeStatus::Unknown(99));
    }

    #[test]
    fn test_check() {
        assert!(NativeStatus::check(0).is_ok());
        assert_eq!(NativeStatus::check(-5), Err(NativeStatus::Timeout));
    }

    #[test]
    fn test_extreme_codes_do_not_overflow() {
        assert_eq!(
            NativeStatus::from_code(i32::MIN),
            NativeStatus::Unknown(i32::MAX)
        );
        assert_eq!(
            NativeStatus::check(i32::MIN),
            Err(NativeStatus::Unknown(i32::MAX))
        );
    }

    #[test]
    fn test_native_error_carries_code_and_text() {
        let err = RigError::native(NativeStatus::Timeout, "Communication timed out");
        assert_eq!(err.native_status(), Some(NativeStatus::Timeout));
        assert_eq!(err.to_string(), "Communication timed out (status 5)");
        assert_eq!(RigError::CommunicationLost.native_status(), None);
    }
}
