// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod abi;
pub mod error;
pub mod radio;
pub mod registry;
pub mod rig;
pub mod session;

pub use abi::{AbiCache, AbiProfile, DataModel, LibraryGeneration, PointerWidth};
pub use error::{NativeResult, NativeStatus, RigError, RigResult};
pub use registry::{RigProvider, RigRegistry};
pub use rig::caps::CapabilitySet;
pub use rig::native::{NativeMemory, NativeRig};
pub use rig::types::{PttState, RigMode, Vfo};
pub use session::{CachedState, RigSession, SessionConfig};
