// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Native capability block layouts and their runtime detection.

pub mod decode;
pub mod layout;
pub mod resolver;
pub mod tables;

#[cfg(test)]
pub(crate) mod testing;

pub use decode::{decode_caps, BlockReader, CapsLayout};
pub use layout::{DataModel, FieldDef, FieldKind, PointerWidth, StructLayout};
pub use resolver::{caps_address_from_rig, resolve, AbiCache, AbiProfile};
pub use tables::LibraryGeneration;
