// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! C struct layout arithmetic for a given data model.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    pub fn bytes(self) -> usize {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }
}

/// Sizes and alignments of the C scalar types a struct layout depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DataModel {
    pub name: &'static str,
    pub pointer: PointerWidth,
    /// `sizeof(long)`, which is also its alignment.
    pub long_size: usize,
    /// `alignof(double)` inside structs.
    pub double_align: usize,
}

impl DataModel {
    /// 32-bit x86 System V: doubles are only 4-byte aligned inside structs.
    pub const ILP32: Self = Self {
        name: "ILP32",
        pointer: PointerWidth::Bits32,
        long_size: 4,
        double_align: 4,
    };

    /// 32-bit Windows and 32-bit ARM.
    pub const ILP32_ALIGN8: Self = Self {
        name: "ILP32-align8",
        pointer: PointerWidth::Bits32,
        long_size: 4,
        double_align: 8,
    };

    /// 64-bit Unix.
    pub const LP64: Self = Self {
        name: "LP64",
        pointer: PointerWidth::Bits64,
        long_size: 8,
        double_align: 8,
    };

    /// 64-bit Windows: pointers widen, `long` stays 32-bit.
    pub const LLP64: Self = Self {
        name: "LLP64",
        pointer: PointerWidth::Bits64,
        long_size: 4,
        double_align: 8,
    };

    /// Data model of the running process.
    pub fn host() -> Self {
        if cfg!(all(target_pointer_width = "64", windows)) {
            Self::LLP64
        } else if cfg!(target_pointer_width = "64") {
            Self::LP64
        } else if cfg!(all(target_arch = "x86", not(windows))) {
            Self::ILP32
        } else {
            Self::ILP32_ALIGN8
        }
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer.bytes()
    }
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Shape of one C struct member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Short,
    Int,
    UInt,
    Long,
    ULong,
    Double,
    Ptr,
    Array(&'static FieldKind, usize),
    Struct(&'static [FieldDef]),
}

impl FieldKind {
    pub fn size(&self, model: &DataModel) -> usize {
        match self {
            Self::Short => 2,
            Self::Int | Self::UInt => 4,
            Self::Long | Self::ULong => model.long_size,
            Self::Double => 8,
            Self::Ptr => model.pointer_size(),
            Self::Array(elem, n) => elem.size(model) * n,
            Self::Struct(fields) => StructLayout::compute(fields, model).size,
        }
    }

    pub fn align(&self, model: &DataModel) -> usize {
        match self {
            Self::Short => 2,
            Self::Int | Self::UInt => 4,
            Self::Long | Self::ULong => model.long_size,
            Self::Double => model.double_align,
            Self::Ptr => model.pointer_size(),
            Self::Array(elem, _) => elem.align(model),
            Self::Struct(fields) => fields
                .iter()
                .map(|f| f.kind.align(model))
                .max()
                .unwrap_or(1),
        }
    }
}

/// Named struct member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A member placed at its computed offset.
#[derive(Debug, Clone, Copy)]
pub struct FieldSlot {
    pub name: &'static str,
    pub kind: FieldKind,
    pub offset: usize,
}

/// Offsets of every member of a struct under one data model.
#[derive(Debug, Clone)]
pub struct StructLayout {
    pub fields: Vec<FieldSlot>,
    pub size: usize,
    pub align: usize,
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

impl StructLayout {
    /// Lay out `fields` in declaration order using C rules: every member at
    /// its natural alignment, the struct aligned to its strictest member and
    /// padded to a multiple of that.
    pub fn compute(fields: &[FieldDef], model: &DataModel) -> Self {
        let mut offset = 0;
        let mut max_align = 1;
        let mut slots = Vec::with_capacity(fields.len());
        for field in fields {
            let align = field.kind.align(model);
            offset = align_up(offset, align);
            slots.push(FieldSlot {
                name: field.name,
                kind: field.kind,
                offset,
            });
            offset += field.kind.size(model);
            max_align = max_align.max(align);
        }
        Self {
            fields: slots,
            size: align_up(offset, max_align),
            align: max_align,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.field(name).map(|f| f.offset)
    }

    /// Offset of element `index` of the array member `name`.
    pub fn element_offset(&self, name: &str, index: usize, model: &DataModel) -> Option<usize> {
        let slot = self.field(name)?;
        match slot.kind {
            FieldKind::Array(elem, n) if index < n => Some(slot.offset + index * elem.size(model)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: [FieldDef; 4] = [
        FieldDef::new("flag", FieldKind::Short),
        FieldDef::new("count", FieldKind::Long),
        FieldDef::new("freq", FieldKind::Double),
        FieldDef::new("tail", FieldKind::Int),
    ];

    #[test]
    fn test_layout_per_data_model() {
        let lp64 = StructLayout::compute(&MIXED, &DataModel::LP64);
        assert_eq!(lp64.offset_of("count"), Some(8));
        assert_eq!(lp64.offset_of("freq"), Some(16));
        assert_eq!(lp64.offset_of("tail"), Some(24));
        assert_eq!(lp64.size, 32);

        let llp64 = StructLayout::compute(&MIXED, &DataModel::LLP64);
        assert_eq!(llp64.offset_of("count"), Some(4));
        assert_eq!(llp64.offset_of("freq"), Some(8));
        assert_eq!(llp64.size, 24);

        let ilp32 = StructLayout::compute(&MIXED, &DataModel::ILP32);
        assert_eq!(ilp32.offset_of("freq"), Some(8));
        assert_eq!(ilp32.offset_of("tail"), Some(16));
        assert_eq!(ilp32.size, 20);
        assert_eq!(ilp32.align, 4);
    }

    #[test]
    fn test_nested_array_offsets() {
        const INNER: [FieldDef; 2] = [
            FieldDef::new("start", FieldKind::Double),
            FieldDef::new("modes", FieldKind::UInt),
        ];
        const RANGE: FieldKind = FieldKind::Struct(&INNER);
        const OUTER: [FieldDef; 2] = [
            FieldDef::new("id", FieldKind::Int),
            FieldDef::new("ranges", FieldKind::Array(&RANGE, 3)),
        ];

        let layout = StructLayout::compute(&OUTER, &DataModel::LP64);
        assert_eq!(layout.offset_of("ranges"), Some(8));
        assert_eq!(layout.element_offset("ranges", 2, &DataModel::LP64), Some(40));
        assert_eq!(layout.element_offset("ranges", 3, &DataModel::LP64), None);
        assert_eq!(layout.size, 56);

        let packed = StructLayout::compute(&OUTER, &DataModel::ILP32);
        assert_eq!(packed.offset_of("ranges"), Some(4));
        assert_eq!(packed.size, 40);
    }
}
