// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Value, WireType};
use std::io::{self, Write};
use std::num::TryFromIntError;

/// An offset into a string table. The table is dense, so a 32-bit number is
/// plenty, and it halves the size of many structs compared to a 64-bit one.
/// On the wire it is an int64, like all pprof string indices.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StringOffset(u32);

impl StringOffset {
    /// The offset of the empty string, which is always the first entry of a
    /// string table.
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The zero-based offset into the string table.
    #[inline]
    pub fn to_offset(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for StringOffset {
    type Error = TryFromIntError;

    fn try_from(offset: usize) -> Result<Self, Self::Error> {
        Ok(Self(u32::try_from(offset)?))
    }
}

impl From<StringOffset> for i64 {
    fn from(offset: StringOffset) -> i64 {
        i64::from(offset.0)
    }
}

impl From<&StringOffset> for i64 {
    fn from(offset: &StringOffset) -> i64 {
        i64::from(offset.0)
    }
}

impl From<StringOffset> for u64 {
    fn from(offset: StringOffset) -> u64 {
        u64::from(offset.0)
    }
}

impl Value for StringOffset {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_len(&self) -> u64 {
        u64::from(*self).proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        u64::from(*self).encode(writer)
    }
}

/// String table entries are stored as length-delimited utf-8 bytes.
impl Value for &str {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.len() as u64
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.as_bytes())
    }
}
