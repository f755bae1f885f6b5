// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Record, StringOffset, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Describes the mapping of a binary in memory, including its address range
/// and build identity.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Mapping {
    /// Unique nonzero id for the mapping.
    pub id: Record<u64, 1, NO_OPT_ZERO>,
    /// Address at which the binary (or DLL) is loaded into memory.
    pub memory_start: Record<u64, 2, OPT_ZERO>,
    /// The limit of the address range occupied by this mapping.
    pub memory_limit: Record<u64, 3, OPT_ZERO>,
    /// Offset in the binary that corresponds to the first mapped address.
    pub file_offset: Record<u64, 4, OPT_ZERO>,
    /// The object this entry is loaded from.
    pub filename: Record<StringOffset, 5, OPT_ZERO>,
    /// A string that uniquely identifies a particular program version with
    /// high probability, e.g. a GNU build id.
    pub build_id: Record<StringOffset, 6, OPT_ZERO>,
}

impl Value for Mapping {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.memory_start.proto_len()
            + self.memory_limit.proto_len()
            + self.file_offset.proto_len()
            + self.filename.proto_len()
            + self.build_id.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.memory_start.encode(writer)?;
        self.memory_limit.encode(writer)?;
        self.file_offset.encode(writer)?;
        self.filename.encode(writer)?;
        self.build_id.encode(writer)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Mapping> for crate::prost_impls::Mapping {
    fn from(mapping: &Mapping) -> Self {
        Self {
            id: mapping.id.value,
            memory_start: mapping.memory_start.value,
            memory_limit: mapping.memory_limit.value,
            file_offset: mapping.file_offset.value,
            filename: mapping.filename.value.into(),
            build_id: mapping.build_id.value.into(),
        }
    }
}

#[cfg(feature = "prost_impls")]
impl From<Mapping> for crate::prost_impls::Mapping {
    fn from(mapping: Mapping) -> Self {
        Self::from(&mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(mapping: &Mapping) {
        let prost_mapping = prost_impls::Mapping::from(mapping);
        let mut buffer = Vec::with_capacity(mapping.proto_len() as usize);
        mapping.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::Mapping::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_mapping, roundtrip);
    }

    #[test]
    fn roundtrip() {
        test(&Mapping::default());

        let max_offset = StringOffset::try_from(u32::MAX as usize).unwrap();
        test(&Mapping {
            id: Record::from(u64::MAX),
            memory_start: Record::from(u64::MAX),
            memory_limit: Record::from(u64::MAX),
            file_offset: Record::from(u64::MAX),
            filename: Record::from(max_offset),
            build_id: Record::from(max_offset),
        });
    }
}
