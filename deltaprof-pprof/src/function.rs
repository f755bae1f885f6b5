// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Record, StringOffset, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Describes a function, referenced by Line.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Function {
    /// Unique nonzero id for the function.
    pub id: Record<u64, 1, NO_OPT_ZERO>,
    /// Name of the function, in human-readable form if available.
    pub name: Record<StringOffset, 2, OPT_ZERO>,
    /// Name of the function, as identified by the system. For instance,
    /// it can be a C++ mangled name.
    pub system_name: Record<StringOffset, 3, OPT_ZERO>,
    /// Source file containing the function.
    pub filename: Record<StringOffset, 4, OPT_ZERO>,
}

impl Value for Function {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.name.proto_len()
            + self.system_name.proto_len()
            + self.filename.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.name.encode(writer)?;
        self.system_name.encode(writer)?;
        self.filename.encode(writer)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Function> for crate::prost_impls::Function {
    fn from(function: &Function) -> Self {
        Self {
            id: function.id.value,
            name: function.name.value.into(),
            system_name: function.system_name.value.into(),
            filename: function.filename.value.into(),
        }
    }
}

#[cfg(feature = "prost_impls")]
impl From<Function> for crate::prost_impls::Function {
    fn from(function: Function) -> Self {
        Self::from(&function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(function: &Function) {
        let prost_function = prost_impls::Function::from(function);
        let mut buffer = Vec::with_capacity(function.proto_len() as usize);
        function.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::Function::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_function, roundtrip);
    }

    #[test]
    fn roundtrip() {
        test(&Function::default());

        let one = StringOffset::try_from(1usize).unwrap();
        let two = StringOffset::try_from(2usize).unwrap();
        test(&Function {
            id: Record::from(1),
            name: Record::from(one),
            system_name: Record::from(one),
            filename: Record::from(two),
        });
        test(&Function {
            id: Record::from(u64::MAX),
            name: Record::from(StringOffset::try_from(u32::MAX as usize).unwrap()),
            system_name: Record::default(),
            filename: Record::default(),
        });
    }
}
