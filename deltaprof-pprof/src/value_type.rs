// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Record, StringOffset, Value, WireType, OPT_ZERO};
use std::io::{self, Write};

/// ValueType describes the semantics and measurement units of a value.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ValueType {
    pub r#type: Record<StringOffset, 1, OPT_ZERO>,
    pub unit: Record<StringOffset, 2, OPT_ZERO>,
}

impl ValueType {
    pub fn new(r#type: StringOffset, unit: StringOffset) -> Self {
        Self {
            r#type: r#type.into(),
            unit: unit.into(),
        }
    }
}

impl Value for ValueType {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.r#type.proto_len() + self.unit.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.r#type.encode(writer)?;
        self.unit.encode(writer)
    }
}

#[cfg(feature = "prost_impls")]
impl From<ValueType> for crate::prost_impls::ValueType {
    fn from(value: ValueType) -> Self {
        Self::from(&value)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&ValueType> for crate::prost_impls::ValueType {
    fn from(value: &ValueType) -> Self {
        Self {
            r#type: value.r#type.value.into(),
            unit: value.unit.value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(value_type: &ValueType) {
        let prost_value_type = prost_impls::ValueType::from(value_type);
        assert_eq!(i64::from(value_type.r#type.value), prost_value_type.r#type);
        assert_eq!(i64::from(value_type.unit.value), prost_value_type.unit);

        let mut buffer = Vec::with_capacity(value_type.proto_len() as usize);
        value_type.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::ValueType::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_value_type, roundtrip);
    }

    #[test]
    fn roundtrip() {
        test(&ValueType::default());
        test(&ValueType::new(
            StringOffset::try_from(1usize).unwrap(),
            StringOffset::try_from(2usize).unwrap(),
        ));
        test(&ValueType::new(
            StringOffset::try_from(u32::MAX as usize).unwrap(),
            StringOffset::ZERO,
        ));
    }
}
