// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Record, Value, WireType, NO_OPT_ZERO};
use std::io::{self, Write};

/// Each Sample records values encountered in some program context. The
/// program context is a stack trace.
///
/// It borrows its data but requires it to be a slice. An iterator wouldn't
/// work well because we have to walk over the fields twice: once to calculate
/// the length, and once to encode it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Sample<'a> {
    /// The ids recorded here correspond to a Profile.location.id.
    /// The leaf is at location_ids\[0\].
    pub location_ids: Record<&'a [u64], 1, NO_OPT_ZERO>,
    /// The type and unit of each value is defined by the corresponding entry
    /// in Profile.sample_type. All samples must have the same number of
    /// values, the same as the length of Profile.sample_type.
    pub values: Record<&'a [i64], 2, NO_OPT_ZERO>,
}

impl Value for Sample<'_> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.location_ids.proto_len() + self.values.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.location_ids.encode(writer)?;
        self.values.encode(writer)
    }
}

#[cfg(feature = "prost_impls")]
impl From<Sample<'_>> for crate::prost_impls::Sample {
    fn from(sample: Sample) -> Self {
        Self {
            location_ids: Vec::from_iter(sample.location_ids.value.iter().copied()),
            values: Vec::from_iter(sample.values.value.iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use proptest::prelude::*;
    use prost::Message;

    #[test]
    fn empty() {
        let sample = Sample {
            location_ids: [].as_slice().into(),
            values: [].as_slice().into(),
        };
        let prost_sample = prost_impls::Sample {
            location_ids: vec![],
            values: vec![],
        };

        let len = sample.proto_len() as usize;
        let mut buffer = Vec::with_capacity(len);
        sample.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::Sample::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_sample, roundtrip);
    }

    proptest! {
        #[test]
        fn roundtrip(
            location_ids in proptest::collection::vec(any::<u64>(), 0..64),
            values in proptest::collection::vec(any::<i64>(), 0..8),
        ) {
            let sample = Sample {
                location_ids: Record::from(location_ids.as_slice()),
                values: Record::from(values.as_slice()),
            };
            let prost_sample = prost_impls::Sample::from(sample);

            let mut buffer = Vec::with_capacity(sample.proto_len() as usize);
            sample.encode(&mut buffer).unwrap();
            let roundtrip = prost_impls::Sample::decode(buffer.as_slice()).unwrap();
            prop_assert_eq!(&prost_sample, &roundtrip);

            let mut buffer2 = Vec::with_capacity(prost_sample.encoded_len());
            prost_sample.encode(&mut buffer2).unwrap();
            let roundtrip2 = prost_impls::Sample::decode(buffer2.as_slice()).unwrap();
            prop_assert_eq!(roundtrip, roundtrip2);
        }
    }
}
