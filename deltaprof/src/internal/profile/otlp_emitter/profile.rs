// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::collections::identifiable::Id;
use crate::internal::{EncodedProfile, Profile};
use crate::ProfileError;
use deltaprof_otlp::AggregationTemporality;

impl Profile {
    /// Converts the profile into the OTLP experimental message structure.
    /// The value vectors are scaled exactly as the pprof encoder scales
    /// them, so decoded magnitudes compare bit-for-bit across formats.
    pub fn emit_otlp(&self) -> Result<deltaprof_otlp::Profile, ProfileError> {
        let sample_type = self
            .sample_types
            .iter()
            .map(|sample_type| deltaprof_otlp::ValueType {
                type_strindex: sample_type.r#type.value.into(),
                unit_strindex: sample_type.unit.value.into(),
                aggregation_temporality: AggregationTemporality::Delta as i32,
            })
            .collect();

        let mut location_indices = Vec::new();
        let mut samples = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            let stack = self.get_stacktrace(sample.stacktrace)?;
            let start = location_indices.len() as u64;
            location_indices.extend(
                stack
                    .locations
                    .iter()
                    .map(|location_id| location_id.to_raw_id() as i64),
            );
            samples.push(deltaprof_otlp::Sample {
                locations_start_index: start,
                locations_length: stack.locations.len() as u64,
                value: self.scaled_values(sample),
            });
        }

        let (period, period_type) = match self.period {
            Some((value, value_type)) => (
                value,
                Some(deltaprof_otlp::ValueType {
                    type_strindex: value_type.r#type.value.into(),
                    unit_strindex: value_type.unit.value.into(),
                    aggregation_temporality: AggregationTemporality::Delta as i32,
                }),
            ),
            None => (0, None),
        };

        Ok(deltaprof_otlp::Profile {
            sample_type,
            sample: samples,
            mapping: self.mappings.iter().map(deltaprof_otlp::Mapping::from).collect(),
            location: self
                .locations
                .iter()
                .map(deltaprof_otlp::Location::from)
                .collect(),
            location_indices,
            function: self
                .functions
                .iter()
                .map(deltaprof_otlp::Function::from)
                .collect(),
            string_table: self.strings.iter().map(str::to_owned).collect(),
            time_nanos: self.time_nanos(),
            duration_nanos: self.duration_nanos(),
            period_type,
            period,
            default_sample_type: 0,
        })
    }

    /// Serializes the profile into OTLP protobuf bytes.
    pub fn serialize_into_otlp(&self) -> Result<EncodedProfile, ProfileError> {
        let buffer = self.emit_otlp()?.serialize_into_proto();
        Ok(EncodedProfile {
            start: self.start_time,
            end: self.end_time,
            buffer,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{Frame, ProfileOptions, Record, Snapshot, ValueType};
    use crate::DeltaProfiler;
    use deltaprof_otlp::AggregationTemporality;

    #[test]
    fn emitted_tables_reference_each_other() {
        let sample_types = [
            ValueType::new("contentions", "count"),
            ValueType::new("delay", "nanoseconds"),
        ];
        let mut profiler =
            DeltaProfiler::new(&sample_types, None, ProfileOptions::default()).unwrap();

        let frames = [
            Frame {
                function: "lock_wait",
                filename: "sync.rs",
                line: 12,
                mapping_id: None,
            },
            Frame {
                function: "worker",
                filename: "pool.rs",
                line: 88,
                mapping_id: None,
            },
        ];
        let records = [Record {
            frames: &frames,
            values: &[4, 9000],
        }];
        let snapshot = Snapshot {
            records: &records,
            mappings: &[],
        };

        let outcome = profiler.poll(&snapshot);
        let profile = profiler.build_profile(&outcome, &snapshot).unwrap();
        let otlp = profile.emit_otlp().unwrap();

        assert_eq!(otlp.sample_type.len(), 2);
        assert_eq!(
            otlp.sample_type[0].aggregation_temporality,
            AggregationTemporality::Delta as i32
        );

        assert_eq!(otlp.sample.len(), 1);
        let sample = &otlp.sample[0];
        assert_eq!(sample.value, vec![4, 9000]);
        assert_eq!(sample.locations_length, 2);

        // Walk sample -> location_indices -> location -> function -> string.
        let window = &otlp.location_indices[sample.locations_start_index as usize
            ..(sample.locations_start_index + sample.locations_length) as usize];
        let leaf = &otlp.location[window[0] as usize - 1];
        let leaf_function = &otlp.function[leaf.line[0].function_index as usize - 1];
        assert_eq!(
            otlp.string_table[leaf_function.name_strindex as usize],
            "lock_wait"
        );

        // The string table starts with the empty string.
        assert_eq!(otlp.string_table[0], "");
    }

    #[test]
    fn serializes_to_decodable_bytes() {
        use prost::Message;

        let sample_types = [ValueType::new("alloc_objects", "count")];
        let mut profiler =
            DeltaProfiler::new(&sample_types, None, ProfileOptions::default()).unwrap();

        let frames = [Frame {
            function: "a",
            filename: "app.rs",
            line: 1,
            mapping_id: None,
        }];
        let records = [Record {
            frames: &frames,
            values: &[3],
        }];
        let snapshot = Snapshot {
            records: &records,
            mappings: &[],
        };

        let outcome = profiler.poll(&snapshot);
        let profile = profiler.build_profile(&outcome, &snapshot).unwrap();
        let encoded = profile.serialize_into_otlp().unwrap();
        let decoded = deltaprof_otlp::Profile::decode(encoded.buffer.as_slice()).unwrap();
        assert_eq!(decoded.sample.len(), 1);
        assert_eq!(decoded.sample[0].value, vec![3]);
    }
}
