// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod otlp_emitter;

use super::*;
use crate::api;
use crate::collections::string_table::StringTable;
use crate::delta::DeltaRecord;
use crate::error::ProfileError;
use deltaprof_pprof::{Record, NO_OPT_ZERO, OPT_ZERO};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};
use std::time::{Duration, SystemTime};

/// The interned form of one poll's delta records: deduplicated
/// function/location/mapping/string tables plus, per record, indices into
/// those tables describing its stack. Built once per poll and immutable
/// afterwards, so the pprof and OTLP encoders can consume it concurrently.
pub struct Profile {
    functions: FxIndexSet<Function>,
    locations: FxIndexSet<Location>,
    mappings: FxIndexSet<Mapping>,
    stack_traces: FxIndexSet<StackTrace>,
    strings: StringTable,
    samples: Vec<Sample>,
    sample_types: Box<[ValueType]>,
    period: Option<(i64, ValueType)>,
    upscaling_rules: UpscalingRules,
    no_compression: bool,
    start_time: SystemTime,
    end_time: SystemTime,
}

/// One interned sample: a stack and this interval's values for it.
struct Sample {
    stacktrace: StackTraceId,
    values: Box<[i64]>,
}

/// A fully serialized profile and the time window it covers.
pub struct EncodedProfile {
    pub start: SystemTime,
    pub end: SystemTime,
    pub buffer: Vec<u8>,
}

impl Profile {
    /// Interns the delta records into table form. `mappings` must be the
    /// mapping list of the snapshot the deltas were computed from.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build(
        sample_types: &[OwnedValueType],
        period: Option<&OwnedPeriod>,
        upscaling_rules: UpscalingRules,
        options: api::ProfileOptions,
        deltas: &[DeltaRecord],
        mappings: &[api::Mapping],
        start_time: SystemTime,
        end_time: SystemTime,
    ) -> Result<Self, ProfileError> {
        let mut profile = Self {
            functions: Default::default(),
            locations: Default::default(),
            mappings: Default::default(),
            stack_traces: Default::default(),
            strings: StringTable::new(),
            samples: Vec::with_capacity(deltas.len()),
            sample_types: Box::new([]),
            period: None,
            upscaling_rules,
            no_compression: options.no_compression,
            start_time,
            end_time,
        };

        profile.sample_types = sample_types
            .iter()
            .map(|sample_type| {
                ValueType::new(
                    profile.strings.intern(&sample_type.typ),
                    profile.strings.intern(&sample_type.unit),
                )
            })
            .collect();

        if let Some(OwnedPeriod { typ, value }) = period {
            profile.period = Some((
                *value,
                ValueType::new(
                    profile.strings.intern(&typ.typ),
                    profile.strings.intern(&typ.unit),
                ),
            ));
        }

        let by_id: FxIndexMap<u64, api::Mapping> =
            mappings.iter().map(|mapping| (mapping.id, *mapping)).collect();

        // Eager resolution populates every known mapping up front; lazy
        // resolution leaves the table to fill in on first reference.
        if !options.lazy_mappings {
            for mapping in mappings {
                profile.add_mapping(mapping);
            }
        }

        for delta in deltas {
            let locations = delta
                .stack
                .frames()
                .iter()
                .map(|frame| {
                    let mapping_id = match frame.mapping_id {
                        None => None,
                        Some(id) => {
                            let mapping = by_id.get(&id).ok_or_else(|| {
                                ProfileError::invalid_input(
                                    "delta record references a mapping absent from the snapshot",
                                )
                            })?;
                            Some(profile.add_mapping(mapping))
                        }
                    };
                    let name = profile.strings.intern(&frame.function);
                    let filename = profile.strings.intern(&frame.filename);
                    let function_id = profile.functions.dedup(Function {
                        name,
                        // The runtime only hands us one spelling of the name.
                        system_name: name,
                        filename,
                    });
                    Ok(profile.locations.dedup(Location {
                        mapping_id,
                        function_id,
                        line: frame.line,
                    }))
                })
                .collect::<Result<Vec<_>, ProfileError>>()?;

            let stacktrace = profile.stack_traces.dedup(StackTrace { locations });
            profile.samples.push(Sample {
                stacktrace,
                values: delta.values.clone(),
            });
        }

        Ok(profile)
    }

    fn add_mapping(&mut self, mapping: &api::Mapping) -> MappingId {
        let filename = self.strings.intern(mapping.filename);
        let build_id = self.strings.intern(mapping.build_id);

        self.mappings.dedup(Mapping {
            memory_start: mapping.memory_start,
            memory_limit: mapping.memory_limit,
            file_offset: mapping.file_offset,
            filename,
            build_id,
        })
    }

    fn get_stacktrace(&self, st: StackTraceId) -> Result<&StackTrace, ProfileError> {
        self.stack_traces
            .get_index(st.to_raw_id())
            .ok_or_else(|| ProfileError::invalid_input("stack trace id out of bounds"))
    }

    /// This interval's values for the sample, extrapolated by the profile's
    /// scaling rules. Both encoders go through here, which is what keeps
    /// their decoded magnitudes identical.
    fn scaled_values(&self, sample: &Sample) -> Vec<i64> {
        let mut values = sample.values.to_vec();
        self.upscaling_rules.upscale_values(&mut values);
        values
    }

    fn time_nanos(&self) -> i64 {
        self.start_time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |duration| {
                duration.as_nanos().min(i64::MAX as u128) as i64
            })
    }

    fn duration_nanos(&self) -> i64 {
        self.end_time
            .duration_since(self.start_time)
            // Clocks can be adjusted; don't throw away the profile for it.
            .unwrap_or(Duration::ZERO)
            .as_nanos()
            .min(i64::MAX as u128) as i64
    }

    /// Writes the profile to the sink in the pprof exchange format, gzipped
    /// unless the profiler was configured with `no_compression`. Sink write
    /// failures propagate unchanged; there is no retry here.
    pub fn write_pprof_into<W: Write>(&self, writer: W) -> Result<(), ProfileError> {
        // Serialization happens a few bytes at a time, so buffer writes on
        // their way into the sink or the compressor.
        if self.no_compression {
            let mut writer = io::BufWriter::new(writer);
            self.encode_pprof_into(&mut writer)?;
            writer.flush()?;
        } else {
            let zipper = GzEncoder::new(writer, Compression::default());
            let mut writer = io::BufWriter::new(zipper);
            self.encode_pprof_into(&mut writer)?;
            let zipper = writer
                .into_inner()
                .map_err(|error| ProfileError::Io(error.into_error()))?;
            zipper.finish()?;
        }
        Ok(())
    }

    /// Serializes the profile in the pprof exchange format into an owned
    /// buffer.
    pub fn serialize_into_pprof(&self) -> Result<EncodedProfile, ProfileError> {
        // Delta profiles are small compared to full cumulative dumps, but
        // starting from a page-sized buffer still skips the first few
        // doublings on every poll.
        const INITIAL_PPROF_BUFFER_SIZE: usize = 4 * 1024;

        let mut buffer = Vec::with_capacity(INITIAL_PPROF_BUFFER_SIZE);
        self.write_pprof_into(&mut buffer)?;

        Ok(EncodedProfile {
            start: self.start_time,
            end: self.end_time,
            buffer,
        })
    }

    /// Emits the profile as a sequence of tagged top-level fields. The bits
    /// on the wire are indistinguishable from serializing one monolithic
    /// Profile message, because the top-level message of a protobuf has no
    /// length header.
    fn encode_pprof_into<W: Write>(&self, writer: &mut W) -> Result<(), ProfileError> {
        for sample_type in self.sample_types.iter() {
            Record::<ValueType, 1, NO_OPT_ZERO>::from(*sample_type).encode(writer)?;
        }

        for sample in &self.samples {
            let values = self.scaled_values(sample);
            let location_ids: Vec<u64> = self
                .get_stacktrace(sample.stacktrace)?
                .locations
                .iter()
                .map(LocationId::to_raw_id)
                .collect();
            let item = deltaprof_pprof::Sample {
                location_ids: Record::from(location_ids.as_slice()),
                values: Record::from(values.as_slice()),
            };
            Record::<deltaprof_pprof::Sample, 2, NO_OPT_ZERO>::from(item).encode(writer)?;
        }

        for (offset, mapping) in self.mappings.iter().enumerate() {
            let item = deltaprof_pprof::Mapping {
                id: Record::from(MappingId::from_offset(offset).to_raw_id()),
                memory_start: Record::from(mapping.memory_start),
                memory_limit: Record::from(mapping.memory_limit),
                file_offset: Record::from(mapping.file_offset),
                filename: Record::from(mapping.filename),
                build_id: Record::from(mapping.build_id),
            };
            Record::<deltaprof_pprof::Mapping, 3, NO_OPT_ZERO>::from(item).encode(writer)?;
        }

        for (offset, location) in self.locations.iter().enumerate() {
            let item = deltaprof_pprof::Location {
                id: Record::from(LocationId::from_offset(offset).to_raw_id()),
                mapping_id: Record::from(
                    location.mapping_id.map(|id| id.to_raw_id()).unwrap_or(0),
                ),
                address: Record::default(),
                line: Record::from(deltaprof_pprof::Line {
                    function_id: Record::from(location.function_id.to_raw_id()),
                    lineno: Record::from(location.line),
                }),
            };
            Record::<deltaprof_pprof::Location, 4, NO_OPT_ZERO>::from(item).encode(writer)?;
        }

        for (offset, function) in self.functions.iter().enumerate() {
            let item = deltaprof_pprof::Function {
                id: Record::from(FunctionId::from_offset(offset).to_raw_id()),
                name: Record::from(function.name),
                system_name: Record::from(function.system_name),
                filename: Record::from(function.filename),
            };
            Record::<deltaprof_pprof::Function, 5, NO_OPT_ZERO>::from(item).encode(writer)?;
        }

        for string in self.strings.iter() {
            Record::<&str, 6, NO_OPT_ZERO>::from(string).encode(writer)?;
        }

        Record::<i64, 9, OPT_ZERO>::from(self.time_nanos()).encode(writer)?;
        Record::<i64, 10, OPT_ZERO>::from(self.duration_nanos()).encode(writer)?;
        if let Some((period, period_type)) = self.period {
            Record::<ValueType, 11, NO_OPT_ZERO>::from(period_type).encode(writer)?;
            Record::<i64, 12, OPT_ZERO>::from(period).encode(writer)?;
        }
        Ok(())
    }
}
