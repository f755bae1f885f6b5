// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! A deterministic record source for the integration suites. The generator
//! must be bit-stable across platforms so failures reproduce, which is why
//! it carries its own tiny RNG instead of pulling one in.

use deltaprof::api::{Frame, Mapping, Record, Snapshot};

/// SplitMix64. Deterministic, seedable, and good enough to shuffle test
/// stacks.
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

struct FrameTemplate {
    name_index: usize,
    filename_index: usize,
    line: i64,
    mapping_id: Option<u64>,
}

/// Owns a fixed set of synthetic stacks and their cumulative values, and
/// lends them out as one [`Snapshot`] per poll.
pub struct RecordSet {
    pub rng: SplitMix64,
    names: Vec<String>,
    filenames: Vec<String>,
    stacks: Vec<Vec<FrameTemplate>>,
    values: Vec<Vec<i64>>,
    /// How much each value column grows per mutation step.
    increments: Vec<i64>,
    mappings: Vec<MappingTemplate>,
}

struct MappingTemplate {
    id: u64,
    memory_start: u64,
    memory_limit: u64,
    filename: String,
    build_id: String,
}

/// Function name pool size. Small enough that stacks share frames, which is
/// what exercises the interner.
const NAME_POOL: usize = 256;

impl RecordSet {
    pub fn new(seed: u64, stack_count: usize, stack_depth: usize, increments: &[i64]) -> Self {
        let mut rng = SplitMix64::new(seed);

        let names: Vec<String> = (0..NAME_POOL)
            .map(|i| {
                if i % 8 == 0 {
                    // A generic instantiation; normalization collapses the
                    // bracketed suffix.
                    format!("pkg.func_{:03}[shape_{}]", i, i % 3)
                } else {
                    format!("pkg.func_{i:03}")
                }
            })
            .collect();
        let filenames: Vec<String> = (0..16).map(|i| format!("src/mod_{i:02}.rs")).collect();

        // Two of these are referenced by frames below; the others exist only
        // in the snapshot's mapping list, so lazy resolution skips them.
        let mappings = (1u64..=4)
            .map(|id| MappingTemplate {
                id,
                memory_start: id * 0x10_0000,
                memory_limit: (id + 1) * 0x10_0000,
                filename: format!("/usr/lib/lib_{id}.so"),
                build_id: format!("build-{id:016x}"),
            })
            .collect();

        let stacks = (0..stack_count)
            .map(|_| {
                (0..stack_depth)
                    .map(|_| {
                        let name_index = rng.below(NAME_POOL as u64) as usize;
                        FrameTemplate {
                            name_index,
                            filename_index: name_index % 16,
                            line: 1 + (name_index as i64 % 97),
                            mapping_id: match name_index % 4 {
                                0 => Some(1),
                                1 => Some(2),
                                _ => None,
                            },
                        }
                    })
                    .collect()
            })
            .collect();

        let values = (0..stack_count)
            .map(|_| {
                increments
                    .iter()
                    .map(|increment| (1 + rng.below(16) as i64) * increment)
                    .collect()
            })
            .collect();

        Self {
            rng,
            names,
            filenames,
            stacks,
            values,
            increments: increments.to_vec(),
            mappings,
        }
    }

    /// Grows the cumulative values of `n` randomly chosen stacks. Values
    /// only ever grow, like real counters between resets.
    pub fn mutate(&mut self, n: usize) {
        for _ in 0..n {
            let stack = self.rng.below(self.stacks.len() as u64) as usize;
            for (column, increment) in self.increments.iter().enumerate() {
                self.values[stack][column] += (1 + self.rng.below(8) as i64) * increment;
            }
        }
    }

    /// Borrows the current cumulative state as one poll's snapshot. The
    /// frames are rebuilt per call; their contents are stable.
    pub fn frames(&self) -> Vec<Vec<Frame<'_>>> {
        self.stacks
            .iter()
            .map(|stack| {
                stack
                    .iter()
                    .map(|frame| Frame {
                        function: &self.names[frame.name_index],
                        filename: &self.filenames[frame.filename_index],
                        line: frame.line,
                        mapping_id: frame.mapping_id,
                    })
                    .collect()
            })
            .collect()
    }

    pub fn records<'a>(&'a self, frames: &'a [Vec<Frame<'a>>]) -> Vec<Record<'a>> {
        frames
            .iter()
            .zip(self.values.iter())
            .map(|(frames, values)| Record {
                frames: frames.as_slice(),
                values: values.as_slice(),
            })
            .collect()
    }

    pub fn mappings(&self) -> Vec<Mapping<'_>> {
        self.mappings
            .iter()
            .map(|mapping| Mapping {
                id: mapping.id,
                memory_start: mapping.memory_start,
                memory_limit: mapping.memory_limit,
                file_offset: 0,
                filename: &mapping.filename,
                build_id: &mapping.build_id,
            })
            .collect()
    }
}

/// Renders an OTLP sample's stack as `leaf;...;root` function names.
pub fn otlp_sample_stack_to_string(
    profile: &deltaprof_otlp::Profile,
    sample: &deltaprof_otlp::Sample,
) -> String {
    let start = sample.locations_start_index as usize;
    let end = start + sample.locations_length as usize;
    let mut names = Vec::with_capacity(end - start);
    for location_index in &profile.location_indices[start..end] {
        // Location references are one-based ids.
        let location = &profile.location[*location_index as usize - 1];
        let function = &profile.function[location.line[0].function_index as usize - 1];
        names.push(profile.string_table[function.name_strindex as usize].as_str());
    }
    names.join(";")
}

/// Builds the Snapshot for the borrowed parts of a poll.
pub fn snapshot<'a>(records: &'a [Record<'a>], mappings: &'a [Mapping<'a>]) -> Snapshot<'a> {
    Snapshot { records, mappings }
}
