// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Borrowed input types the record source fills once per poll. Nothing here
//! is retained past the poll that received it; the tracker and interner copy
//! what they need into owned storage.

use crate::error::ProfileError;

/// The type and unit of one value column, e.g. `alloc_space`/`bytes`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ValueType<'a> {
    pub r#type: &'a str,
    pub unit: &'a str,
}

impl<'a> ValueType<'a> {
    pub fn new(r#type: &'a str, unit: &'a str) -> Self {
        Self { r#type, unit }
    }
}

/// The sampling period of the profile, e.g. one sample per 512 KiB allocated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Period<'a> {
    pub r#type: ValueType<'a>,
    pub value: i64,
}

/// One frame of a call stack. The function name may carry a bracketed
/// generic-instantiation suffix (`run[shape]`), which the tracker
/// canonicalizes when `ProfileOptions::generics_frames` is set.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Frame<'a> {
    pub function: &'a str,
    pub filename: &'a str,
    pub line: i64,
    /// References a [Mapping::id] in the same snapshot.
    pub mapping_id: Option<u64>,
}

/// One cumulative record: a stack and the activity counted against it since
/// program start (or the last counter reset). The leaf frame is first.
#[derive(Copy, Clone, Debug)]
pub struct Record<'a> {
    pub frames: &'a [Frame<'a>],
    pub values: &'a [i64],
}

/// A binary mapped into the process. `filename` and `build_id` are the
/// auxiliary fields that lazy resolution defers until a sample references
/// the mapping.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Mapping<'a> {
    pub id: u64,
    pub memory_start: u64,
    pub memory_limit: u64,
    pub file_offset: u64,
    pub filename: &'a str,
    pub build_id: &'a str,
}

/// The full current-cumulative state supplied by the record source for one
/// poll.
#[derive(Copy, Clone, Debug, Default)]
pub struct Snapshot<'a> {
    pub records: &'a [Record<'a>],
    pub mappings: &'a [Mapping<'a>],
}

/// Behavior-altering options, fixed at construction and threaded explicitly
/// through the tracker and both encoders.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileOptions {
    /// Canonicalize generic-instantiation frame names to a shared base name
    /// before delta tracking and interning.
    pub generics_frames: bool,
    /// Only resolve a mapping's auxiliary fields when a sample in the
    /// current pass references it.
    pub lazy_mappings: bool,
    /// Skip gzip on the pprof output.
    pub no_compression: bool,
}

/// Describes how to extrapolate sampled values back to their real magnitude.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UpscalingInfo {
    /// Multiply by a constant factor.
    Proportional { scale: f64 },
    /// Poisson sampling correction: with avg = sum/count, the scale is
    /// 1 / (1 - exp(-avg / sampling_distance)).
    Poisson {
        sum_value_offset: usize,
        count_value_offset: usize,
        sampling_distance: i64,
    },
}

impl UpscalingInfo {
    pub(crate) fn check_validity(&self, value_count: usize) -> Result<(), ProfileError> {
        match self {
            UpscalingInfo::Proportional { scale } => {
                if !scale.is_finite() {
                    return Err(ProfileError::configuration(
                        "proportional upscaling requires a finite scale",
                    ));
                }
            }
            UpscalingInfo::Poisson {
                sum_value_offset,
                count_value_offset,
                sampling_distance,
            } => {
                if *sum_value_offset >= value_count || *count_value_offset >= value_count {
                    return Err(ProfileError::configuration(
                        "Poisson upscaling offsets must address a value column",
                    ));
                }
                if *sampling_distance <= 0 {
                    return Err(ProfileError::configuration(
                        "Poisson upscaling requires a positive sampling distance",
                    ));
                }
            }
        }
        Ok(())
    }
}
