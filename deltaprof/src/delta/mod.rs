// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tracks per-callstack cumulative counters across polls and turns each poll
//! into the set of deltas observed since the previous one.

use crate::api;
use crate::collections::identifiable::{FxIndexMap, FxIndexSet};
use std::borrow::Cow;
use std::sync::Arc;

/// One frame of a normalized stack. Frames are compared and hashed by their
/// resolved identity, so the same logical stack correlates across polls no
/// matter the capture order.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FrameKey {
    pub function: Box<str>,
    pub filename: Box<str>,
    pub line: i64,
    pub mapping_id: Option<u64>,
}

/// A deterministic key derived from a record's normalized stack. Cheap to
/// clone; the frames are shared.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StackSignature {
    frames: Arc<[FrameKey]>,
}

impl StackSignature {
    fn new(frames: &[api::Frame], generics_frames: bool) -> Self {
        let frames: Vec<FrameKey> = frames
            .iter()
            .map(|frame| {
                let function = if generics_frames {
                    normalize_generic_name(frame.function)
                } else {
                    Cow::Borrowed(frame.function)
                };
                FrameKey {
                    function: function.into(),
                    filename: frame.filename.into(),
                    line: frame.line,
                    mapping_id: frame.mapping_id,
                }
            })
            .collect();
        Self {
            frames: frames.into(),
        }
    }

    /// The normalized frames, leaf first.
    pub fn frames(&self) -> &[FrameKey] {
        &self.frames
    }
}

/// Canonicalizes a generic-instantiation suffix, so that `run[shapeA]` and
/// `run[shapeB]` share the identity `run[...]`.
pub(crate) fn normalize_generic_name(name: &str) -> Cow<'_, str> {
    match (name.find('['), name.ends_with(']')) {
        (Some(index), true) => Cow::Owned(format!("{}[...]", &name[..index])),
        _ => Cow::Borrowed(name),
    }
}

/// A stack and the activity attributed to it since the previous poll. Values
/// are never negative.
#[derive(Clone, Debug)]
pub struct DeltaRecord {
    pub stack: StackSignature,
    pub values: Box<[i64]>,
}

/// What one poll produced. The delta records are a set; their order is the
/// aggregation order of the input records, which is deterministic for a
/// deterministic record source.
#[derive(Debug, Default)]
pub struct PollOutcome {
    pub deltas: Vec<DeltaRecord>,
    /// Records dropped from this snapshot because they were malformed: an
    /// empty stack, a metric vector of the wrong width, or a dangling
    /// mapping reference. The rest of the snapshot is still processed.
    pub dropped_records: usize,
    /// Counter resets observed this poll. Not an error; the affected stacks
    /// were re-baselined and their full current value emitted.
    pub counter_resets: usize,
}

/// Owns the previous-cumulative baseline and computes per-poll deltas.
///
/// A tracker is exclusively owned by one profile kind; polls take `&mut
/// self`, so concurrent polls against the same instance do not compile.
pub struct DeltaTracker {
    value_count: usize,
    generics_frames: bool,
    baseline: FxIndexMap<StackSignature, Box<[i64]>>,
}

impl DeltaTracker {
    pub fn new(value_count: usize, generics_frames: bool) -> Self {
        Self {
            value_count,
            generics_frames,
            baseline: FxIndexMap::default(),
        }
    }

    /// The number of stacks currently held in the baseline.
    pub fn baseline_len(&self) -> usize {
        self.baseline.len()
    }

    /// Computes the deltas between `records` and the previous poll, then
    /// advances the baseline to the current snapshot. Stacks absent from a
    /// non-empty snapshot are evicted immediately; an empty snapshot is a
    /// no-op and leaves the baseline untouched.
    pub fn poll(&mut self, records: &[api::Record], known_mappings: &FxIndexSet<u64>) -> PollOutcome {
        if records.is_empty() {
            return PollOutcome::default();
        }

        let mut dropped_records = 0usize;
        let mut current: FxIndexMap<StackSignature, Box<[i64]>> = FxIndexMap::default();
        current.reserve(records.len());

        for record in records {
            if record.frames.is_empty() || record.values.len() != self.value_count {
                dropped_records += 1;
                continue;
            }
            if record
                .frames
                .iter()
                .any(|f| f.mapping_id.is_some_and(|id| !known_mappings.contains(&id)))
            {
                dropped_records += 1;
                continue;
            }

            let signature = StackSignature::new(record.frames, self.generics_frames);
            match current.get_mut(&signature) {
                // Two records may share a signature, e.g. two generic
                // instantiations under normalization. Their activity belongs
                // to one stack.
                Some(values) => {
                    for (sum, value) in values.iter_mut().zip(record.values) {
                        *sum += value;
                    }
                }
                None => {
                    current.insert(signature, record.values.into());
                }
            }
        }

        let mut deltas = Vec::with_capacity(current.len());
        let mut counter_resets = 0usize;
        for (signature, values) in current.iter() {
            let delta = match self.baseline.get(signature) {
                // A stack seen for the first time contributes its full
                // cumulative value.
                None => values.clone(),
                Some(previous) => {
                    let reset = values.iter().zip(previous.iter()).any(|(c, p)| c < p);
                    if reset {
                        counter_resets += 1;
                        values.clone()
                    } else {
                        values
                            .iter()
                            .zip(previous.iter())
                            .map(|(c, p)| c - p)
                            .collect()
                    }
                }
            };
            deltas.push(DeltaRecord {
                stack: signature.clone(),
                values: delta,
            });
        }

        if dropped_records > 0 {
            tracing::warn!(dropped_records, "dropped malformed profiling records");
        }
        if counter_resets > 0 {
            tracing::debug!(counter_resets, "re-baselined stacks after counter reset");
        }

        self.baseline = current;

        PollOutcome {
            deltas,
            dropped_records,
            counter_resets,
        }
    }
}
