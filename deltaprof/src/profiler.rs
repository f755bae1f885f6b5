// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::api::{self, ProfileOptions, UpscalingInfo};
use crate::collections::identifiable::FxIndexSet;
use crate::delta::{DeltaTracker, PollOutcome};
use crate::error::ProfileError;
use crate::internal::{OwnedPeriod, OwnedValueType, Profile, UpscalingRules};
use std::time::SystemTime;

/// Drives the per-poll pipeline for one profile kind: it owns the delta
/// baseline, the sample-type and period metadata, and the scaling rules, and
/// turns each snapshot into an interned [Profile] ready for encoding.
///
/// One profiler instance per profile kind, polled by one task at a time; the
/// `&mut self` receivers enforce the single-writer discipline. The baseline
/// lives only in memory and does not survive a process restart.
pub struct DeltaProfiler {
    options: ProfileOptions,
    sample_types: Box<[OwnedValueType]>,
    period: Option<OwnedPeriod>,
    upscaling_rules: UpscalingRules,
    tracker: DeltaTracker,
    last_poll: SystemTime,
    window: (SystemTime, SystemTime),
    counter_resets: u64,
}

impl DeltaProfiler {
    /// Creates a profiler for an arbitrary metric-vector shape. Every record
    /// of every snapshot must carry exactly `sample_types.len()` values.
    pub fn new(
        sample_types: &[api::ValueType],
        period: Option<api::Period>,
        options: ProfileOptions,
    ) -> Result<Self, ProfileError> {
        if sample_types.is_empty() {
            return Err(ProfileError::configuration(
                "a profile needs at least one sample type",
            ));
        }

        let now = SystemTime::now();
        Ok(Self {
            options,
            sample_types: sample_types.iter().map(OwnedValueType::from).collect(),
            period: period.as_ref().map(OwnedPeriod::from),
            upscaling_rules: UpscalingRules::default(),
            tracker: DeltaTracker::new(sample_types.len(), options.generics_frames),
            last_poll: now,
            window: (now, now),
            counter_resets: 0,
        })
    }

    /// A profiler for heap records shaped `[alloc_objects, alloc_space,
    /// inuse_objects, inuse_space]`. When allocations are sampled
    /// (`sample_rate` bytes between samples on average), values are
    /// extrapolated with the Poisson correction.
    pub fn heap(sample_rate: i64, options: ProfileOptions) -> Result<Self, ProfileError> {
        let sample_types = [
            api::ValueType::new("alloc_objects", "count"),
            api::ValueType::new("alloc_space", "bytes"),
            api::ValueType::new("inuse_objects", "count"),
            api::ValueType::new("inuse_space", "bytes"),
        ];
        let period = api::Period {
            r#type: api::ValueType::new("space", "bytes"),
            value: sample_rate,
        };
        let mut profiler = Self::new(&sample_types, Some(period), options)?;
        if sample_rate > 1 {
            profiler.add_upscaling_rule(
                &[0, 1],
                UpscalingInfo::Poisson {
                    sum_value_offset: 1,
                    count_value_offset: 0,
                    sampling_distance: sample_rate,
                },
            )?;
            profiler.add_upscaling_rule(
                &[2, 3],
                UpscalingInfo::Poisson {
                    sum_value_offset: 3,
                    count_value_offset: 2,
                    sampling_distance: sample_rate,
                },
            )?;
        }
        Ok(profiler)
    }

    /// A profiler for mutex contention records shaped `[contentions,
    /// delay]`. `fraction` is the runtime's sampling fraction (1 of every
    /// `fraction` contention events is recorded); `cycles_per_nanosecond`
    /// converts the runtime's cycle counts into the nanoseconds the delay
    /// column advertises.
    pub fn mutex(
        fraction: i64,
        cycles_per_nanosecond: f64,
        options: ProfileOptions,
    ) -> Result<Self, ProfileError> {
        Self::contention(fraction, cycles_per_nanosecond, options)
    }

    /// A profiler for block records. Identical shape to [Self::mutex]; block
    /// profiles are not fraction-sampled, so pass 1.
    pub fn block(
        cycles_per_nanosecond: f64,
        options: ProfileOptions,
    ) -> Result<Self, ProfileError> {
        Self::contention(1, cycles_per_nanosecond, options)
    }

    fn contention(
        fraction: i64,
        cycles_per_nanosecond: f64,
        options: ProfileOptions,
    ) -> Result<Self, ProfileError> {
        if fraction < 1 {
            return Err(ProfileError::configuration(
                "the sampling fraction must be at least 1",
            ));
        }
        if !(cycles_per_nanosecond.is_finite() && cycles_per_nanosecond > 0.0) {
            return Err(ProfileError::configuration(
                "cycles_per_nanosecond must be positive and finite",
            ));
        }

        let sample_types = [
            api::ValueType::new("contentions", "count"),
            api::ValueType::new("delay", "nanoseconds"),
        ];
        let period = api::Period {
            r#type: api::ValueType::new("contentions", "count"),
            value: fraction,
        };
        let mut profiler = Self::new(&sample_types, Some(period), options)?;
        if fraction > 1 {
            profiler.add_upscaling_rule(
                &[0],
                UpscalingInfo::Proportional {
                    scale: fraction as f64,
                },
            )?;
        }
        profiler.add_upscaling_rule(
            &[1],
            UpscalingInfo::Proportional {
                scale: fraction as f64 / cycles_per_nanosecond,
            },
        )?;
        Ok(profiler)
    }

    /// Registers a scaling rule for the given value columns. Both encoders
    /// apply it identically.
    pub fn add_upscaling_rule(
        &mut self,
        values_offset: &[usize],
        upscaling_info: UpscalingInfo,
    ) -> Result<(), ProfileError> {
        self.upscaling_rules
            .add(values_offset, upscaling_info, self.sample_types.len())
    }

    /// Computes the deltas between this snapshot and the previous one, and
    /// advances the baseline and the covered time window.
    pub fn poll(&mut self, snapshot: &api::Snapshot) -> PollOutcome {
        let known_mappings: FxIndexSet<u64> =
            snapshot.mappings.iter().map(|mapping| mapping.id).collect();
        let outcome = self.tracker.poll(snapshot.records, &known_mappings);

        let now = SystemTime::now();
        self.window = (self.last_poll, now);
        self.last_poll = now;
        self.counter_resets += outcome.counter_resets as u64;
        outcome
    }

    /// Interns a poll's deltas into an encodable [Profile]. `snapshot` must
    /// be the snapshot the outcome was polled from, since frames reference
    /// its mappings.
    pub fn build_profile(
        &self,
        outcome: &PollOutcome,
        snapshot: &api::Snapshot,
    ) -> Result<Profile, ProfileError> {
        Profile::build(
            &self.sample_types,
            self.period.as_ref(),
            self.upscaling_rules.clone(),
            self.options,
            &outcome.deltas,
            snapshot.mappings,
            self.window.0,
            self.window.1,
        )
    }

    /// Counter resets observed over the profiler's lifetime. Resets are
    /// handled silently by re-baselining; this is for callers that want to
    /// watch for them.
    pub fn counter_resets(&self) -> u64 {
        self.counter_resets
    }

    pub fn options(&self) -> ProfileOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Frame, Record, Snapshot};

    #[test]
    fn empty_sample_types_are_a_configuration_error() {
        let result = DeltaProfiler::new(&[], None, ProfileOptions::default());
        assert!(matches!(result, Err(ProfileError::Configuration(_))));
    }

    #[test]
    fn contention_presets_validate_their_inputs() {
        assert!(DeltaProfiler::mutex(0, 1.0, ProfileOptions::default()).is_err());
        assert!(DeltaProfiler::mutex(2, 0.0, ProfileOptions::default()).is_err());
        assert!(DeltaProfiler::mutex(2, f64::NAN, ProfileOptions::default()).is_err());
        assert!(DeltaProfiler::block(2.5, ProfileOptions::default()).is_ok());
    }

    #[test]
    fn counter_resets_accumulate_across_polls() {
        let sample_types = [api::ValueType::new("alloc_objects", "count")];
        let mut profiler =
            DeltaProfiler::new(&sample_types, None, ProfileOptions::default()).unwrap();

        let frames = [Frame {
            function: "a",
            filename: "app.rs",
            line: 1,
            mapping_id: None,
        }];
        for values in [&[100i64], &[5], &[2]] {
            let records = [Record {
                frames: &frames,
                values,
            }];
            profiler.poll(&Snapshot {
                records: &records,
                mappings: &[],
            });
        }
        // 100 -> 5 and 5 -> 2 both re-baseline.
        assert_eq!(profiler.counter_resets(), 2);
    }

    #[test]
    fn heap_preset_scales_sampled_values() {
        use crate::pprof::test_utils::{deserialize_pprof, sorted_samples};

        const RATE: i64 = 512 * 1024;
        let mut profiler = DeltaProfiler::heap(RATE, ProfileOptions::default()).unwrap();

        let frames = [Frame {
            function: "alloc_site",
            filename: "app.rs",
            line: 1,
            mapping_id: None,
        }];
        let records = [Record {
            frames: &frames,
            values: &[2, RATE, 1, RATE / 2],
        }];
        let snapshot = Snapshot {
            records: &records,
            mappings: &[],
        };

        let outcome = profiler.poll(&snapshot);
        let profile = profiler.build_profile(&outcome, &snapshot).unwrap();
        let decoded = deserialize_pprof(&profile.serialize_into_pprof().unwrap().buffer).unwrap();

        let samples = sorted_samples(&decoded);
        assert_eq!(samples.len(), 1);
        let values = &samples[0].values;

        // avg = 256 KiB over a 512 KiB sampling distance.
        let alloc_scale = 1.0 / (1.0 - (-0.5f64).exp());
        assert_eq!(values[0], (2.0 * alloc_scale).round() as i64);
        assert_eq!(values[1], (RATE as f64 * alloc_scale).round() as i64);

        assert_eq!(decoded.period, RATE);
    }

    #[test]
    fn mutex_preset_converts_cycles_to_nanoseconds() {
        use crate::pprof::test_utils::{deserialize_pprof, sorted_samples};

        let mut profiler = DeltaProfiler::mutex(5, 2.0, ProfileOptions::default()).unwrap();

        let frames = [Frame {
            function: "contended",
            filename: "sync.rs",
            line: 1,
            mapping_id: None,
        }];
        let records = [Record {
            frames: &frames,
            values: &[3, 1000],
        }];
        let snapshot = Snapshot {
            records: &records,
            mappings: &[],
        };

        let outcome = profiler.poll(&snapshot);
        let profile = profiler.build_profile(&outcome, &snapshot).unwrap();
        let decoded = deserialize_pprof(&profile.serialize_into_pprof().unwrap().buffer).unwrap();

        let samples = sorted_samples(&decoded);
        // 3 sampled contentions at fraction 5 -> 15; 1000 cycles at 2
        // cycles/ns, scaled by the fraction -> 2500 ns.
        assert_eq!(samples[0].values, vec![15, 2500]);
    }
}
