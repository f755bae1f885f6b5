// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Turns cumulative in-process profiling snapshots (heap allocations,
//! mutex/block contention) into delta profiles: the activity observed since
//! the previous poll, keyed by call stack. Each delta can be serialized to
//! the pprof exchange format and to the OTLP profiles experimental schema,
//! and the two encodings carry the same sample set.
//!
//! The pipeline per poll is: snapshot -> [DeltaTracker] -> [internal::Profile]
//! -> pprof and/or OTLP bytes. [DeltaProfiler] owns the pieces and drives
//! them; a profiler instance must be polled from one task at a time, and the
//! built profile is read-only, so both encoders may run concurrently over it.

pub mod api;
pub mod collections;
pub mod internal;
pub mod pprof;

mod delta;
mod error;
mod profiler;

pub use delta::{DeltaRecord, DeltaTracker, FrameKey, PollOutcome, StackSignature};
pub use error::ProfileError;
pub use profiler::DeltaProfiler;
