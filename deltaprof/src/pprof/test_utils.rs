// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decode-side helpers for inspecting pprof output. Test-oriented, but kept
//! in the library so integration suites and downstream consumers can use
//! them too.

// Lookup failures here mean the profile under test is malformed; panicking
// with the offending id is the useful behavior for a test helper.
#![allow(clippy::panic)]

use anyhow::Context;
use deltaprof_pprof::prost_impls::{Function, Location, Profile, Sample};
use std::collections::HashMap;
use std::io::Read;

/// Decodes a serialized profile, transparently handling gzip: the encoder
/// compresses by default and callers shouldn't have to know whether
/// `no_compression` was set.
pub fn deserialize_pprof(encoded: &[u8]) -> anyhow::Result<Profile> {
    use prost::Message;

    let profile = if encoded.starts_with(&[0x1f, 0x8b]) {
        let mut decoder = flate2::read::GzDecoder::new(encoded);
        let mut buf = Vec::new();
        decoder
            .read_to_end(&mut buf)
            .context("failed to decompress gzipped profile")?;
        Profile::decode(buf.as_slice())?
    } else {
        Profile::decode(encoded)?
    };
    Ok(profile)
}

/// The profile's samples in a deterministic order, for comparisons.
pub fn sorted_samples(profile: &Profile) -> Vec<Sample> {
    let mut samples = profile.samples.clone();
    samples.sort_unstable();
    samples
}

#[track_caller]
pub fn string_table_fetch(profile: &Profile, id: i64) -> &String {
    profile
        .string_table
        .get(id as usize)
        .unwrap_or_else(|| panic!("String {id} not found"))
}

/// Id-indexed view over a decoded profile, for resolving sample stacks
/// without a linear scan per frame.
pub struct ProfileIndex<'a> {
    pub profile: &'a Profile,
    locations: HashMap<u64, &'a Location>,
    functions: HashMap<u64, &'a Function>,
}

impl<'a> ProfileIndex<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self {
            profile,
            locations: profile.locations.iter().map(|l| (l.id, l)).collect(),
            functions: profile.functions.iter().map(|f| (f.id, f)).collect(),
        }
    }

    /// Renders a sample's stack as `leaf;...;root` function names.
    pub fn sample_stack_to_string(&self, sample: &Sample) -> String {
        let mut names = Vec::with_capacity(sample.location_ids.len());
        for location_id in &sample.location_ids {
            let location = self
                .locations
                .get(location_id)
                .unwrap_or_else(|| panic!("Location {location_id} not found"));
            let function_id = location.lines[0].function_id;
            let function = self
                .functions
                .get(&function_id)
                .unwrap_or_else(|| panic!("Function {function_id} not found"));
            names.push(string_table_fetch(self.profile, function.name).as_str());
        }
        names.join(";")
    }
}
