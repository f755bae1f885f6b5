// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Message definitions for the OTLP profiles experimental schema, committed
//! as Rust source rather than generated from .proto files at build time; the
//! message set is small and stable, and skipping protoc keeps the build
//! hermetic.
//!
//! Unlike pprof, the schema has no per-entity id fields: entries are
//! referenced by index. This crate follows the convention that references
//! are the one-based position in the referenced table, with 0 meaning
//! "absent" where a reference is optional (`Location.mapping_index`).
//! String references are zero-based offsets into `string_table`, whose first
//! entry is always the empty string.

use prost::Message;

/// Specifies how values should be interpreted over time. Delta profiles
/// always use [`AggregationTemporality::Delta`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AggregationTemporality {
    Unspecified = 0,
    /// Values measure the change since the previous collection.
    Delta = 1,
    /// Values measure the total since program start.
    Cumulative = 2,
}

/// A single profile covering one collection window.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Profile {
    #[prost(message, repeated, tag = "1")]
    pub sample_type: Vec<ValueType>,
    #[prost(message, repeated, tag = "2")]
    pub sample: Vec<Sample>,
    #[prost(message, repeated, tag = "3")]
    pub mapping: Vec<Mapping>,
    #[prost(message, repeated, tag = "4")]
    pub location: Vec<Location>,
    /// Flattened location references for all samples. Each Sample addresses
    /// a window of this array via `locations_start_index` and
    /// `locations_length`.
    #[prost(int64, repeated, tag = "5")]
    pub location_indices: Vec<i64>,
    #[prost(message, repeated, tag = "6")]
    pub function: Vec<Function>,
    #[prost(string, repeated, tag = "10")]
    pub string_table: Vec<String>,
    /// Start of the collection window, nanoseconds since the unix epoch.
    #[prost(int64, tag = "13")]
    pub time_nanos: i64,
    #[prost(int64, tag = "14")]
    pub duration_nanos: i64,
    #[prost(message, optional, tag = "15")]
    pub period_type: Option<ValueType>,
    #[prost(int64, tag = "16")]
    pub period: i64,
    #[prost(int64, tag = "18")]
    pub default_sample_type: i64,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ValueType {
    #[prost(int64, tag = "1")]
    pub type_strindex: i64,
    #[prost(int64, tag = "2")]
    pub unit_strindex: i64,
    #[prost(enumeration = "AggregationTemporality", tag = "3")]
    pub aggregation_temporality: i32,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Sample {
    /// Index into `Profile.location_indices` where this sample's stack
    /// starts. The leaf is first.
    #[prost(uint64, tag = "1")]
    pub locations_start_index: u64,
    #[prost(uint64, tag = "2")]
    pub locations_length: u64,
    /// One value per entry of `Profile.sample_type`.
    #[prost(int64, repeated, tag = "3")]
    pub value: Vec<i64>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Mapping {
    #[prost(uint64, tag = "1")]
    pub memory_start: u64,
    #[prost(uint64, tag = "2")]
    pub memory_limit: u64,
    #[prost(uint64, tag = "3")]
    pub file_offset: u64,
    #[prost(int64, tag = "4")]
    pub filename_strindex: i64,
    #[prost(int64, tag = "5")]
    pub build_id_strindex: i64,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Location {
    /// One-based reference into `Profile.mapping`; 0 means no mapping.
    #[prost(uint64, tag = "1")]
    pub mapping_index: u64,
    #[prost(uint64, tag = "2")]
    pub address: u64,
    #[prost(message, repeated, tag = "3")]
    pub line: Vec<Line>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Line {
    /// One-based reference into `Profile.function`.
    #[prost(uint64, tag = "1")]
    pub function_index: u64,
    #[prost(int64, tag = "2")]
    pub line: i64,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Function {
    #[prost(int64, tag = "1")]
    pub name_strindex: i64,
    #[prost(int64, tag = "2")]
    pub system_name_strindex: i64,
    #[prost(int64, tag = "3")]
    pub filename_strindex: i64,
}

impl Profile {
    /// Serializes the profile into its protobuf wire representation.
    pub fn serialize_into_proto(&self) -> Vec<u8> {
        self.encode_to_vec()
    }
}
