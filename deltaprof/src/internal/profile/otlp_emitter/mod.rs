// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OTLP emitter for converting the interned profile to the OTLP profiles
//! experimental messages.
//!
//! This module provides `From` trait implementations for converting interned
//! table entries to their OTLP equivalents, plus the profile-level emitter.
//! It shares nothing with the pprof encoder beyond the interned profile
//! itself.

mod function;
mod location;
mod mapping;
mod profile;
