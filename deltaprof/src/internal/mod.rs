// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod function;
mod location;
mod mapping;
mod owned_types;
mod profile;
mod stack_trace;
mod upscaling;

pub use function::*;
pub use location::*;
pub use mapping::*;
pub use owned_types::*;
pub use profile::*;
pub use stack_trace::*;
pub use upscaling::*;

pub use deltaprof_pprof::ValueType;

use crate::collections::identifiable::*;
use std::num::NonZeroU32;
