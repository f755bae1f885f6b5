// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod test_utils;

pub use deltaprof_pprof::prost_impls as proto;
