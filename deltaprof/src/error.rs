// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::io;

/// Represents errors that occur in the delta-profiling API.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The profiler or an encoder was constructed with settings that can
    /// never work, e.g. an empty sample-type set or a scaling rule that
    /// addresses a value column that doesn't exist. Fatal; never retried.
    #[error("invalid configuration: {0}")]
    Configuration(Cow<'static, str>),
    /// A parameter was incorrect, e.g. a record referenced a mapping that is
    /// not part of the snapshot.
    #[error("invalid input: {0}")]
    InvalidInput(Cow<'static, str>),
    /// An I/O failure while writing to the caller's sink. Propagated
    /// verbatim; retry policy belongs to the transport layer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ProfileError {
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidInput(message.into())
    }
}
