// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::collections::identifiable::Id;
use crate::internal::Mapping as InternalMapping;

impl From<InternalMapping> for deltaprof_otlp::Mapping {
    fn from(mapping: InternalMapping) -> Self {
        Self::from(&mapping)
    }
}

impl From<&InternalMapping> for deltaprof_otlp::Mapping {
    fn from(mapping: &InternalMapping) -> Self {
        Self {
            memory_start: mapping.memory_start,
            memory_limit: mapping.memory_limit,
            file_offset: mapping.file_offset,
            filename_strindex: mapping.filename.to_raw_id(),
            build_id_strindex: mapping.build_id.to_raw_id(),
        }
    }
}
