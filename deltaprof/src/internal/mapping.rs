// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;

/// Represents a pprof Mapping with the same space-saving changes as the
/// other interned items. The auxiliary fields (`filename`, `build_id`) are
/// only interned when the mapping is resolved, which lazy resolution defers
/// to the first sample that references it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Mapping {
    pub memory_start: u64,
    pub memory_limit: u64,
    pub file_offset: u64,
    pub filename: StringId,
    pub build_id: StringId,
}

impl Item for Mapping {
    type Id = MappingId;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MappingId(NonZeroU32);

impl Id for MappingId {
    type RawId = u64;

    fn from_offset(offset: usize) -> Self {
        #[allow(clippy::expect_used)]
        let id = small_non_zero_pprof_id(offset).expect("MappingId to fit into a u32");
        Self(id)
    }

    fn to_raw_id(&self) -> Self::RawId {
        self.0.get().into()
    }
}
