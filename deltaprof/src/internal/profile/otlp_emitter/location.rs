// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::collections::identifiable::Id;
use crate::internal::Location as InternalLocation;

impl From<InternalLocation> for deltaprof_otlp::Location {
    fn from(location: InternalLocation) -> Self {
        Self::from(&location)
    }
}

impl From<&InternalLocation> for deltaprof_otlp::Location {
    fn from(location: &InternalLocation) -> Self {
        Self {
            // 0 represents no mapping; real references are one-based.
            mapping_index: location.mapping_id.map(|id| id.to_raw_id()).unwrap_or(0),
            address: 0,
            line: vec![deltaprof_otlp::Line {
                function_index: location.function_id.to_raw_id(),
                line: location.line,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::{FunctionId, MappingId};

    #[test]
    fn mapped_location() {
        let location = InternalLocation {
            mapping_id: Some(MappingId::from_offset(1)),
            function_id: FunctionId::from_offset(2),
            line: 42,
        };

        let otlp_location = deltaprof_otlp::Location::from(&location);
        // from_offset adds 1 to avoid zero ids.
        assert_eq!(otlp_location.mapping_index, 2);
        assert_eq!(otlp_location.line.len(), 1);
        assert_eq!(otlp_location.line[0].function_index, 3);
        assert_eq!(otlp_location.line[0].line, 42);
    }

    #[test]
    fn unmapped_location() {
        let location = InternalLocation {
            mapping_id: None,
            function_id: FunctionId::from_offset(0),
            line: 7,
        };

        let otlp_location = deltaprof_otlp::Location::from(&location);
        assert_eq!(otlp_location.mapping_index, 0);
        assert_eq!(otlp_location.line[0].function_index, 1);
    }
}
