// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::collections::identifiable::Id;
use crate::internal::Function as InternalFunction;

impl From<InternalFunction> for deltaprof_otlp::Function {
    fn from(function: InternalFunction) -> Self {
        Self::from(&function)
    }
}

impl From<&InternalFunction> for deltaprof_otlp::Function {
    fn from(function: &InternalFunction) -> Self {
        Self {
            name_strindex: function.name.to_raw_id(),
            system_name_strindex: function.system_name.to_raw_id(),
            filename_strindex: function.filename.to_raw_id(),
        }
    }
}
