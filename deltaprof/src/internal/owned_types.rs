// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::api;

/// The sample types and period outlive any single string table, since a new
/// table is built per encode pass. These owned copies are the source the
/// per-pass tables are interned from.
#[derive(Clone, Debug)]
pub struct OwnedValueType {
    pub typ: Box<str>,
    pub unit: Box<str>,
}

impl<'a> From<&'a api::ValueType<'a>> for OwnedValueType {
    #[inline]
    fn from(value_type: &'a api::ValueType<'a>) -> Self {
        Self {
            typ: value_type.r#type.into(),
            unit: value_type.unit.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OwnedPeriod {
    pub typ: OwnedValueType,
    pub value: i64,
}

impl<'a> From<&'a api::Period<'a>> for OwnedPeriod {
    #[inline]
    fn from(period: &'a api::Period<'a>) -> Self {
        Self {
            typ: OwnedValueType::from(&period.r#type),
            value: period.value,
        }
    }
}
