// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::collections::identifiable::{FxIndexSet, Id, StringId};

/// Holds unique strings and provides [StringId]s that correspond to the order
/// that the strings were inserted. A table lives for one encode pass, so ids
/// are stable for the lifetime of the profile being built.
pub struct StringTable {
    /// The ordered hash set of unique strings. The order becomes the
    /// StringId.
    strings: FxIndexSet<Box<str>>,
}

impl StringTable {
    /// Creates a new string table, which initially holds the empty string
    /// and no others.
    pub fn new() -> Self {
        let mut strings = FxIndexSet::default();
        // Tiny initial capacities cause a burst of reallocations on the very
        // first sample: "" plus one type and unit per value column plus a
        // function and file name per frame already exceeds them.
        strings.reserve(32);

        // Always hold the empty string as item 0.
        strings.insert("".into());

        Self { strings }
    }

    /// Returns the number of strings currently held in the string table.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Adds the string to the string table if it isn't present already, and
    /// returns a [StringId] that corresponds to the order that this string
    /// was originally inserted.
    pub fn intern(&mut self, str: &str) -> StringId {
        match self.strings.get_index_of(str) {
            Some(offset) => StringId::from_offset(offset),
            None => {
                let offset = self.strings.len();
                self.strings.insert(str.into());
                StringId::from_offset(offset)
            }
        }
    }

    /// Returns the string stored at the given id, if any.
    pub fn get(&self, id: StringId) -> Option<&str> {
        self.strings.get_index(id.to_offset()).map(|s| &**s)
    }

    /// The strings of the table, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| &**s)
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
