// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! String interning.
//!
//! Identifiers and literals from every section share one index space.

use rustc_hash::FxHashMap;

/// Deduplicated strings in first-seen order.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
    indices: FxHashMap<String, u32>,
}

impl StringTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `s`, assigning the next one if it is new.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&index) = self.indices.get(s) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.indices.insert(s.to_string(), index);
        index
    }

    /// Number of distinct strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Consumes the table, yielding strings in index order.
    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedupes() {
        let mut table = StringTable::new();
        let a = table.intern("log");
        let b = table.intern("log");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_first_seen_order() {
        let mut table = StringTable::new();
        assert_eq!(table.intern("b"), 0);
        assert_eq!(table.intern("a"), 1);
        assert_eq!(table.intern("b"), 0);
        assert_eq!(table.intern(""), 2);
        assert_eq!(table.into_strings(), vec!["b", "a", ""]);
    }
}
