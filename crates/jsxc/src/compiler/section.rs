// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Section storage.
//!
//! One section per function body plus one for top-level code, kept in
//! creation order so a section's index is final as soon as it exists.
//! The section being emitted into is tracked as a stack, which lets a
//! nested function body be compiled in the middle of its parent.

use tracing::debug;

use super::bytecode::Emit;
use super::fixup;
use crate::error::Result;

/// Index of a section in the final module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub u32);

/// A code buffer for one function body or the top level.
#[derive(Debug, Default, Clone)]
pub struct Section {
    /// Emitted items, labels unresolved
    pub items: Vec<Emit>,
}

/// All sections of a compilation and the stack of sections being emitted into.
#[derive(Debug, Default)]
pub struct SectionStore {
    sections: Vec<Section>,
    stack: Vec<SectionId>,
}

impl SectionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty section and makes it current.
    pub fn push_new_section(&mut self) -> SectionId {
        let id = SectionId(self.sections.len() as u32);
        self.sections.push(Section::default());
        self.stack.push(id);
        debug!(section = id.0, depth = self.stack.len(), "section opened");
        id
    }

    /// Makes a previously created section current again.
    pub fn push_existing_section(&mut self, id: SectionId) {
        debug_assert!((id.0 as usize) < self.sections.len());
        self.stack.push(id);
    }

    /// Restores the previous current section.
    pub fn pop_section(&mut self) -> Option<SectionId> {
        let id = self.stack.pop();
        if let Some(id) = id {
            debug!(section = id.0, items = self.sections[id.0 as usize].items.len(), "section closed");
        }
        id
    }

    /// The section being emitted into.
    pub fn current(&self) -> Option<SectionId> {
        self.stack.last().copied()
    }

    /// Appends items to the current section and returns its id.
    ///
    /// Returns `None`, appending nothing, when no section is current.
    pub fn emit(&mut self, items: impl IntoIterator<Item = Emit>) -> Option<SectionId> {
        let id = self.current()?;
        self.sections[id.0 as usize].items.extend(items);
        Some(id)
    }

    /// Number of sections created so far.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section was created yet.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Looks up a section.
    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0 as usize)
    }

    /// Resolves every section's labels and encodes it, in creation order.
    pub fn finish(self) -> Result<Vec<Vec<u8>>> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, section)| fixup::resolve(i as u32, &section.items))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::bytecode::OpCode;

    #[test]
    fn test_nested_sections_restore_parent() {
        let mut store = SectionStore::new();
        let root = store.push_new_section();
        store.emit([Emit::Op(OpCode::Null)]);
        let inner = store.push_new_section();
        store.emit([Emit::Op(OpCode::True)]);
        assert_eq!(store.pop_section(), Some(inner));
        store.emit([Emit::Op(OpCode::Pop)]);

        assert_eq!(root, SectionId(0));
        assert_eq!(inner, SectionId(1));
        assert_eq!(
            store.get(root).unwrap().items,
            vec![Emit::Op(OpCode::Null), Emit::Op(OpCode::Pop)]
        );
        assert_eq!(store.get(inner).unwrap().items, vec![Emit::Op(OpCode::True)]);
    }

    #[test]
    fn test_reenter_closed_section() {
        let mut store = SectionStore::new();
        let root = store.push_new_section();
        let inner = store.push_new_section();
        store.emit([Emit::Op(OpCode::Undefined)]);
        store.pop_section();

        store.push_existing_section(inner);
        store.emit([Emit::Op(OpCode::Ret)]);
        store.pop_section();
        assert_eq!(store.current(), Some(root));
        assert_eq!(store.get(inner).unwrap().items.len(), 2);
    }

    #[test]
    fn test_emit_without_current_section() {
        let mut store = SectionStore::new();
        assert_eq!(store.emit([Emit::Op(OpCode::Ret)]), None);

        let root = store.push_new_section();
        assert_eq!(store.emit([Emit::Op(OpCode::Ret)]), Some(root));
        store.pop_section();
        assert_eq!(store.emit([Emit::Op(OpCode::Null)]), None);
        assert_eq!(store.get(root).unwrap().items, vec![Emit::Op(OpCode::Ret)]);
    }

    #[test]
    fn test_finish_keeps_creation_order() {
        let mut store = SectionStore::new();
        store.push_new_section();
        store.emit([Emit::Op(OpCode::Ret)]);
        store.push_new_section();
        store.emit([Emit::Op(OpCode::Null), Emit::Op(OpCode::Ret)]);
        store.pop_section();
        store.pop_section();

        let encoded = store.finish().unwrap();
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0], 1u32.to_le_bytes());
        assert_eq!(encoded[1].len(), 8);
    }
}
