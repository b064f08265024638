// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Scope management for variable resolution during compilation.
//!
//! One scope per function body being compiled. The top level has no scope:
//! its variables are globals.

use rustc_hash::FxHashMap;

/// Variable slots of one function body.
#[derive(Debug, Default)]
pub struct Scope {
    /// Slot of each declared name
    slots: FxHashMap<String, u32>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `name`, allocating the next one if it is new.
    pub fn declare(&mut self, name: &str) -> u32 {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.slots.len() as u32;
        self.slots.insert(name.to_string(), slot);
        slot
    }

    /// Looks up a slot in this scope only.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.slots.get(name).copied()
    }

    /// Number of allocated slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot was allocated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The scopes of the function bodies currently being compiled, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Creates an empty stack (top level).
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a function body.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// End the innermost function body, returning its scope.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Declare `name` in the innermost scope.
    ///
    /// Returns `None` at top level, where declarations are globals.
    pub fn declare(&mut self, name: &str) -> Option<u32> {
        self.scopes.last_mut().map(|scope| scope.declare(name))
    }

    /// Resolve `name` to `(slot, depth)`, where depth 0 is the innermost scope.
    ///
    /// `None` means the name is a global.
    pub fn resolve(&self, name: &str) -> Option<(u32, u32)> {
        self.scopes
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, scope)| scope.get(name).map(|slot| (slot, depth as u32)))
    }

    /// Whether compilation is at top level.
    pub fn is_global(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_stack_new() {
        let stack = ScopeStack::new();
        assert!(stack.is_global());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_declare_at_top_level_is_global() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.declare("x"), None);
        assert_eq!(stack.resolve("x"), None);
    }

    #[test]
    fn test_declare_is_dense_and_ordered() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        assert_eq!(stack.declare("a"), Some(0));
        assert_eq!(stack.declare("b"), Some(1));
        assert_eq!(stack.declare("c"), Some(2));
    }

    #[test]
    fn test_redeclare_returns_same_slot() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        let first = stack.declare("x");
        stack.declare("y");
        assert_eq!(stack.declare("x"), first);
        assert_eq!(stack.pop_scope().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_resolve_reports_depth() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        stack.declare("outer");
        stack.declare("shadowed");
        stack.push_scope();
        stack.declare("shadowed");
        stack.declare("inner");

        assert_eq!(stack.resolve("inner"), Some((1, 0)));
        assert_eq!(stack.resolve("shadowed"), Some((0, 0)));
        assert_eq!(stack.resolve("outer"), Some((0, 1)));
        assert_eq!(stack.resolve("missing"), None);

        stack.pop_scope();
        assert_eq!(stack.resolve("shadowed"), Some((1, 0)));
        assert_eq!(stack.resolve("inner"), None);
    }
}
