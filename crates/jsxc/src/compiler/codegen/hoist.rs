// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Hoisting (ES3 Section 10.1.3).
//!
//! `var` declarations and function declarations are visible throughout
//! their enclosing function, including before their textual position:
//!
//! ```text
//! // Input:
//! f();             // works
//! var x = 5;
//! function f() { return x; }
//!
//! // Effectively:
//! var x;
//! var f = function f() { return x; };
//! f();
//! x = 5;
//! ```
//!
//! Before a statement list is compiled, this pass walks it (descending
//! into blocks, branches and loop bodies, but never into a function body)
//! and declares every `var` name and every function declaration name in the
//! current scope. Named function declarations are then compiled on the
//! spot, in source order, so their closures are bound before the first
//! statement of the scope runs and every sibling name is already declared
//! when their bodies resolve it.

use tracing::debug;

use super::{Compiler, FunctionRole, with_stack};
use crate::ast::{Function, Node};
use crate::error::Result;

impl Compiler {
    /// Runs the hoisting pass over a statement list.
    pub(super) fn hoist(&mut self, statements: &[Node]) -> Result<()> {
        let mut functions = Vec::new();
        for stmt in statements {
            self.collect_hoisted_from_statement(stmt, &mut functions)?;
        }

        for func in functions {
            debug!(name = func.name.as_deref().unwrap_or_default(), "hoisting function");
            self.compile_function(func, FunctionRole::Declaration)?;
        }
        Ok(())
    }

    /// Declares hoisted names found in `stmt` and collects named function
    /// declarations.
    fn collect_hoisted_from_statement<'a>(
        &mut self,
        stmt: &'a Node,
        functions: &mut Vec<&'a Function>,
    ) -> Result<()> {
        self.enter()?;
        let result = with_stack(|| self.collect_hoisted_inner(stmt, functions));
        self.leave();
        result
    }

    fn collect_hoisted_inner<'a>(
        &mut self,
        stmt: &'a Node,
        functions: &mut Vec<&'a Function>,
    ) -> Result<()> {
        match stmt {
            Node::Declaration { name, .. } => {
                self.scopes.declare(name);
            }
            Node::Function(func) => {
                // Anonymous functions compile in place during the normal pass.
                if let Some(name) = &func.name {
                    self.scopes.declare(name);
                    functions.push(func);
                }
            }
            Node::Body { statements } => {
                for inner in statements {
                    self.collect_hoisted_from_statement(inner, functions)?;
                }
            }
            Node::If {
                consequent,
                alternate,
                ..
            } => {
                self.collect_hoisted_from_statement(consequent, functions)?;
                if let Some(alternate) = alternate {
                    self.collect_hoisted_from_statement(alternate, functions)?;
                }
            }
            Node::ForLoop { init, body, .. } => {
                if let Some(init) = init {
                    self.collect_hoisted_from_statement(init, functions)?;
                }
                self.collect_hoisted_from_statement(body, functions)?;
            }
            Node::While { body, .. } => self.collect_hoisted_from_statement(body, functions)?,
            // Expressions and jumps contain no declarations.
            _ => {}
        }
        Ok(())
    }
}
