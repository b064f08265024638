// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Code generation from AST to bytecode.
//!
//! This module contains the `Compiler`, which walks a parsed program and
//! emits one section per function body plus one for the top level.
//!
//! Compilation of every statement list is two passes: the hoisting pass
//! (`hoist`) declares `var` names and fully compiles named function
//! declarations, then the node compiler (`statements`, `expressions`)
//! emits the list in order.

mod expressions;
mod hoist;
mod scope;
mod statements;


pub use scope::{Scope, ScopeStack};

use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::ast::{Function, Node, Program};
use crate::compiler::bytecode::{Emit, Label, OpCode};
use crate::compiler::module::Module;
use crate::compiler::section::{SectionId, SectionStore};
use crate::compiler::strings::StringTable;
use crate::config::CompilerConfig;
use crate::error::{CompileError, Result};

/// Stack that must remain before recursing into a child node.
const RED_ZONE: usize = 128 * 1024;

/// Size of each heap-allocated stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Runs one level of tree recursion, moving onto a fresh heap stack
/// segment when the current one is nearly exhausted.
fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

/// Jump targets of the innermost enclosing loop.
#[derive(Debug, Clone, Copy)]
struct LoopLabels {
    /// Target of `continue`
    next: Label,
    /// Target of `break`
    end: Label,
}

/// How a function literal is being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionRole {
    /// Statement-position function, bound to its name in the enclosing scope
    Declaration,
    /// Function used as a value; only the closure is produced
    Expression,
}

/// Compiles AST to bytecode.
///
/// A compiler is good for one program: `compile` consumes it.
pub struct Compiler {
    config: CompilerConfig,
    sections: SectionStore,
    scopes: ScopeStack,
    strings: StringTable,
    /// Section compiled for each function node, keyed by node address.
    /// Keys are only compared, never dereferenced, and stay valid because
    /// the program is borrowed for the whole compilation.
    functions: FxHashMap<*const Function, SectionId>,
    /// Loop labels of the function body being compiled
    loops: Vec<LoopLabels>,
    next_label: u32,
    depth: usize,
}

impl Compiler {
    /// Creates a new compiler.
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            sections: SectionStore::new(),
            scopes: ScopeStack::new(),
            strings: StringTable::new(),
            functions: FxHashMap::default(),
            loops: Vec::new(),
            next_label: 0,
            depth: 0,
        }
    }

    // ========================================================================
    // Main Compilation Entry Point
    // ========================================================================

    /// Compiles a program into a module.
    #[instrument(skip_all, fields(statements = program.body.len()))]
    pub fn compile(mut self, program: &Program) -> Result<Module> {
        let root = self.sections.push_new_section();

        self.hoist(&program.body)?;
        self.compile_statements(&program.body)?;
        self.emit_implicit_return();

        debug_assert_eq!(self.sections.current(), Some(root));
        self.sections.pop_section();

        let section_count = self.sections.len();
        let sections = self.sections.finish()?;
        let strings = self.strings.into_strings();
        debug!(sections = section_count, strings = strings.len(), "compiled module");
        Ok(Module { sections, strings })
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Compiles a function literal, or references the section it was
    /// already compiled into.
    ///
    /// A body is compiled at most once. Later encounters of the same node
    /// only emit `close` for the existing section and never rebind it.
    fn compile_function(&mut self, func: &Function, role: FunctionRole) -> Result<()> {
        let key = func as *const Function;
        if let Some(&section) = self.functions.get(&key) {
            self.emit([Emit::Op(OpCode::Close), Emit::Word(section.0)]);
            return Ok(());
        }

        let section = self.compile_function_body(func)?;
        self.functions.insert(key, section);
        self.emit([Emit::Op(OpCode::Close), Emit::Word(section.0)]);

        if role == FunctionRole::Declaration {
            if let Some(name) = &func.name {
                self.emit_store_variable(name);
                self.emit_op(OpCode::Pop);
            }
        }
        Ok(())
    }

    /// Compiles a function body into a fresh section with a fresh scope.
    fn compile_function_body(&mut self, func: &Function) -> Result<SectionId> {
        let section = self.sections.push_new_section();
        self.scopes.push_scope();
        let outer_loops = std::mem::take(&mut self.loops);
        debug!(
            section = section.0,
            name = func.name.as_deref().unwrap_or("<anonymous>"),
            params = func.params.len(),
            "compiling function"
        );

        if let Some(name) = &func.name {
            if let Some(slot) = self.scopes.declare(name) {
                self.emit([Emit::Op(OpCode::SetCallee), Emit::Word(slot)]);
            }
        }
        for (index, param) in func.params.iter().enumerate() {
            if let Some(slot) = self.scopes.declare(param) {
                self.emit([
                    Emit::Op(OpCode::SetArg),
                    Emit::Word(slot),
                    Emit::Word(index as u32),
                ]);
            }
        }

        self.hoist(&func.body)?;
        self.compile_statements(&func.body)?;
        self.emit_implicit_return();

        self.loops = outer_loops;
        self.scopes.pop_scope();
        self.sections.pop_section();
        Ok(section)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    fn emit_load_variable(&mut self, name: &str) {
        match self.scopes.resolve(name) {
            Some((slot, depth)) => {
                self.emit([Emit::Op(OpCode::PushVar), Emit::Word(slot), Emit::Word(depth)])
            }
            None => {
                let index = self.strings.intern(name);
                self.emit([Emit::Op(OpCode::PushGlobal), Emit::Word(index)]);
            }
        }
    }

    /// Stores the top of stack into `name`, leaving the value in place.
    fn emit_store_variable(&mut self, name: &str) {
        match self.scopes.resolve(name) {
            Some((slot, depth)) => {
                self.emit([Emit::Op(OpCode::SetVar), Emit::Word(slot), Emit::Word(depth)])
            }
            None => {
                let index = self.strings.intern(name);
                self.emit([Emit::Op(OpCode::SetGlobal), Emit::Word(index)]);
            }
        }
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Tracks recursion so pathological nesting fails cleanly.
    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(CompileError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    fn define_label(&mut self, label: Label) {
        self.emit([Emit::LabelDef(label)]);
    }

    fn emit_jump(&mut self, op: OpCode, target: Label) {
        debug_assert!(op.is_jump());
        self.emit([Emit::Op(op), Emit::LabelRef(target)]);
    }

    fn emit_implicit_return(&mut self) {
        self.emit([Emit::Op(OpCode::Undefined), Emit::Op(OpCode::Ret)]);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit([Emit::Op(op)]);
    }

    fn emit(&mut self, items: impl IntoIterator<Item = Emit>) {
        let section = self.sections.emit(items);
        debug_assert!(section.is_some(), "emit outside of any section");
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

/// Error for a node that cannot appear where it was found.
fn unsupported(node: &Node) -> CompileError {
    CompileError::unsupported(node.kind())
}
