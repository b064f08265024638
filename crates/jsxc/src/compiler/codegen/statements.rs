// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Statement compilation.
//!
//! | Statement | Key Operations | Notes |
//! |-----------|----------------|-------|
//! | `var` | `setvar` / `setglobal`, `pop` | Slot allocated by hoisting |
//! | `if/else` | `jif`, `jmp` | Conditional branching |
//! | `for` | `jif`, `jmp` (back) | Init, test, body, update |
//! | `while` | `jif`, `jmp` (back) | Loop with condition |
//! | `break/continue` | `jmp` | Innermost loop of the same function |
//! | `return` | `ret` | `undefined` when bare |
//! | expression | `pop` | Value discarded |
//!
//! ## If Statement
//!
//! ```text
//! if (condition) { then } else { else }
//!
//! Bytecode:
//!   [condition]
//!   jif else
//!   [then]
//!   jmp end
//! else:
//!   [else]
//! end:
//! ```
//!
//! ## For Loop
//!
//! ```text
//! for (init; test; update) body
//!
//! Bytecode:
//!   [init]
//! start:
//!   [test]
//!   jif end
//!   [body]          ; continue -> next, break -> end
//! next:
//!   [update]
//!   pop
//!   jmp start
//! end:
//! ```

use super::{Compiler, LoopLabels, unsupported, with_stack};
use crate::ast::Node;
use crate::compiler::bytecode::OpCode;
use crate::error::{CompileError, Result};

impl Compiler {
    /// Compiles a statement list in order.
    pub(super) fn compile_statements(&mut self, statements: &[Node]) -> Result<()> {
        for stmt in statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    /// Compiles a node in statement position, discarding any value it produces.
    pub(super) fn compile_statement(&mut self, stmt: &Node) -> Result<()> {
        self.enter()?;
        let result = with_stack(|| self.compile_statement_inner(stmt));
        self.leave();
        result
    }

    fn compile_statement_inner(&mut self, stmt: &Node) -> Result<()> {
        match stmt {
            Node::Declaration { name, init } => {
                if let Some(init) = init {
                    self.compile_expression(init)?;
                    self.emit_store_variable(name);
                    self.emit_op(OpCode::Pop);
                }
                Ok(())
            }
            Node::Return { argument } => {
                match argument {
                    Some(arg) => self.compile_expression(arg)?,
                    None => self.emit_op(OpCode::Undefined),
                }
                self.emit_op(OpCode::Ret);
                Ok(())
            }
            Node::If {
                test,
                consequent,
                alternate,
            } => self.compile_if(test, consequent, alternate.as_deref()),
            Node::ForLoop {
                init,
                test,
                update,
                body,
            } => self.compile_for(init.as_deref(), test.as_deref(), update.as_deref(), body),
            Node::While { test, body } => self.compile_while(test, body),
            Node::Break => {
                let target = self
                    .loops
                    .last()
                    .ok_or(CompileError::JumpOutsideLoop { keyword: "break" })?
                    .end;
                self.emit_jump(OpCode::Jmp, target);
                Ok(())
            }
            Node::Continue => {
                let target = self
                    .loops
                    .last()
                    .ok_or(CompileError::JumpOutsideLoop {
                        keyword: "continue",
                    })?
                    .next;
                self.emit_jump(OpCode::Jmp, target);
                Ok(())
            }
            Node::Body { statements } => self.compile_statements(statements),
            Node::Unsupported { .. } => Err(unsupported(stmt)),
            expr => {
                self.compile_expression(expr)?;
                self.emit_op(OpCode::Pop);
                Ok(())
            }
        }
    }

    fn compile_if(
        &mut self,
        test: &Node,
        consequent: &Node,
        alternate: Option<&Node>,
    ) -> Result<()> {
        let else_label = self.new_label();

        self.compile_expression(test)?;
        self.emit_jump(OpCode::Jif, else_label);
        self.compile_statement(consequent)?;

        match alternate {
            Some(alternate) => {
                let end_label = self.new_label();
                self.emit_jump(OpCode::Jmp, end_label);
                self.define_label(else_label);
                self.compile_statement(alternate)?;
                self.define_label(end_label);
            }
            None => self.define_label(else_label),
        }

        Ok(())
    }

    fn compile_for(
        &mut self,
        init: Option<&Node>,
        test: Option<&Node>,
        update: Option<&Node>,
        body: &Node,
    ) -> Result<()> {
        if let Some(init) = init {
            self.compile_statement(init)?;
        }

        let start = self.new_label();
        let next = self.new_label();
        let end = self.new_label();

        self.define_label(start);
        if let Some(test) = test {
            self.compile_expression(test)?;
            self.emit_jump(OpCode::Jif, end);
        }

        self.loops.push(LoopLabels { next, end });
        self.compile_statement(body)?;
        self.define_label(next);
        if let Some(update) = update {
            self.compile_expression(update)?;
            self.emit_op(OpCode::Pop);
        }
        self.emit_jump(OpCode::Jmp, start);
        self.define_label(end);
        self.loops.pop();

        Ok(())
    }

    fn compile_while(&mut self, test: &Node, body: &Node) -> Result<()> {
        let start = self.new_label();
        let end = self.new_label();

        self.define_label(start);
        self.compile_expression(test)?;
        self.emit_jump(OpCode::Jif, end);

        self.loops.push(LoopLabels { next: start, end });
        self.compile_statement(body)?;
        self.emit_jump(OpCode::Jmp, start);
        self.define_label(end);
        self.loops.pop();

        Ok(())
    }
}
