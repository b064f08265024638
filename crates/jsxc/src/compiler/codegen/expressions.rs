// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Expression compilation.
//!
//! Every expression leaves exactly one value on the stack.
//!
//! | Expression | Key Operations | Stack Effect |
//! |------------|----------------|--------------|
//! | Literal | `pushnum` / `pushstr` / `true` ... | Push value |
//! | Variable | `pushvar` / `pushglobal` | Push value |
//! | Binary | `add` / `lt` / ... | Pop 2, push 1 |
//! | Assignment | `setvar` / `setglobal` / `setmember` / `setindex` | Push value |
//! | Call | `call` / `methcall` | Pop N+1 (N+2), push result |
//! | Array | `array` | Pop N, push 1 |
//! | Function | `close` | Push closure |
//!
//! ## Compound assignment
//!
//! ```text
//! a.b += v             a[k] += v
//!
//!   [a]                  [a]
//!   dup                  [k]
//!   member b             dup2
//!   [v]                  index
//!   add                  [v]
//!   setmember b          add
//!                        setindex
//! ```
//!
//! ## Post-increment on properties
//!
//! The old value is parked in the frame's temporary register while the
//! store runs:
//!
//! ```text
//! a.b++
//!
//!   [a]
//!   dup
//!   member b    ; stack: [a, old]
//!   tst
//!   inc
//!   setmember b ; stack: [new]
//!   pop
//!   tld         ; stack: [old]
//! ```

use super::{Compiler, FunctionRole, unsupported, with_stack};
use crate::ast::{BinaryOperator, LogicalOperator, Node, UnaryOperator, UpdateOperator};
use crate::compiler::bytecode::{Emit, OpCode};
use crate::error::{CompileError, Result};

/// Shape of an assignable left-hand side.
enum Target<'a> {
    Variable(&'a str),
    Member(&'a Node, &'a str),
    Index(&'a Node, &'a Node),
}

impl<'a> Target<'a> {
    fn of(node: &'a Node) -> Result<Self> {
        match node {
            Node::Variable { name } => Ok(Target::Variable(name)),
            Node::Member { object, property } => Ok(Target::Member(object, property)),
            Node::Index { object, index } => Ok(Target::Index(object, index)),
            other => Err(CompileError::bad_target(other.kind())),
        }
    }
}

impl Compiler {
    /// Compiles a node that must produce a value.
    pub(super) fn compile_expression(&mut self, expr: &Node) -> Result<()> {
        if !expr.is_expression() {
            return Err(unsupported(expr));
        }
        self.enter()?;
        let result = with_stack(|| self.compile_expression_inner(expr));
        self.leave();
        result
    }

    fn compile_expression_inner(&mut self, expr: &Node) -> Result<()> {
        match expr {
            Node::Number { value } => {
                self.emit([Emit::Op(OpCode::PushNum), Emit::Number(*value)]);
            }
            Node::String { value } => {
                let index = self.strings.intern(value);
                self.emit([Emit::Op(OpCode::PushStr), Emit::Word(index)]);
            }
            Node::True => self.emit_op(OpCode::True),
            Node::False => self.emit_op(OpCode::False),
            Node::Null => self.emit_op(OpCode::Null),
            Node::Undefined => self.emit_op(OpCode::Undefined),
            Node::Variable { name } => self.emit_load_variable(name),
            Node::Array { elements } => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit([Emit::Op(OpCode::Array), Emit::Word(elements.len() as u32)]);
            }
            Node::Member { object, property } => {
                self.compile_expression(object)?;
                self.emit_member(OpCode::Member, property);
            }
            Node::Index { object, index } => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                self.emit_op(OpCode::Index);
            }
            Node::Function(func) => self.compile_function(func, FunctionRole::Expression)?,
            Node::Call { callee, arguments } => self.compile_call(callee, arguments)?,
            Node::Assignment { target, value } => self.compile_assignment(target, value)?,
            Node::Binary {
                operator,
                left,
                right,
                assign: false,
            } => {
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                self.emit_op(binary_opcode(*operator));
            }
            Node::Binary {
                operator,
                left,
                right,
                assign: true,
            } => self.compile_compound(*operator, left, right)?,
            Node::Logical {
                operator,
                left,
                right,
            } => self.compile_logical(*operator, left, right)?,
            Node::Unary { operator, argument } => {
                self.compile_expression(argument)?;
                self.emit_op(match operator {
                    UnaryOperator::Minus => OpCode::Neg,
                    UnaryOperator::LogicalNot => OpCode::Not,
                    UnaryOperator::Typeof => OpCode::TypeOf,
                });
            }
            Node::Update {
                operator,
                prefix,
                argument,
            } => self.compile_update(*operator, *prefix, argument)?,
            Node::Conditional {
                test,
                consequent,
                alternate,
            } => self.compile_conditional(test, consequent, alternate)?,
            Node::MultiExpression { expressions } => self.compile_sequence(expressions)?,
            other => return Err(unsupported(other)),
        }
        Ok(())
    }

    fn compile_call(&mut self, callee: &Node, arguments: &[Node]) -> Result<()> {
        // Method calls keep the receiver on the stack for the callee.
        let op = match callee {
            Node::Member { object, property } => {
                self.compile_expression(object)?;
                let index = self.strings.intern(property);
                self.emit([Emit::Op(OpCode::PushStr), Emit::Word(index)]);
                OpCode::MethCall
            }
            Node::Index { object, index } => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                OpCode::MethCall
            }
            _ => {
                self.compile_expression(callee)?;
                OpCode::Call
            }
        };

        for arg in arguments {
            self.compile_expression(arg)?;
        }
        self.emit([Emit::Op(op), Emit::Word(arguments.len() as u32)]);
        Ok(())
    }

    fn compile_assignment(&mut self, target: &Node, value: &Node) -> Result<()> {
        match Target::of(target)? {
            Target::Variable(name) => {
                self.compile_expression(value)?;
                self.emit_store_variable(name);
            }
            Target::Member(object, property) => {
                self.compile_expression(object)?;
                self.compile_expression(value)?;
                self.emit_member(OpCode::SetMember, property);
            }
            Target::Index(object, index) => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                self.compile_expression(value)?;
                self.emit_op(OpCode::SetIndex);
            }
        }
        Ok(())
    }

    /// `target op= value`: read, combine, store back.
    fn compile_compound(
        &mut self,
        operator: BinaryOperator,
        target: &Node,
        value: &Node,
    ) -> Result<()> {
        let op = binary_opcode(operator);
        match Target::of(target)? {
            Target::Variable(name) => {
                self.emit_load_variable(name);
                self.compile_expression(value)?;
                self.emit_op(op);
                self.emit_store_variable(name);
            }
            Target::Member(object, property) => {
                self.compile_expression(object)?;
                self.emit_op(OpCode::Dup);
                self.emit_member(OpCode::Member, property);
                self.compile_expression(value)?;
                self.emit_op(op);
                self.emit_member(OpCode::SetMember, property);
            }
            Target::Index(object, index) => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                self.emit_op(OpCode::Dup2);
                self.emit_op(OpCode::Index);
                self.compile_expression(value)?;
                self.emit_op(op);
                self.emit_op(OpCode::SetIndex);
            }
        }
        Ok(())
    }

    /// `++x`, `x++`, `--x`, `x--` on any assignable target.
    fn compile_update(
        &mut self,
        operator: UpdateOperator,
        prefix: bool,
        argument: &Node,
    ) -> Result<()> {
        let step = match operator {
            UpdateOperator::Increment => OpCode::Inc,
            UpdateOperator::Decrement => OpCode::Dec,
        };

        match Target::of(argument)? {
            Target::Variable(name) => {
                self.emit_load_variable(name);
                if !prefix {
                    self.emit_op(OpCode::Dup);
                }
                self.emit_op(step);
                self.emit_store_variable(name);
                if !prefix {
                    self.emit_op(OpCode::Pop);
                }
            }
            Target::Member(object, property) => {
                self.compile_expression(object)?;
                self.emit_op(OpCode::Dup);
                self.emit_member(OpCode::Member, property);
                if !prefix {
                    self.emit_op(OpCode::Tst);
                }
                self.emit_op(step);
                self.emit_member(OpCode::SetMember, property);
                if !prefix {
                    self.emit_op(OpCode::Pop);
                    self.emit_op(OpCode::Tld);
                }
            }
            Target::Index(object, index) => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                self.emit_op(OpCode::Dup2);
                self.emit_op(OpCode::Index);
                if !prefix {
                    self.emit_op(OpCode::Tst);
                }
                self.emit_op(step);
                self.emit_op(OpCode::SetIndex);
                if !prefix {
                    self.emit_op(OpCode::Pop);
                    self.emit_op(OpCode::Tld);
                }
            }
        }
        Ok(())
    }

    /// Short-circuit `&&` / `||`: the deciding operand is the result.
    fn compile_logical(
        &mut self,
        operator: LogicalOperator,
        left: &Node,
        right: &Node,
    ) -> Result<()> {
        let end = self.new_label();
        let jump = match operator {
            LogicalOperator::And => OpCode::Jif,
            LogicalOperator::Or => OpCode::Jit,
        };

        self.compile_expression(left)?;
        self.emit_op(OpCode::Dup);
        self.emit_jump(jump, end);
        self.emit_op(OpCode::Pop);
        self.compile_expression(right)?;
        self.define_label(end);
        Ok(())
    }

    fn compile_conditional(&mut self, test: &Node, consequent: &Node, alternate: &Node) -> Result<()> {
        let else_label = self.new_label();
        let end_label = self.new_label();

        self.compile_expression(test)?;
        self.emit_jump(OpCode::Jif, else_label);
        self.compile_expression(consequent)?;
        self.emit_jump(OpCode::Jmp, end_label);
        self.define_label(else_label);
        self.compile_expression(alternate)?;
        self.define_label(end_label);
        Ok(())
    }

    /// Comma expressions: every value but the last is discarded.
    fn compile_sequence(&mut self, expressions: &[Node]) -> Result<()> {
        let Some((last, rest)) = expressions.split_last() else {
            self.emit_op(OpCode::Undefined);
            return Ok(());
        };
        for expr in rest {
            self.compile_expression(expr)?;
            self.emit_op(OpCode::Pop);
        }
        self.compile_expression(last)
    }

    fn emit_member(&mut self, op: OpCode, property: &str) {
        let index = self.strings.intern(property);
        self.emit([Emit::Op(op), Emit::Word(index)]);
    }
}

fn binary_opcode(operator: BinaryOperator) -> OpCode {
    match operator {
        BinaryOperator::Add => OpCode::Add,
        BinaryOperator::Subtract => OpCode::Sub,
        BinaryOperator::Multiply => OpCode::Mul,
        BinaryOperator::Divide => OpCode::Div,
        BinaryOperator::Modulo => OpCode::Mod,
        BinaryOperator::LessThan => OpCode::Lt,
        BinaryOperator::LessThanEqual => OpCode::Lte,
        BinaryOperator::GreaterThan => OpCode::Gt,
        BinaryOperator::GreaterThanEqual => OpCode::Gte,
        BinaryOperator::Equal => OpCode::Eq,
        BinaryOperator::NotEqual => OpCode::Neq,
        BinaryOperator::StrictEqual => OpCode::StrictEq,
        BinaryOperator::StrictNotEqual => OpCode::StrictNeq,
        BinaryOperator::BitwiseAnd => OpCode::BitAnd,
        BinaryOperator::BitwiseOr => OpCode::BitOr,
        BinaryOperator::BitwiseXor => OpCode::BitXor,
        BinaryOperator::LeftShift => OpCode::Shl,
        BinaryOperator::RightShift => OpCode::Shr,
        BinaryOperator::UnsignedRightShift => OpCode::Ushr,
        BinaryOperator::In => OpCode::In,
        BinaryOperator::InstanceOf => OpCode::InstanceOf,
    }
}
