// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Abstract Syntax Tree (AST) consumed by the compiler.
//!
//! The tree is produced by an external parser and handed to the compiler
//! already built. Nodes are never mutated during compilation; per-node
//! compiler state (such as which section a function body landed in) lives
//! in side tables owned by the compiler.
//!
//! Every node type derives serde so parsers written in other languages
//! can hand trees over as JSON, tagged by `"type"`:
//!
//! ```json
//! { "type": "Binary", "operator": "Add",
//!   "left": { "type": "Number", "value": 1 },
//!   "right": { "type": "Number", "value": 2 } }
//! ```

use serde::{Deserialize, Serialize};

/// A complete program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// The top-level statements
    pub body: Vec<Node>,
}

impl Program {
    /// Creates a program from its top-level statements.
    pub fn new(body: Vec<Node>) -> Self {
        Self { body }
    }
}

/// A function literal, used both for declarations and expressions.
///
/// A `Function` in statement position is a declaration; anywhere else it is
/// an expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Function {
    /// The function name, absent for anonymous functions
    #[serde(default)]
    pub name: Option<String>,
    /// Parameter names, in argument order
    #[serde(default)]
    pub params: Vec<String>,
    /// The function body
    #[serde(default)]
    pub body: Vec<Node>,
}

/// An AST node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    // Statements
    /// `var name = init;`
    Declaration {
        /// Declared name
        name: String,
        /// Optional initializer
        #[serde(default)]
        init: Option<Box<Node>>,
    },
    /// Function declaration or expression
    Function(Function),
    /// `return argument;`
    Return {
        /// Returned value, `undefined` when absent
        #[serde(default)]
        argument: Option<Box<Node>>,
    },
    /// `if (test) consequent else alternate`
    If {
        /// The condition
        test: Box<Node>,
        /// The then branch
        consequent: Box<Node>,
        /// The optional else branch
        #[serde(default)]
        alternate: Option<Box<Node>>,
    },
    /// `for (init; test; update) body`
    ForLoop {
        /// Initializer, a declaration or an expression
        #[serde(default)]
        init: Option<Box<Node>>,
        /// Loop condition
        #[serde(default)]
        test: Option<Box<Node>>,
        /// Increment expression
        #[serde(default)]
        update: Option<Box<Node>>,
        /// Loop body
        body: Box<Node>,
    },
    /// `while (test) body`
    While {
        /// Loop condition
        test: Box<Node>,
        /// Loop body
        body: Box<Node>,
    },
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// A statement list (`{ ... }`)
    Body {
        /// The statements, in order
        statements: Vec<Node>,
    },

    // Expressions
    /// Variable reference
    Variable {
        /// The referenced name
        name: String,
    },
    /// Number literal
    Number {
        /// The value
        value: f64,
    },
    /// String literal
    String {
        /// The value
        value: String,
    },
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `[a, b, ...]`
    Array {
        /// The elements, in order
        elements: Vec<Node>,
    },
    /// `object.property`
    Member {
        /// The object
        object: Box<Node>,
        /// The property name
        property: String,
    },
    /// `object[index]`
    Index {
        /// The object
        object: Box<Node>,
        /// The index expression
        index: Box<Node>,
    },
    /// `callee(arguments...)`
    Call {
        /// The callee
        callee: Box<Node>,
        /// The arguments, in order
        #[serde(default)]
        arguments: Vec<Node>,
    },
    /// `target = value`
    Assignment {
        /// The assignment target
        target: Box<Node>,
        /// The assigned value
        value: Box<Node>,
    },
    /// `left op right`, or `left op= right` when `assign` is set
    Binary {
        /// The operator
        operator: BinaryOperator,
        /// The left operand (the target, for compound assignment)
        left: Box<Node>,
        /// The right operand
        right: Box<Node>,
        /// Whether this is a compound assignment
        #[serde(default)]
        assign: bool,
    },
    /// `left && right` / `left || right`
    Logical {
        /// The operator
        operator: LogicalOperator,
        /// The left operand
        left: Box<Node>,
        /// The right operand
        right: Box<Node>,
    },
    /// `op argument`
    Unary {
        /// The operator
        operator: UnaryOperator,
        /// The operand
        argument: Box<Node>,
    },
    /// `++x`, `x++`, `--x`, `x--`
    Update {
        /// Increment or decrement
        operator: UpdateOperator,
        /// Whether the operator precedes the argument
        #[serde(default)]
        prefix: bool,
        /// The target
        argument: Box<Node>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// The condition
        test: Box<Node>,
        /// Value when the condition holds
        consequent: Box<Node>,
        /// Value otherwise
        alternate: Box<Node>,
    },
    /// `a, b, c`
    MultiExpression {
        /// The expressions, in order; the last one is the value
        expressions: Vec<Node>,
    },

    /// A construct the parser recognised but the compiler has no handler for
    Unsupported {
        /// The construct's kind, as named by the parser
        kind: String,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    // Comparison
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    // Bitwise
    /// `&`
    BitwiseAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `>>>`
    UnsignedRightShift,
    // Other
    /// `in`
    In,
    /// `instanceof`
    InstanceOf,
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// &&
    And,
    /// ||
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// !
    LogicalNot,
    /// typeof
    Typeof,
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperator {
    /// ++
    Increment,
    /// --
    Decrement,
}

impl Node {
    /// The name of this node's kind, as used in diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Node::Declaration { .. } => "Declaration",
            Node::Function(_) => "Function",
            Node::Return { .. } => "Return",
            Node::If { .. } => "If",
            Node::ForLoop { .. } => "ForLoop",
            Node::While { .. } => "While",
            Node::Break => "Break",
            Node::Continue => "Continue",
            Node::Body { .. } => "Body",
            Node::Variable { .. } => "Variable",
            Node::Number { .. } => "Number",
            Node::String { .. } => "String",
            Node::True => "True",
            Node::False => "False",
            Node::Null => "Null",
            Node::Undefined => "Undefined",
            Node::Array { .. } => "Array",
            Node::Member { .. } => "Member",
            Node::Index { .. } => "Index",
            Node::Call { .. } => "Call",
            Node::Assignment { .. } => "Assignment",
            Node::Binary { .. } => "Binary",
            Node::Logical { .. } => "Logical",
            Node::Unary { .. } => "Unary",
            Node::Update { .. } => "Update",
            Node::Conditional { .. } => "Conditional",
            Node::MultiExpression { .. } => "MultiExpression",
            Node::Unsupported { kind } => kind,
        }
    }

    /// Whether compiling this node leaves a value on the stack.
    pub fn is_expression(&self) -> bool {
        !matches!(
            self,
            Node::Declaration { .. }
                | Node::Return { .. }
                | Node::If { .. }
                | Node::ForLoop { .. }
                | Node::While { .. }
                | Node::Break
                | Node::Continue
                | Node::Body { .. }
                | Node::Unsupported { .. }
        )
    }

    // Builders, mostly for hand-assembled trees in tests.

    /// `name`
    pub fn var(name: impl Into<String>) -> Self {
        Node::Variable { name: name.into() }
    }

    /// A number literal.
    pub fn number(value: f64) -> Self {
        Node::Number { value }
    }

    /// A string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Node::String {
            value: value.into(),
        }
    }

    /// `var name = init;`
    pub fn declare(name: impl Into<String>, init: Option<Node>) -> Self {
        Node::Declaration {
            name: name.into(),
            init: init.map(Box::new),
        }
    }

    /// `left op right`
    pub fn binary(operator: BinaryOperator, left: Node, right: Node) -> Self {
        Node::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            assign: false,
        }
    }

    /// `left op= right`
    pub fn compound(operator: BinaryOperator, left: Node, right: Node) -> Self {
        Node::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            assign: true,
        }
    }

    /// `target = value`
    pub fn assign(target: Node, value: Node) -> Self {
        Node::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// `callee(arguments...)`
    pub fn call(callee: Node, arguments: Vec<Node>) -> Self {
        Node::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    /// `object.property`
    pub fn member(object: Node, property: impl Into<String>) -> Self {
        Node::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// `object[index]`
    pub fn index(object: Node, index: Node) -> Self {
        Node::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    /// `return argument;`
    pub fn ret(argument: Option<Node>) -> Self {
        Node::Return {
            argument: argument.map(Box::new),
        }
    }

    /// `function name(params) { body }`
    pub fn function(name: Option<&str>, params: &[&str], body: Vec<Node>) -> Self {
        Node::Function(Function {
            name: name.map(str::to_string),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
        })
    }

    /// `{ statements }`
    pub fn body(statements: Vec<Node>) -> Self {
        Node::Body { statements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_kinds_produce_no_value() {
        assert!(!Node::declare("x", None).is_expression());
        assert!(!Node::ret(None).is_expression());
        assert!(!Node::Break.is_expression());
        assert!(Node::number(1.0).is_expression());
        assert!(Node::function(Some("f"), &[], vec![]).is_expression());
    }

    #[test]
    fn test_unsupported_reports_parser_kind() {
        let node = Node::Unsupported {
            kind: "WithStatement".into(),
        };
        assert_eq!(node.kind(), "WithStatement");
    }

    #[test]
    fn test_deserialize_tagged_json() {
        let json = r#"{
            "type": "Binary",
            "operator": "Add",
            "left": { "type": "Number", "value": 1 },
            "right": { "type": "Variable", "name": "x" }
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(
            node,
            Node::binary(BinaryOperator::Add, Node::number(1.0), Node::var("x"))
        );
    }

    #[test]
    fn test_deserialize_function_defaults() {
        let json = r#"{ "type": "Function", "name": "f" }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node, Node::function(Some("f"), &[], vec![]));
    }
}
