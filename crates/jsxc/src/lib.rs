// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # jsxc
//!
//! Compiles a JavaScript AST into a JSX bytecode module for a separate
//! virtual machine.
//!
//! ## Overview
//!
//! - Two-pass compilation of every statement list: hoisting, then emission
//! - One bytecode section per function body plus one for the top level
//! - Compile-time slot allocation with lexical depth for locals
//! - Forward and backward jumps resolved to word offsets per section
//! - A shared, deduplicated string table
//! - A byte-exact, word-aligned binary container
//!
//! Parsing is not part of this crate; trees arrive already built, either
//! constructed directly or deserialized from JSON.
//!
//! ## Quick Start
//!
//! ```rust
//! use jsxc::ast::{BinaryOperator, Node, Program};
//!
//! // return 1 + 2;
//! let program = Program::new(vec![Node::ret(Some(Node::binary(
//!     BinaryOperator::Add,
//!     Node::number(1.0),
//!     Node::number(2.0),
//! )))]);
//!
//! let bytes = jsxc::compile(&program).unwrap();
//! assert_eq!(&bytes[..4], b"JSX\0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;

// Re-exports for convenience
pub use ast::Program;
pub use compiler::{Compiler, Module};
pub use config::CompilerConfig;
pub use error::{CompileError, Result};
#[cfg(feature = "parallel")]
pub use parallel::ParallelCompiler;

/// Compiles a program into its binary container with the default
/// configuration.
///
/// On error nothing is produced.
pub fn compile(program: &Program) -> Result<Vec<u8>> {
    compile_with(program, &CompilerConfig::default())
}

/// Compiles a program into its binary container.
pub fn compile_with(program: &Program, config: &CompilerConfig) -> Result<Vec<u8>> {
    Ok(compile_module(program, config)?.to_bytes())
}

/// Compiles a program into a module without serializing it.
pub fn compile_module(program: &Program, config: &CompilerConfig) -> Result<Module> {
    Compiler::new(config.clone()).compile(program)
}
