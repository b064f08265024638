// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bytecode compiler for JavaScript.
//!
//! Transforms an AST into a module that can be executed by the VM.
//!
//! # Module Structure
//!
//! - `bytecode`: Opcode table and section emission items
//! - `strings`: String interning shared by all sections
//! - `section`: Section storage and the current-section stack
//! - `fixup`: Label resolution into word offsets
//! - `codegen`: Code generation from AST
//!   - `codegen::scope`: Scope management for variable resolution
//! - `module`: The compiled module and its binary container

pub mod bytecode;
pub mod codegen;
pub mod fixup;
pub mod module;
pub mod section;
pub mod strings;

pub use bytecode::{Emit, Label, OpCode};
pub use codegen::Compiler;
pub use module::{Instruction, MAGIC, Module};
pub use section::{SectionId, SectionStore};
pub use strings::StringTable;
