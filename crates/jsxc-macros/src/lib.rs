// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Declarative macros for the jsxc bytecode compiler.
//!
//! # Macros Overview
//!
//! ## Bytecode
//! - [`opcodes!`] - Define an opcode enum with stable wire values
//!
//! ## Testing
//! - [`assert_ok!`] - Assert a `Result` is `Ok` and extract the value
//! - [`assert_err!`] - Assert a `Result` is `Err` and extract the error
//! - [`assert_matches!`] - Assert a value matches a pattern
//!
//! # Examples
//!
//! ```
//! use jsxc_macros::*;
//!
//! opcodes! {
//!     /// Tiny instruction set.
//!     Op: u32 {
//!         Halt = 0,
//!         Push = 1,
//!     }
//! }
//!
//! assert_eq!(Op::Push.code(), 1);
//! assert_eq!(assert_ok!(Op::try_from(0u32)), Op::Halt);
//! assert_err!(Op::try_from(7u32));
//! ```

#![warn(missing_docs)]

mod opcodes;
mod testing;
