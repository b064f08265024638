// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the compiler.
//!
//! Every error is fatal: compilation stops at the first one and no
//! bytecode is produced.

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that can occur while compiling an AST
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A node kind with no compiler handler, or a statement used as a value
    #[error("unsupported construct: {kind}")]
    UnsupportedConstruct {
        /// The offending node kind
        kind: String,
    },

    /// Assignment or update applied to something other than a variable,
    /// member access, or indexed access
    #[error("bad assignment target: {kind}")]
    InvalidAssignmentTarget {
        /// The kind of the left-hand side
        kind: String,
    },

    /// A jump references a label never defined in its section
    #[error("unresolved label L{label} in section {section}")]
    UnresolvedLabel {
        /// Section holding the reference
        section: u32,
        /// The missing label
        label: u32,
    },

    /// The tree nests deeper than the configured limit
    #[error("nesting depth exceeds the limit of {limit}")]
    NestingTooDeep {
        /// The configured limit
        limit: usize,
    },

    /// `break` or `continue` with no enclosing loop in the same function
    #[error("`{keyword}` outside of a loop")]
    JumpOutsideLoop {
        /// `break` or `continue`
        keyword: &'static str,
    },

    /// An artifact that is not a well-formed module
    #[error("malformed module: {0}")]
    MalformedModule(String),

    /// Invalid configuration document
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CompileError {
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct { kind: kind.into() }
    }

    pub(crate) fn bad_target(kind: impl Into<String>) -> Self {
        CompileError::InvalidAssignmentTarget { kind: kind.into() }
    }
}

impl From<toml::de::Error> for CompileError {
    fn from(err: toml::de::Error) -> Self {
        CompileError::Config(err.message().to_string())
    }
}
