// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compiler configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default limit on AST recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Configuration for one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting of statements, expressions, and functions.
    /// Deeper trees fail with `NestingTooDeep`. The compiler grows its
    /// stack on the heap as it recurses, so the limit is not tied to the
    /// thread's stack size.
    pub max_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CompilerConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use jsxc_macros::{assert_err, assert_matches, assert_ok};

    #[test]
    fn test_toml_overrides_depth() {
        let config = assert_ok!(CompilerConfig::from_toml_str("max_depth = 64"));
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = assert_ok!(CompilerConfig::from_toml_str(""));
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = assert_err!(CompilerConfig::from_toml_str("max_depth = \"deep\""));
        assert_matches!(err, CompileError::Config(_));
    }
}
