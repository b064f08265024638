// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Batch compilation on a thread pool.
//!
//! Compilations share no state, so independent programs can be compiled
//! side by side. Results come back in input order.

use rayon::prelude::*;

use crate::ast::Program;
use crate::compiler::{Compiler, Module};
use crate::config::CompilerConfig;
use crate::error::Result;

/// Compiles many programs in parallel.
#[derive(Debug, Clone, Default)]
pub struct ParallelCompiler {
    config: CompilerConfig,
}

impl ParallelCompiler {
    /// Creates a batch compiler applying `config` to every program.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Compiles each program to a module.
    pub fn compile_modules(&self, programs: &[Program]) -> Vec<Result<Module>> {
        programs
            .par_iter()
            .map(|program| Compiler::new(self.config.clone()).compile(program))
            .collect()
    }

    /// Compiles each program to its binary container.
    pub fn compile_parallel(&self, programs: &[Program]) -> Vec<Result<Vec<u8>>> {
        programs
            .par_iter()
            .map(|program| {
                Compiler::new(self.config.clone())
                    .compile(program)
                    .map(|module| module.to_bytes())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Node};

    #[test]
    fn test_parallel_matches_sequential() {
        let programs: Vec<Program> = (0..16)
            .map(|i| {
                Program::new(vec![Node::declare(
                    format!("v{}", i),
                    Some(Node::binary(
                        BinaryOperator::Multiply,
                        Node::number(i as f64),
                        Node::string("k"),
                    )),
                )])
            })
            .collect();

        let batch = ParallelCompiler::default().compile_parallel(&programs);
        for (program, result) in programs.iter().zip(batch) {
            assert_eq!(result.unwrap(), crate::compile(program).unwrap());
        }
    }

    #[test]
    fn test_errors_stay_per_program() {
        let programs = vec![
            Program::new(vec![Node::number(1.0)]),
            Program::new(vec![Node::Break]),
        ];
        let modules = ParallelCompiler::default().compile_modules(&programs);
        assert!(modules[0].is_ok());
        assert!(modules[1].is_err());
    }
}
