// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Label resolution.
//!
//! A section's emission stream interleaves real items with label
//! definitions and label references. Resolution is two passes:
//!
//! 1. Walk the items with a running byte offset. A definition records
//!    `offset / 4` for its label; a reference reserves one word.
//! 2. Walk again, dropping definitions and replacing each reference with
//!    the little-endian word offset of its label.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::bytecode::{Emit, Label, WORD};
use crate::error::{CompileError, Result};

/// Encodes a section's items, resolving every label reference.
pub fn resolve(section: u32, items: &[Emit]) -> Result<Vec<u8>> {
    let mut targets: FxHashMap<Label, u32> = FxHashMap::default();
    let mut offset = 0usize;
    for item in items {
        if let Emit::LabelDef(label) = item {
            let word = (offset / WORD) as u32;
            trace!(section, label = label.0, word, "label defined");
            targets.insert(*label, word);
        }
        offset += item.size();
    }

    let mut bytes = Vec::with_capacity(offset);
    for item in items {
        match item {
            Emit::Op(op) => bytes.extend_from_slice(&op.code().to_le_bytes()),
            Emit::Word(word) => bytes.extend_from_slice(&word.to_le_bytes()),
            Emit::Number(n) => bytes.extend_from_slice(&n.to_le_bytes()),
            Emit::LabelDef(_) => {}
            Emit::LabelRef(label) => {
                let target = targets
                    .get(label)
                    .copied()
                    .ok_or(CompileError::UnresolvedLabel {
                        section,
                        label: label.0,
                    })?;
                bytes.extend_from_slice(&target.to_le_bytes());
            }
        }
    }

    Ok(bytes)
}
