// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compiled modules and their binary container.
//!
//! All integers are little-endian `u32`:
//!
//! ```text
//! magic          "JSX\0"
//! section_count
//! section_count x { length, bytes[length] }
//! string_count
//! string_count x { length, bytes[length], 0x00 }
//! ```
//!
//! Section 0 is the top-level program; function sections follow in the
//! order they were created.

use std::io::{self, Write};

use super::bytecode::{OpCode, WORD};
use crate::error::{CompileError, Result};

/// Leading bytes of every module.
pub const MAGIC: [u8; 4] = *b"JSX\0";

/// A compiled program: encoded sections plus the shared string table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    /// Encoded sections, in creation order
    pub sections: Vec<Vec<u8>>,
    /// Interned strings, in index order
    pub strings: Vec<String>,
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Word offset of the opcode within its section
    pub offset: u32,
    /// The operation code
    pub opcode: OpCode,
    /// Raw immediate words
    pub operands: Vec<u32>,
}

impl Instruction {
    /// The number immediate of a `pushnum`.
    pub fn number(&self) -> Option<f64> {
        match (self.opcode, self.operands.as_slice()) {
            (OpCode::PushNum, [lo, hi]) => {
                let bits = (*lo as u64) | ((*hi as u64) << 32);
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }
}

impl Module {
    /// Serializes the module into its binary container.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    /// Writes the binary container to `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&MAGIC)?;
        write_u32(out, self.sections.len() as u32)?;
        for section in &self.sections {
            write_u32(out, section.len() as u32)?;
            out.write_all(section)?;
        }
        write_u32(out, self.strings.len() as u32)?;
        for s in &self.strings {
            write_u32(out, s.len() as u32)?;
            out.write_all(s.as_bytes())?;
            out.write_all(&[0])?;
        }
        Ok(())
    }

    /// Reads a module back from its binary container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader { bytes, pos: 0 };
        if reader.take(MAGIC.len())? != MAGIC {
            return Err(CompileError::MalformedModule("bad magic".into()));
        }

        let section_count = reader.u32()?;
        let mut sections = Vec::new();
        for _ in 0..section_count {
            let len = reader.u32()? as usize;
            sections.push(reader.take(len)?.to_vec());
        }

        let string_count = reader.u32()?;
        let mut strings = Vec::new();
        for _ in 0..string_count {
            let len = reader.u32()? as usize;
            let raw = reader.take(len)?.to_vec();
            if reader.take(1)? != [0u8] {
                return Err(CompileError::MalformedModule(
                    "string missing terminator".into(),
                ));
            }
            let s = String::from_utf8(raw)
                .map_err(|e| CompileError::MalformedModule(e.to_string()))?;
            strings.push(s);
        }

        if reader.pos != bytes.len() {
            return Err(CompileError::MalformedModule(format!(
                "{} trailing bytes",
                bytes.len() - reader.pos
            )));
        }
        Ok(Self { sections, strings })
    }

    /// Decodes the instructions of one section.
    pub fn instructions(&self, section: usize) -> Result<Vec<Instruction>> {
        let bytes = self.sections.get(section).ok_or_else(|| {
            CompileError::MalformedModule(format!("no section {}", section))
        })?;
        decode_section(bytes)
    }
}

/// Decodes an encoded section into instructions.
pub fn decode_section(bytes: &[u8]) -> Result<Vec<Instruction>> {
    if bytes.len() % WORD != 0 {
        return Err(CompileError::MalformedModule(
            "section is not word aligned".into(),
        ));
    }
    let words: Vec<u32> = bytes
        .chunks_exact(WORD)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let mut instructions = Vec::new();
    let mut pos = 0;
    while pos < words.len() {
        let opcode = OpCode::try_from(words[pos]).map_err(|code| {
            CompileError::MalformedModule(format!("unknown opcode {} at word {}", code, pos))
        })?;
        let end = pos + 1 + opcode.operand_words();
        let operands = words
            .get(pos + 1..end)
            .ok_or_else(|| {
                CompileError::MalformedModule(format!("truncated {} at word {}", opcode.name(), pos))
            })?
            .to_vec();
        instructions.push(Instruction {
            offset: pos as u32,
            opcode,
            operands,
        });
        pos = end;
    }
    Ok(instructions)
}

fn write_u32<W: Write>(out: &mut W, value: u32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| CompileError::MalformedModule("unexpected end of module".into()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
