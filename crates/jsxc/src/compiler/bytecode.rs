// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bytecode definitions.
//!
//! Every encoded item is a whole number of little-endian 32-bit words:
//! opcodes, slot indices, string indices, counts and jump targets take one
//! word, number literals take two. Jump targets are word indices into the
//! owning section.

use jsxc_macros::opcodes;

/// Size of one bytecode word, in bytes.
pub const WORD: usize = 4;

opcodes! {
    /// Operation codes understood by the VM.
    ///
    /// Codes are part of the wire format and never change once assigned.
    OpCode: u32 {
        /// Push undefined
        Undefined = 0 => "undefined",
        /// Return the top of stack
        Ret = 1 => "ret",
        /// Push a number (two-word f64 immediate)
        PushNum = 2 => "pushnum",
        /// Add top two values
        Add = 3 => "add",
        /// Push a global (string index)
        PushGlobal = 4 => "pushglobal",
        /// Push a string (string index)
        PushStr = 5 => "pushstr",
        /// Call a method (argument count); stack: object, key, args
        MethCall = 6 => "methcall",
        /// Store to a local (slot, depth), keeping the value
        SetVar = 7 => "setvar",
        /// Push a local (slot, depth)
        PushVar = 8 => "pushvar",
        /// Push true
        True = 9 => "true",
        /// Push false
        False = 10 => "false",
        /// Push null
        Null = 11 => "null",
        /// Unconditional jump (word offset)
        Jmp = 12 => "jmp",
        /// Pop, jump if true (word offset)
        Jit = 13 => "jit",
        /// Pop, jump if false (word offset)
        Jif = 14 => "jif",
        /// Subtract
        Sub = 15 => "sub",
        /// Multiply
        Mul = 16 => "mul",
        /// Divide
        Div = 17 => "div",
        /// Store to a global (string index), keeping the value
        SetGlobal = 18 => "setglobal",
        /// Create a closure over a section (section index)
        Close = 19 => "close",
        /// Call a function (argument count); stack: callee, args
        Call = 20 => "call",
        /// Bind the running closure to a slot (slot)
        SetCallee = 21 => "setcallee",
        /// Bind an argument to a slot (slot, argument index)
        SetArg = 22 => "setarg",
        /// Less than
        Lt = 23 => "lt",
        /// Less than or equal
        Lte = 24 => "lte",
        /// Greater than
        Gt = 25 => "gt",
        /// Greater than or equal
        Gte = 26 => "gte",
        /// Pop the top value
        Pop = 27 => "pop",
        /// Build an array from the top N values (element count)
        Array = 28 => "array",
        /// Modulo
        Mod = 29 => "mod",
        /// Equal (==)
        Eq = 30 => "eq",
        /// Not equal (!=)
        Neq = 31 => "neq",
        /// Strict equal (===)
        StrictEq = 32 => "seq",
        /// Strict not equal (!==)
        StrictNeq = 33 => "sneq",
        /// Bitwise AND
        BitAnd = 34 => "band",
        /// Bitwise OR
        BitOr = 35 => "bor",
        /// Bitwise XOR
        BitXor = 36 => "bxor",
        /// Left shift
        Shl = 37 => "shl",
        /// Signed right shift
        Shr = 38 => "shr",
        /// Unsigned right shift
        Ushr = 39 => "ushr",
        /// in operator
        In = 40 => "in",
        /// instanceof operator
        InstanceOf = 41 => "instanceof",
        /// Duplicate the top value
        Dup = 42 => "dup",
        /// Duplicate the top two values
        Dup2 = 43 => "dup2",
        /// Get a named property (string index); stack: object
        Member = 44 => "member",
        /// Set a named property (string index); stack: object, value
        SetMember = 45 => "setmember",
        /// Get an indexed property; stack: object, key
        Index = 46 => "index",
        /// Set an indexed property; stack: object, key, value
        SetIndex = 47 => "setindex",
        /// Logical NOT
        Not = 48 => "not",
        /// Negate
        Neg = 49 => "neg",
        /// typeof operator
        TypeOf = 50 => "typeof",
        /// Add one
        Inc = 51 => "inc",
        /// Subtract one
        Dec = 52 => "dec",
        /// Copy the top value into the frame's temporary register
        Tst = 53 => "tst",
        /// Push the frame's temporary register
        Tld = 54 => "tld",
    }
}

impl OpCode {
    /// Number of immediate words following this opcode.
    pub fn operand_words(self) -> usize {
        match self {
            OpCode::PushNum | OpCode::SetVar | OpCode::PushVar | OpCode::SetArg => 2,
            OpCode::PushGlobal
            | OpCode::PushStr
            | OpCode::MethCall
            | OpCode::Jmp
            | OpCode::Jit
            | OpCode::Jif
            | OpCode::SetGlobal
            | OpCode::Close
            | OpCode::Call
            | OpCode::SetCallee
            | OpCode::Array
            | OpCode::Member
            | OpCode::SetMember => 1,
            _ => 0,
        }
    }

    /// Whether the only immediate is a jump target.
    pub fn is_jump(self) -> bool {
        matches!(self, OpCode::Jmp | OpCode::Jit | OpCode::Jif)
    }
}

/// A jump target within one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

/// One item in a section's emission stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    /// An opcode
    Op(OpCode),
    /// A one-word immediate (slot, depth, count, string or section index)
    Word(u32),
    /// A two-word number immediate
    Number(f64),
    /// Definition point of a label; occupies no space
    LabelDef(Label),
    /// One word to be replaced by the label's word offset
    LabelRef(Label),
}

impl Emit {
    /// Encoded size of this item, in bytes.
    pub fn size(&self) -> usize {
        match self {
            Emit::Op(_) | Emit::Word(_) | Emit::LabelRef(_) => WORD,
            Emit::Number(_) => 2 * WORD,
            Emit::LabelDef(_) => 0,
        }
    }
}

impl From<OpCode> for Emit {
    fn from(op: OpCode) -> Self {
        Emit::Op(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_codes_are_fixed() {
        assert_eq!(OpCode::Undefined.code(), 0);
        assert_eq!(OpCode::Ret.code(), 1);
        assert_eq!(OpCode::PushNum.code(), 2);
        assert_eq!(OpCode::Close.code(), 19);
        assert_eq!(OpCode::SetArg.code(), 22);
        assert_eq!(OpCode::Array.code(), 28);
    }

    #[test]
    fn test_codes_are_dense() {
        for (i, op) in OpCode::all().iter().enumerate() {
            assert_eq!(op.code() as usize, i, "{} out of place", op.name());
        }
    }

    #[test]
    fn test_emit_sizes() {
        assert_eq!(Emit::Op(OpCode::Add).size(), 4);
        assert_eq!(Emit::Number(1.5).size(), 8);
        assert_eq!(Emit::LabelDef(Label(0)).size(), 0);
        assert_eq!(Emit::LabelRef(Label(0)).size(), 4);
    }
}
