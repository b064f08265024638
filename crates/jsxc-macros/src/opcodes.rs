// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Opcode table macro.

/// Define an opcode enum whose discriminants are its encoded values.
///
/// The generated enum gets `code()`, `name()` (the lowercase mnemonic as
/// written in the table), `all()`, and a `TryFrom<$repr>` that rejects
/// unknown codes by handing the raw value back.
///
/// # Example
///
/// ```
/// use jsxc_macros::opcodes;
///
/// opcodes! {
///     /// Stack machine operations.
///     Opcode: u32 {
///         Nop = 0 => "nop",
///         Push = 1 => "push",
///         Add = 16 => "add",
///     }
/// }
///
/// assert_eq!(Opcode::Add.code(), 16);
/// assert_eq!(Opcode::Push.name(), "push");
/// assert_eq!(Opcode::try_from(16u32), Ok(Opcode::Add));
/// assert_eq!(Opcode::try_from(2u32), Err(2));
/// assert_eq!(Opcode::all().len(), 3);
/// ```
#[macro_export]
macro_rules! opcodes {
    (
        $(#[$meta:meta])*
        $name:ident : $repr:ident {
            $($(#[$vmeta:meta])* $opcode:ident = $value:literal $(=> $mnemonic:literal)?),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        pub enum $name {
            $($(#[$vmeta])* $opcode = $value),+
        }

        impl TryFrom<$repr> for $name {
            type Error = $repr;

            fn try_from(value: $repr) -> Result<Self, $repr> {
                match value {
                    $($value => Ok(Self::$opcode),)+
                    other => Err(other),
                }
            }
        }

        impl $name {
            /// The encoded value of this opcode.
            pub const fn code(self) -> $repr {
                self as $repr
            }

            /// The mnemonic of this opcode.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$opcode => $crate::opcodes!(@mnemonic $opcode $($mnemonic)?),)+
                }
            }

            /// Every opcode, in table order.
            pub fn all() -> &'static [Self] {
                &[$(Self::$opcode),+]
            }
        }
    };
    (@mnemonic $opcode:ident $mnemonic:literal) => {
        $mnemonic
    };
    (@mnemonic $opcode:ident) => {
        stringify!($opcode)
    };
}

#[cfg(test)]
mod tests {
    opcodes! {
        Probe: u32 {
            Zero = 0 => "zero",
            Seven = 7,
        }
    }

    #[test]
    fn test_mnemonic_defaults_to_variant_name() {
        assert_eq!(Probe::Zero.name(), "zero");
        assert_eq!(Probe::Seven.name(), "Seven");
    }

    #[test]
    fn test_try_from_rejects_gaps() {
        assert_eq!(Probe::try_from(7), Ok(Probe::Seven));
        assert_eq!(Probe::try_from(3), Err(3));
    }
}
