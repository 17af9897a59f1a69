//! Instruction bit patterns.
//!
//! A pattern is written MSB first as 32 characters over `0`, `1` and `?`,
//! with spaces allowed anywhere for readability:
//!
//! ```text
//! "??????? ????? ????? 000 ????? 00100 11"   // addi
//! ```
//!
//! It is compiled once into a `(mask, expected)` pair so matching is a
//! single AND and compare.

use std::fmt;
use thiserror::Error;

pub const INST_BITS: usize = 32;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern has {0} bit characters, expected 32")]
    BadLength(usize),
    /// Byte offset into the template, not a character index.
    #[error("unexpected byte 0x{0:02x} in pattern at offset {1}")]
    BadByte(u8, usize),
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    mask: u32,
    expected: u32,
}

impl Pattern {
    /// Compile a textual template.
    pub const fn parse(template: &str) -> Result<Self, PatternError> {
        let bytes = template.as_bytes();
        let mut mask = 0u32;
        let mut expected = 0u32;
        let mut bits = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            i += 1;
            if c.is_ascii_whitespace() {
                continue;
            }
            let (m, e) = match c {
                b'0' => (1, 0),
                b'1' => (1, 1),
                b'?' => (0, 0),
                _ => return Err(PatternError::BadByte(c, i - 1)),
            };
            if bits < INST_BITS {
                mask = (mask << 1) | m;
                expected = (expected << 1) | e;
            }
            bits += 1;
        }
        if bits != INST_BITS {
            return Err(PatternError::BadLength(bits));
        }
        Ok(Self { mask, expected })
    }

    /// Like [`Pattern::parse`] but panics on a malformed template. Used in
    /// `static` tables, where the panic surfaces as a compile error.
    pub const fn new(template: &str) -> Self {
        match Self::parse(template) {
            Ok(pattern) => pattern,
            Err(_) => panic!("malformed instruction pattern"),
        }
    }

    #[inline]
    pub const fn matches(&self, inst: u32) -> bool {
        (inst & self.mask) == self.expected
    }

    /// True if some instruction word matches both patterns.
    pub const fn conflicts_with(&self, other: &Pattern) -> bool {
        let common = self.mask & other.mask;
        (self.expected & common) == (other.expected & common)
    }

    pub const fn mask(&self) -> u32 {
        self.mask
    }

    pub const fn expected(&self) -> u32 {
        self.expected
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("mask", &format_args!("0x{:08x}", self.mask))
            .field("expected", &format_args!("0x{:08x}", self.expected))
            .finish()
    }
}
