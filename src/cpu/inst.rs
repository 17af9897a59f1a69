//! The instruction table.
//!
//! Entries are tried top to bottom and the first match wins, so a specific
//! encoding has to come before any broader one that also covers it, and the
//! catch-all stays last.

use super::decode::{Format, Operands};
use super::exec::{self, Exec};
use super::pattern::Pattern;
use super::trap::Trap;

pub type Action = fn(&mut Exec<'_>, Operands) -> Result<(), Trap>;

pub struct InstPat {
    pub name: &'static str,
    pub pattern: Pattern,
    pub format: Format,
    pub action: Action,
}

impl std::fmt::Debug for InstPat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstPat")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("format", &self.format)
            .finish()
    }
}

macro_rules! instpat {
    ($pattern:literal, $name:ident, $format:ident) => {
        InstPat {
            name: stringify!($name),
            pattern: Pattern::new($pattern),
            format: Format::$format,
            action: exec::$name,
        }
    };
}

pub static INST_TABLE: [InstPat; 14] = [
    instpat!("??????? ????? ????? 010 ????? 00000 11", lw, I),
    instpat!("??????? ????? ????? 000 ????? 00100 11", addi, I),
    instpat!("??????? ????? ????? 011 ????? 00100 11", seqz, I),
    instpat!("??????? ????? ????? ??? ????? 11011 11", jal, J),
    instpat!("??????? ????? ????? 010 ????? 01000 11", sw, S),
    instpat!("??????? ????? ????? 101 ????? 01100 11", srl, R),
    // jalr x0, 0(ra); must shadow the general jalr below
    instpat!("0000000 00000 00001 000 00000 11001 11", ret, I),
    instpat!("??????? ????? ????? 000 ????? 11001 11", jalr, I),
    instpat!("??????? ????? ????? 000 ????? 11000 11", beq, B),
    instpat!("??????? ????? ????? ??? ????? 00101 11", auipc, U),
    instpat!("??????? ????? ????? 100 ????? 00000 11", lbu, I),
    instpat!("??????? ????? ????? 000 ????? 01000 11", sb, S),
    instpat!("0000000 00001 00000 000 00000 11100 11", ebreak, N),
    instpat!("??????? ????? ????? ??? ????? ????? ??", inv, N),
];

/// First table entry matching `inst`.
pub fn lookup(inst: u32) -> Option<&'static InstPat> {
    INST_TABLE.iter().find(|pat| pat.pattern.matches(inst))
}
