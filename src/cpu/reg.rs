use std::fmt;

pub const NR_GPR: usize = 32;

pub const RA: usize = 1;
pub const A0: usize = 10;

pub const REG_NAMES: [&str; NR_GPR] = [
    "$0", "ra", "sp", "gp", "tp", "t0", "t1", "t2", //
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5", //
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", //
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6", //
];

/// General purpose register file.
///
/// Writes to `x0` are not filtered here; the dispatcher zeroes it after
/// every instruction instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    gpr: [u32; NR_GPR],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn read(&self, idx: usize) -> u32 {
        self.gpr[idx]
    }

    #[inline]
    pub fn write(&mut self, idx: usize, val: u32) {
        self.gpr[idx] = val;
    }

    #[inline]
    pub fn reset_zero(&mut self) {
        self.gpr[0] = 0;
    }

    pub fn index_of(name: &str) -> Option<usize> {
        REG_NAMES.iter().position(|&n| n == name)
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, val) in REG_NAMES.iter().zip(self.gpr.iter()) {
            writeln!(f, "{:<4} 0x{:08x} {}", name, val, *val as i32)?;
        }
        Ok(())
    }
}
