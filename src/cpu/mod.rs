pub mod decode;
pub mod exec;
pub mod inst;
pub mod pattern;
pub mod reg;
pub mod trap;

use std::fmt;

use tracing::{debug, warn};

use crate::debug::{CallTracer, NoTrace, itrace};
use crate::mem::{Memory, PMEM_BASE};
use exec::Decode;
use reg::Registers;
use trap::{Trap, WithPc};

pub const RESET_VECTOR: u32 = PMEM_BASE;

/// Program run when no image is given. Stores zero to the data word, loads it
/// back into a0 and stops, so it ends in a good trap.
pub const BUILTIN_IMAGE: [u32; 5] = [
    0x0000_0297, // auipc t0, 0
    0x0002_8823, // sb    zero, 16(t0)
    0x0102_c503, // lbu   a0, 16(t0)
    0x0010_0073, // ebreak
    0xdead_beef, // data
];

#[derive(Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    pub pc: u32,
}

/// Why [`Machine::run`] stopped without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// `ebreak` with a0 == 0.
    GoodTrap { pc: u32 },
    /// `ebreak` with a non-zero a0.
    BadTrap { pc: u32, code: u32 },
    InsnLimit { executed: u64 },
}

impl HaltReason {
    pub fn is_good(&self) -> bool {
        !matches!(self, HaltReason::BadTrap { .. })
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::GoodTrap { pc } => write!(f, "HIT GOOD TRAP at pc = 0x{:08x}", pc),
            HaltReason::BadTrap { pc, code } => {
                write!(f, "HIT BAD TRAP at pc = 0x{:08x} (a0 = 0x{:x})", pc, code)
            }
            HaltReason::InsnLimit { executed } => {
                write!(f, "instruction limit reached after {} instructions", executed)
            }
        }
    }
}

pub struct Machine {
    pub cpu: Cpu,
    pub mem: Memory,
    pub tracer: Box<dyn CallTracer>,
    /// Stop after this many instructions (0 = run forever)
    pub max_insns: u64,
    pub executed: u64,
}

impl Machine {
    pub fn new(ram_bytes: usize) -> Self {
        Self {
            cpu: Cpu {
                regs: Registers::new(),
                pc: RESET_VECTOR,
            },
            mem: Memory::new(ram_bytes),
            tracer: Box::new(NoTrace),
            max_insns: 0,
            executed: 0,
        }
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// On error the pc still points at the offending instruction.
    pub fn step(&mut self) -> Result<(), Trap> {
        // Fetch
        let pc = self.cpu.pc;
        let inst = self.mem.read_u32(pc).with_pc(pc)?;

        // Decode + execute
        let mut s = Decode::new(pc, inst);
        let res = exec::execute_once(
            &mut self.cpu.regs,
            &mut self.mem,
            self.tracer.as_mut(),
            &mut s,
        );

        // Trapping instructions are traced too.
        let name = match &res {
            Ok(name) => *name,
            Err(_) => inst::lookup(inst).map_or("???", |pat| pat.name),
        };
        itrace(self.executed, pc, inst, name);
        res?;

        self.executed += 1;
        self.cpu.pc = s.dnpc;
        Ok(())
    }

    /// Run until the guest executes `ebreak`, the instruction limit is hit,
    /// or a fault occurs.
    pub fn run(&mut self) -> Result<HaltReason, Trap> {
        debug!("starting at pc=0x{:08x}", self.cpu.pc);
        loop {
            if self.max_insns != 0 && self.executed >= self.max_insns {
                return Ok(HaltReason::InsnLimit {
                    executed: self.executed,
                });
            }

            match self.step() {
                Ok(()) => {}
                Err(Trap::Ebreak { pc, code }) => {
                    self.executed += 1;
                    return Ok(if code == 0 {
                        HaltReason::GoodTrap { pc }
                    } else {
                        HaltReason::BadTrap { pc, code }
                    });
                }
                Err(e) => {
                    warn!("{e}");
                    return Err(e);
                }
            }
        }
    }
}
