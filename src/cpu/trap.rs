use crate::mem::MemError;
use thiserror::Error;

/// Everything that stops an instruction from retiring normally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    /// `ebreak`: the guest asks the simulator to stop, `code` is a0.
    #[error("ebreak at pc=0x{pc:08x}, a0=0x{code:x}")]
    Ebreak { pc: u32, code: u32 },

    #[error("invalid instruction at pc=0x{pc:08x} inst=0x{inst:08x}")]
    InvalidInstruction { pc: u32, inst: u32 },

    #[error("memory error at pc=0x{pc:08x}: {err}")]
    Mem { pc: u32, err: MemError },
}

impl Trap {
    /// Returns the PC where the trap occurred
    pub fn pc(&self) -> u32 {
        match self {
            Trap::Ebreak { pc, .. } => *pc,
            Trap::InvalidInstruction { pc, .. } => *pc,
            Trap::Mem { pc, .. } => *pc,
        }
    }

    /// Ebreak is a request from the guest; everything else is a fault.
    pub fn is_fault(&self) -> bool {
        !matches!(self, Trap::Ebreak { .. })
    }
}

/// Trait for adding PC context to errors that can become Traps
pub trait WithPc<T> {
    fn with_pc(self, pc: u32) -> Result<T, Trap>;
}

impl<T> WithPc<T> for Result<T, MemError> {
    fn with_pc(self, pc: u32) -> Result<T, Trap> {
        self.map_err(|err| Trap::Mem { pc, err })
    }
}
