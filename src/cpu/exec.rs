use super::decode::{Operands, decode_operands};
use super::inst::{INST_TABLE, InstPat};
use super::reg::{A0, RA, Registers};
use super::trap::{Trap, WithPc};
use crate::debug::CallTracer;
use crate::mem::Bus;

/// Per-instruction execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decode {
    pub pc: u32,
    /// Static next pc, `pc + 4`.
    pub snpc: u32,
    /// Dynamic next pc, where execution actually continues.
    pub dnpc: u32,
    pub inst: u32,
}

impl Decode {
    pub fn new(pc: u32, inst: u32) -> Self {
        let snpc = pc.wrapping_add(4);
        Self {
            pc,
            snpc,
            dnpc: snpc,
            inst,
        }
    }
}

/// What an instruction's action can see and change.
pub struct Exec<'a> {
    pub regs: &'a mut Registers,
    pub mem: &'a mut dyn Bus,
    pub tracer: &'a mut dyn CallTracer,
    pub s: &'a mut Decode,
}

impl Exec<'_> {
    fn load(&self, addr: u32, len: usize) -> Result<u32, Trap> {
        self.mem.read(addr, len).with_pc(self.s.pc)
    }

    fn store(&mut self, addr: u32, len: usize, val: u32) -> Result<(), Trap> {
        self.mem.write(addr, len, val).with_pc(self.s.pc)
    }
}

/// Execute `s.inst` against `table`: the first matching entry wins.
///
/// Returns the mnemonic that ran. `x0` is zeroed afterwards whatever the
/// outcome.
pub fn execute_with(
    table: &[InstPat],
    regs: &mut Registers,
    mem: &mut dyn Bus,
    tracer: &mut dyn CallTracer,
    s: &mut Decode,
) -> Result<&'static str, Trap> {
    s.dnpc = s.snpc;
    let inst = s.inst;
    let pc = s.pc;

    let result = match table.iter().find(|pat| pat.pattern.matches(inst)) {
        Some(pat) => {
            let op = decode_operands(inst, pat.format, regs);
            let mut ex = Exec {
                regs: &mut *regs,
                mem,
                tracer,
                s,
            };
            (pat.action)(&mut ex, op).map(|()| pat.name)
        }
        None => Err(Trap::InvalidInstruction { pc, inst }),
    };

    regs.reset_zero();
    result
}

/// Execute one instruction using the built-in instruction table.
pub fn execute_once(
    regs: &mut Registers,
    mem: &mut dyn Bus,
    tracer: &mut dyn CallTracer,
    s: &mut Decode,
) -> Result<&'static str, Trap> {
    execute_with(&INST_TABLE, regs, mem, tracer, s)
}

// ---- instruction actions ----

pub fn lw(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    let val = e.load(op.src1.wrapping_add(op.imm), 4)?;
    e.regs.write(op.rd, val);
    Ok(())
}

pub fn addi(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.regs.write(op.rd, op.src1.wrapping_add(op.imm));
    Ok(())
}

/// Tests `src1 < 1` and ignores the immediate, so only `sltiu rd, rs, 1`
/// gets the full `sltiu` result.
pub fn seqz(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.regs.write(op.rd, (op.src1 < 1) as u32);
    Ok(())
}

pub fn jal(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    let offset = op.imm << 1;
    let pc = e.s.pc;
    e.regs.write(op.rd, pc.wrapping_add(4));
    e.s.dnpc = pc.wrapping_add(offset);
    if op.rd == RA {
        e.tracer.call(pc, e.s.dnpc);
    }
    Ok(())
}

pub fn sw(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.store(op.src1.wrapping_add(op.imm), 4, op.src2)
}

pub fn srl(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.regs.write(op.rd, op.src1 >> (op.src2 & 31));
    Ok(())
}

pub fn ret(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.s.dnpc = op.src1 & !1;
    e.tracer.ret(e.s.pc, e.s.dnpc);
    Ok(())
}

pub fn jalr(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    let pc = e.s.pc;
    e.regs.write(op.rd, pc.wrapping_add(4));
    e.s.dnpc = op.src1.wrapping_add(op.imm);
    if op.rd == RA {
        e.tracer.call(pc, e.s.dnpc);
    }
    Ok(())
}

pub fn beq(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    if op.src1 == op.src2 {
        e.s.dnpc = e.s.pc.wrapping_add(op.imm);
    }
    Ok(())
}

pub fn auipc(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.regs.write(op.rd, e.s.pc.wrapping_add(op.imm));
    Ok(())
}

pub fn lbu(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    let val = e.load(op.src1.wrapping_add(op.imm), 1)?;
    e.regs.write(op.rd, val);
    Ok(())
}

pub fn sb(e: &mut Exec<'_>, op: Operands) -> Result<(), Trap> {
    e.store(op.src1.wrapping_add(op.imm), 1, op.src2)
}

pub fn ebreak(e: &mut Exec<'_>, _op: Operands) -> Result<(), Trap> {
    Err(Trap::Ebreak {
        pc: e.s.pc,
        code: e.regs.read(A0),
    })
}

pub fn inv(e: &mut Exec<'_>, _op: Operands) -> Result<(), Trap> {
    Err(Trap::InvalidInstruction {
        pc: e.s.pc,
        inst: e.s.inst,
    })
}
