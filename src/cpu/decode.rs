use super::reg::Registers;

/// Operand layout of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    I,
    U,
    S,
    N, // none
    J,
    B,
    R,
}

/// Operands pulled out of an instruction word. Anything the format does
/// not define stays zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operands {
    pub rd: usize,
    pub src1: u32,
    pub src2: u32,
    pub imm: u32,
}

/// Bits `[hi:lo]` of `inst`, shifted down to bit 0.
#[inline]
pub const fn bits(inst: u32, hi: u32, lo: u32) -> u32 {
    (inst >> lo) & (((1u64 << (hi - lo + 1)) - 1) as u32)
}

/// Sign-extend the low `len` bits of `value`.
#[inline]
pub const fn sext(value: u32, len: u32) -> u32 {
    let shift = 32 - len;
    (((value << shift) as i32) >> shift) as u32
}

pub const fn imm_i(inst: u32) -> u32 {
    sext(bits(inst, 31, 20), 12)
}

pub const fn imm_u(inst: u32) -> u32 {
    sext(bits(inst, 31, 12), 20) << 12
}

pub const fn imm_s(inst: u32) -> u32 {
    (sext(bits(inst, 31, 25), 7) << 5) | bits(inst, 11, 7)
}

/// imm[20:1] of a jump. The implicit zero at bit 0 is not included, so the
/// byte offset is this value shifted left by one.
pub const fn imm_j(inst: u32) -> u32 {
    ((((sext(bits(inst, 31, 31), 1) << 8) | bits(inst, 19, 12)) << 1 | bits(inst, 20, 20)) << 10)
        | bits(inst, 30, 21)
}

pub const fn imm_b(inst: u32) -> u32 {
    (sext(bits(inst, 31, 31), 1) << 12)
        | bits(inst, 7, 7) << 11
        | bits(inst, 30, 25) << 5
        | bits(inst, 11, 8) << 1
}

/// Extract operands for `format`. Source registers are only read when the
/// format names them.
pub fn decode_operands(inst: u32, format: Format, regs: &Registers) -> Operands {
    let rs1 = bits(inst, 19, 15) as usize;
    let rs2 = bits(inst, 24, 20) as usize;
    let mut op = Operands {
        rd: bits(inst, 11, 7) as usize,
        ..Operands::default()
    };

    match format {
        Format::I => {
            op.src1 = regs.read(rs1);
            op.imm = imm_i(inst);
        }
        Format::U => op.imm = imm_u(inst),
        Format::S => {
            op.src1 = regs.read(rs1);
            op.src2 = regs.read(rs2);
            op.imm = imm_s(inst);
        }
        Format::J => op.imm = imm_j(inst),
        Format::B => {
            op.src1 = regs.read(rs1);
            op.src2 = regs.read(rs2);
            op.imm = imm_b(inst);
        }
        Format::R => {
            op.src1 = regs.read(rs1);
            op.src2 = regs.read(rs2);
        }
        Format::N => {}
    }
    op
}
