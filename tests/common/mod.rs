//! Instruction encoders and a small harness shared by the integration tests.
#![allow(dead_code)]

use rv32_emu::cpu::exec::{Decode, execute_once};
use rv32_emu::cpu::reg::Registers;
use rv32_emu::cpu::trap::Trap;
use rv32_emu::debug::CallTracer;
use rv32_emu::mem::{Memory, PMEM_BASE};

pub const OP_LOAD: u32 = 0b0000011;
pub const OP_IMM: u32 = 0b0010011;
pub const OP_AUIPC: u32 = 0b0010111;
pub const OP_STORE: u32 = 0b0100011;
pub const OP_REG: u32 = 0b0110011;
pub const OP_BRANCH: u32 = 0b1100011;
pub const OP_JALR: u32 = 0b1100111;
pub const OP_JAL: u32 = 0b1101111;

pub fn r_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, rs2: u32, funct7: u32) -> u32 {
    (funct7 & 0x7f) << 25
        | (rs2 & 0x1f) << 20
        | (rs1 & 0x1f) << 15
        | (funct3 & 0x7) << 12
        | (rd & 0x1f) << 7
        | (opcode & 0x7f)
}

pub fn i_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, imm: i32) -> u32 {
    ((imm as u32) & 0xfff) << 20
        | (rs1 & 0x1f) << 15
        | (funct3 & 0x7) << 12
        | (rd & 0x1f) << 7
        | opcode
}

pub fn s_type(funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    let v = imm as u32;
    ((v >> 5) & 0x7f) << 25
        | (rs2 & 0x1f) << 20
        | (rs1 & 0x1f) << 15
        | (funct3 & 0x7) << 12
        | (v & 0x1f) << 7
        | OP_STORE
}

pub fn b_type(funct3: u32, rs1: u32, rs2: u32, imm: i32) -> u32 {
    let v = imm as u32;
    ((v >> 12) & 1) << 31
        | ((v >> 5) & 0x3f) << 25
        | (rs2 & 0x1f) << 20
        | (rs1 & 0x1f) << 15
        | (funct3 & 0x7) << 12
        | ((v >> 1) & 0xf) << 8
        | ((v >> 11) & 1) << 7
        | OP_BRANCH
}

pub fn u_type(opcode: u32, rd: u32, imm20: u32) -> u32 {
    (imm20 & 0xfffff) << 12 | (rd & 0x1f) << 7 | opcode
}

pub fn j_type(rd: u32, imm: i32) -> u32 {
    let v = imm as u32;
    ((v >> 20) & 1) << 31
        | ((v >> 1) & 0x3ff) << 21
        | ((v >> 11) & 1) << 20
        | ((v >> 12) & 0xff) << 12
        | (rd & 0x1f) << 7
        | OP_JAL
}

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OP_IMM, rd, 0b000, rs1, imm)
}

pub fn beq(rs1: u32, rs2: u32, imm: i32) -> u32 {
    b_type(0b000, rs1, rs2, imm)
}

pub fn jal(rd: u32, imm: i32) -> u32 {
    j_type(rd, imm)
}

pub fn jalr(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OP_JALR, rd, 0b000, rs1, imm)
}

pub fn srl(rd: u32, rs1: u32, rs2: u32) -> u32 {
    r_type(OP_REG, rd, 0b101, rs1, rs2, 0)
}

pub fn sw(rs1: u32, rs2: u32, imm: i32) -> u32 {
    s_type(0b010, rs1, rs2, imm)
}

pub fn sb(rs1: u32, rs2: u32, imm: i32) -> u32 {
    s_type(0b000, rs1, rs2, imm)
}

pub fn lw(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OP_LOAD, rd, 0b010, rs1, imm)
}

pub fn lbu(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OP_LOAD, rd, 0b100, rs1, imm)
}

pub const RET: u32 = 0x0000_8067;
pub const EBREAK: u32 = 0x0010_0073;

/// Records every edge it is given.
#[derive(Debug, Default)]
pub struct Edges {
    pub calls: Vec<(u32, u32)>,
    pub rets: Vec<(u32, u32)>,
}

impl CallTracer for Edges {
    fn call(&mut self, from: u32, to: u32) {
        self.calls.push((from, to));
    }

    fn ret(&mut self, from: u32, to: u32) {
        self.rets.push((from, to));
    }
}

/// Registers, RAM and a recording tracer for running single instructions.
pub struct Harness {
    pub regs: Registers,
    pub mem: Memory,
    pub edges: Edges,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(4096),
            edges: Edges::default(),
        }
    }

    pub fn exec(&mut self, pc: u32, inst: u32) -> (Decode, Result<&'static str, Trap>) {
        let mut s = Decode::new(pc, inst);
        let res = execute_once(&mut self.regs, &mut self.mem, &mut self.edges, &mut s);
        (s, res)
    }
}

pub const BASE: u32 = PMEM_BASE;
