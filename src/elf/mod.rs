use crate::mem::{MemError, Memory};
use goblin::elf::{
    Elf,
    header::{self, ELFCLASS32, ELFDATA2LSB, EM_RISCV, ET_DYN, ET_EXEC},
    program_header::{PT_LOAD, ProgramHeader},
    sym::STT_FUNC,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElfError {
    #[error(transparent)]
    Parse(#[from] goblin::error::Error),
    #[error("not a 32-bit ELF")]
    NotRv32,
    #[error("not a little-endian ELF")]
    BigEndian,
    #[error("not a RISC-V ELF (e_machine = {0})")]
    NotRiscv(u16),
    #[error("unsupported ELF type {0} (want ET_EXEC or ET_DYN)")]
    BadType(u16),
    #[error("segment outside file: off=0x{off:x} size=0x{size:x}")]
    SegmentOutsideFile { off: u64, size: u64 },
    #[error("p_memsz smaller than p_filesz for segment at off=0x{0:x}")]
    MemszTooSmall(u64),
    #[error("segment [0x{start:x},0x{end:x}) outside RAM [0x{ram_start:x},0x{ram_end:x})")]
    SegmentOutsideRam {
        start: u64,
        end: u64,
        ram_start: u64,
        ram_end: u64,
    },
    #[error("segment write failed: {0}")]
    Mem(#[from] MemError),
}

/// A function symbol, used to name call targets in the function trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub addr: u32,
    pub size: u32,
}

impl Symbol {
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.addr && (addr - self.addr) < self.size.max(1)
    }
}

/// True if `bytes` starts with the ELF magic.
pub fn is_elf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\x7fELF")
}

fn check_header(elf: &Elf<'_>) -> Result<(), ElfError> {
    let hdr = &elf.header;
    if hdr.e_ident[header::EI_CLASS] != ELFCLASS32 {
        return Err(ElfError::NotRv32);
    }
    if hdr.e_ident[header::EI_DATA] != ELFDATA2LSB {
        return Err(ElfError::BigEndian);
    }
    if hdr.e_machine != EM_RISCV {
        return Err(ElfError::NotRiscv(hdr.e_machine));
    }
    if hdr.e_type != ET_EXEC && hdr.e_type != ET_DYN {
        return Err(ElfError::BadType(hdr.e_type));
    }
    Ok(())
}

/// File bytes of a PT_LOAD segment padded with zeros up to `p_memsz`.
fn segment_image(bytes: &[u8], ph: &ProgramHeader) -> Result<Vec<u8>, ElfError> {
    let outside = || ElfError::SegmentOutsideFile {
        off: ph.p_offset,
        size: ph.p_filesz,
    };
    if ph.p_memsz < ph.p_filesz {
        return Err(ElfError::MemszTooSmall(ph.p_offset));
    }
    let off = ph.p_offset as usize;
    let end = off.checked_add(ph.p_filesz as usize).ok_or_else(outside)?;
    let mut image = bytes.get(off..end).ok_or_else(outside)?.to_vec();
    image.resize(ph.p_memsz as usize, 0);
    Ok(image)
}

/// Load the PT_LOAD segments of an RV32 ELF into `mem` and return its entry point.
///
/// Nothing is written unless every segment fits in RAM.
pub fn load_elf(bytes: &[u8], mem: &mut Memory) -> Result<u32, ElfError> {
    let elf = Elf::parse(bytes)?;
    check_header(&elf)?;

    let ram_start = mem.base as u64;
    let ram_end = mem.end_addr();
    let mut segments = Vec::new();
    for ph in elf.program_headers.iter().filter(|ph| ph.p_type == PT_LOAD) {
        let start = ph.p_vaddr;
        let end = start.saturating_add(ph.p_memsz);
        if start < ram_start || end > ram_end {
            return Err(ElfError::SegmentOutsideRam {
                start,
                end,
                ram_start,
                ram_end,
            });
        }
        segments.push((start as u32, segment_image(bytes, ph)?));
    }

    for (addr, image) in &segments {
        mem.write_bytes(*addr, image)?;
    }
    Ok(elf.entry as u32)
}

/// Collect the function symbols of an ELF, sorted by address.
pub fn load_symbols(bytes: &[u8]) -> Result<Vec<Symbol>, ElfError> {
    let elf = Elf::parse(bytes)?;

    let mut symbols: Vec<Symbol> = elf
        .syms
        .iter()
        .filter(|sym| sym.st_type() == STT_FUNC)
        .filter_map(|sym| {
            let name = elf.strtab.get_at(sym.st_name)?;
            Some(Symbol {
                name: name.to_string(),
                addr: sym.st_value as u32,
                size: sym.st_size as u32,
            })
        })
        .collect();
    symbols.sort_by_key(|s| s.addr);
    Ok(symbols)
}
