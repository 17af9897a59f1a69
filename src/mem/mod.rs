use thiserror::Error;

/// Start of physical RAM, also where execution begins.
pub const PMEM_BASE: u32 = 0x8000_0000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    #[error("address out of range: 0x{0:08x}")]
    Oob(u32),
    #[error("unsupported access width: {0} bytes")]
    BadWidth(usize),
}

/// Byte-addressable memory as seen by the execution core.
///
/// `len` is 1, 2 or 4. Reads are zero-extended, writes keep the low `len`
/// bytes of `val`.
pub trait Bus {
    fn read(&self, addr: u32, len: usize) -> Result<u32, MemError>;
    fn write(&mut self, addr: u32, len: usize, val: u32) -> Result<(), MemError>;
}

pub struct Memory {
    data: Vec<u8>,
    pub base: u32,
}

impl Memory {
    pub fn new(bytes: usize) -> Self {
        Self {
            data: vec![0; bytes],
            base: PMEM_BASE,
        }
    }

    fn check_oob(&self, addr: u32, size: usize) -> Result<usize, MemError> {
        let off = addr.checked_sub(self.base).ok_or(MemError::Oob(addr))? as usize;
        let end = off.checked_add(size).ok_or(MemError::Oob(addr))?;
        if end > self.data.len() {
            return Err(MemError::Oob(addr));
        }
        Ok(off)
    }

    // Misaligned accesses are allowed throughout.
    pub fn read_u8(&self, addr: u32) -> Result<u8, MemError> {
        let off = self.check_oob(addr, 1)?;
        Ok(self.data[off])
    }

    pub fn read_u16(&self, addr: u32) -> Result<u16, MemError> {
        let off = self.check_oob(addr, 2)?;
        let b = &self.data[off..off + 2];
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&self, addr: u32) -> Result<u32, MemError> {
        let off = self.check_oob(addr, 4)?;
        let b = &self.data[off..off + 4];
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn write_u8(&mut self, addr: u32, v: u8) -> Result<(), MemError> {
        let off = self.check_oob(addr, 1)?;
        self.data[off] = v;
        Ok(())
    }

    pub fn write_u16(&mut self, addr: u32, v: u16) -> Result<(), MemError> {
        let off = self.check_oob(addr, 2)?;
        self.data[off..off + 2].copy_from_slice(&v.to_le_bytes());
        Ok(())
    }

    pub fn write_u32(&mut self, addr: u32, v: u32) -> Result<(), MemError> {
        let off = self.check_oob(addr, 4)?;
        self.data[off..off + 4].copy_from_slice(&v.to_le_bytes());
        Ok(())
    }

    pub fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> Result<(), MemError> {
        let off = self.check_oob(addr, bytes.len())?;
        self.data[off..off + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Copy instruction words to `addr`, little-endian.
    pub fn write_words(&mut self, addr: u32, words: &[u32]) -> Result<(), MemError> {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.write_bytes(addr, &bytes)
    }

    /// One past the last RAM address. Wider than `u32` since RAM may end
    /// exactly at 4 GiB.
    pub fn end_addr(&self) -> u64 {
        self.base as u64 + self.data.len() as u64
    }
}

impl Bus for Memory {
    fn read(&self, addr: u32, len: usize) -> Result<u32, MemError> {
        match len {
            1 => self.read_u8(addr).map(u32::from),
            2 => self.read_u16(addr).map(u32::from),
            4 => self.read_u32(addr),
            _ => Err(MemError::BadWidth(len)),
        }
    }

    fn write(&mut self, addr: u32, len: usize, val: u32) -> Result<(), MemError> {
        match len {
            1 => self.write_u8(addr, val as u8),
            2 => self.write_u16(addr, val as u16),
            4 => self.write_u32(addr, val),
            _ => Err(MemError::BadWidth(len)),
        }
    }
}
