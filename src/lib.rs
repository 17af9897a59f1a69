pub mod cpu;
pub mod debug;
pub mod elf;
pub mod mem;
