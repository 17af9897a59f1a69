use crate::elf::Symbol;
use tracing::{info, trace};

/// Receives control-flow edges for function tracing. Purely observational:
/// nothing it does may influence execution.
pub trait CallTracer {
    fn call(&mut self, from: u32, to: u32);
    fn ret(&mut self, from: u32, to: u32);
}

/// Tracer that ignores every edge.
#[derive(Debug, Default)]
pub struct NoTrace;

impl CallTracer for NoTrace {
    fn call(&mut self, _from: u32, _to: u32) {}
    fn ret(&mut self, _from: u32, _to: u32) {}
}

/// Function tracer: logs calls and returns with call-depth indentation,
/// naming targets from the ELF symbol table when one was loaded.
#[derive(Debug, Default)]
pub struct Ftrace {
    symbols: Vec<Symbol>,
    depth: usize,
}

impl Ftrace {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols, depth: 0 }
    }

    /// Name of the function containing `addr`, or `"???"`.
    pub fn lookup(&self, addr: u32) -> &str {
        self.symbols
            .iter()
            .find(|s| s.contains(addr))
            .map_or("???", |s| s.name.as_str())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl CallTracer for Ftrace {
    fn call(&mut self, from: u32, to: u32) {
        info!(
            target: "ftrace",
            "0x{:08x}: {:indent$}call [{}@0x{:08x}]",
            from,
            "",
            self.lookup(to),
            to,
            indent = self.depth * 2
        );
        self.depth += 1;
    }

    fn ret(&mut self, from: u32, to: u32) {
        self.depth = self.depth.saturating_sub(1);
        info!(
            target: "ftrace",
            "0x{:08x}: {:indent$}ret  [{}]",
            from,
            "",
            self.lookup(from),
            indent = self.depth * 2
        );
        trace!(target: "ftrace", "return to 0x{:08x} in {}", to, self.lookup(to));
    }
}

/// Instruction trace line, emitted at TRACE level.
pub fn itrace(step: u64, pc: u32, inst: u32, name: &str) {
    trace!(target: "itrace", "[{:08}] 0x{:08x}: {:08x}  {}", step, pc, inst, name);
}
