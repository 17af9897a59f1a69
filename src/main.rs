use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rv32_emu::cpu::{BUILTIN_IMAGE, Machine, RESET_VECTOR};
use rv32_emu::debug::Ftrace;
use rv32_emu::elf;

#[derive(Parser, Debug)]
struct Args {
    /// RV32 ELF or raw binary to run; the built-in image is used when omitted
    image: Option<PathBuf>,

    /// RAM size in MiB
    #[arg(long, default_value_t = 128)]
    ram_mib: usize,

    /// Stop after N instructions (0 = run forever)
    #[arg(long, default_value_t = 0)]
    max_insns: u64,

    /// Enable instruction trace
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Log function calls and returns
    #[arg(long, default_value_t = false)]
    ftrace: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.trace { "trace" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let ram_bytes = args.ram_mib * 1024 * 1024;
    let mut machine = Machine::new(ram_bytes);
    machine.max_insns = args.max_insns;

    let mut symbols = Vec::new();
    match &args.image {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            if elf::is_elf(&bytes) {
                machine.cpu.pc = elf::load_elf(&bytes, &mut machine.mem)?;
                symbols = elf::load_symbols(&bytes)?;
                tracing::info!("loaded ELF {}, entry 0x{:08x}", path.display(), machine.cpu.pc);
            } else {
                machine.mem.write_bytes(RESET_VECTOR, &bytes)?;
                tracing::info!("loaded raw image {} ({} bytes)", path.display(), bytes.len());
            }
        }
        None => {
            machine.mem.write_words(RESET_VECTOR, &BUILTIN_IMAGE)?;
            tracing::info!("no image given, using the built-in image");
        }
    }

    if args.ftrace {
        machine.tracer = Box::new(Ftrace::new(symbols));
    }

    match machine.run() {
        Ok(reason) => {
            println!("{}", reason);
            println!("executed {} instructions", machine.executed);
            Ok(if reason.is_good() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            eprintln!("CPU error: {}", e);
            eprintln!("{}", machine.cpu.regs);
            println!("ABORT at pc = 0x{:08x}", e.pc());
            Ok(ExitCode::FAILURE)
        }
    }
}
