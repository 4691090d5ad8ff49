//! Co-simulation harness CLI.
//!
//! This binary is the single entry point for a run. It performs:
//! 1. **Setup:** Argument handling, optional JSON config, image loading
//!    (ELF converted via the external objcopy, HEX loaded directly), and
//!    trace-file creation.
//! 2. **Run:** Drives the linked pin-level model through the cycle loop.
//! 3. **Exit:** 0 = terminal write of zero, 1 = reported failure code,
//!    2 = setup failure or timeout.
//!
//! Arguments beginning with `+` are accepted and ignored so plusarg-style
//! option strings can be passed through unchanged.

#[cfg(feature = "ffi-model")]
mod ffi;

use clap::Parser;
use std::path::PathBuf;
use std::process;

use rvcosim_core::config::Config;
use rvcosim_core::loader;
use rvcosim_core::mem::SparseMemory;
use rvcosim_core::trace::TraceLogger;

#[derive(Parser, Debug)]
#[command(
    name = "rvcosim",
    author,
    version,
    about = "Cycle-stepped co-simulation harness",
    long_about = "Run a program image against the linked SoC model.\n\n\
        The image is an ELF (converted through objcopy; override the tool\n\
        with RISCV_OBJCOPY) or an Intel HEX file. Two trace files are\n\
        written to the working directory: run.memTrace (committed memory\n\
        writes) and run.logTrace (bus phases and summary).\n\n\
        Examples:\n  rvcosim program.elf\n  rvcosim program.hex +verbose"
)]
struct Cli {
    /// Program image followed by ignored pass-through (+...) options.
    args: Vec<String>,

    /// JSON configuration overriding the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(image) = cli.args.iter().find(|a| !a.starts_with('+')).cloned() else {
        eprintln!("Usage: rvcosim <program.elf|program.hex> [+plusargs...]");
        process::exit(2);
    };

    let code = run(&PathBuf::from(image), cli.config.as_deref());
    process::exit(code);
}

/// Full setup-and-run path; every failure maps to exit status 2.
fn run(image: &std::path::Path, config_path: Option<&std::path::Path>) -> i32 {
    let config = match config_path {
        Some(path) => match Config::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("rvcosim: {e}");
                return 2;
            }
        },
        None => Config::default(),
    };

    let mut mem = SparseMemory::new();
    if let Err(e) = loader::load_image(image, &mut mem, None) {
        eprintln!("rvcosim: {e}");
        return 2;
    }

    let trace = match TraceLogger::create(&config.trace) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("rvcosim: {e}");
            return 2;
        }
    };

    run_model(mem, &config, trace)
}

#[cfg(feature = "ffi-model")]
fn run_model(mem: SparseMemory, config: &Config, trace: TraceLogger) -> i32 {
    use rvcosim_core::driver::{Driver, Outcome};

    let model = ffi::FfiSoc::new();
    let mut driver = Driver::new(model, mem, config, trace);
    match driver.run() {
        Ok(outcome) => {
            match outcome {
                Outcome::Pass => eprintln!("rvcosim: pass after {} cycles", driver.cycles()),
                Outcome::Fail(code) => {
                    eprintln!(
                        "rvcosim: failure code {code:#x} after {} cycles",
                        driver.cycles()
                    );
                }
                Outcome::Timeout => {
                    eprintln!(
                        "rvcosim: timeout, no terminal write after {} cycles",
                        driver.cycles()
                    );
                }
            }
            outcome.exit_code()
        }
        Err(e) => {
            eprintln!("rvcosim: {e}");
            2
        }
    }
}

#[cfg(not(feature = "ffi-model"))]
fn run_model(_mem: SparseMemory, _config: &Config, _trace: TraceLogger) -> i32 {
    eprintln!("rvcosim: no processor model linked; rebuild with --features ffi-model");
    2
}
