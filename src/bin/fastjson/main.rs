//! `fastjson` CLI wrapper.
//!
//! Excluded from the codec's core specification (file I/O, flag parsing,
//! and exit codes are external collaborators); documented here only so the
//! crate ships the reference surface described alongside it: `--validate`,
//! `--pretty`, `--minify`, `--benchmark` over an input file path, exit code
//! 0 on success, 1 on parse error, 2 on usage error.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fastjson")]
#[command(about = "SIMD-accelerated JSON codec", long_about = None)]
#[command(version)]
struct Cli {
    /// Input JSON file. Reads stdin if omitted.
    input: Option<PathBuf>,

    /// Parse the input and report only success or failure.
    #[arg(long)]
    validate: bool,

    /// Pretty-print the parsed document to stdout.
    #[arg(long)]
    pretty: bool,

    /// Minify (compact-serialize) the parsed document to stdout.
    #[arg(long)]
    minify: bool,

    /// Repeatedly parse the input and report throughput.
    #[arg(long)]
    benchmark: bool,

    /// Indent unit used by `--pretty`.
    #[arg(long, default_value = "  ")]
    indent: String,
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(p) => {
            let file = std::fs::File::open(p).with_context(|| format!("opening {}", p.display()))?;
            // SAFETY: the CLI owns this file handle for the duration of a
            // single short-lived invocation; no other process is expected
            // to truncate it concurrently.
            let mmap = unsafe { memmap2::Mmap::map(&file) }.with_context(|| format!("memory-mapping {}", p.display()))?;
            Ok(mmap.to_vec())
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.input.is_none() && atty::is(atty::Stream::Stdin) {
        eprintln!("fastjson: no input file given and stdin is a terminal (pipe input or pass a file path)");
        return ExitCode::from(2);
    }

    let bytes = match read_input(&cli.input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("fastjson: {e:#}");
            return ExitCode::from(2);
        }
    };

    if cli.benchmark {
        return run_benchmark(&bytes);
    }

    match fastjson::parse(&bytes) {
        Ok(value) => {
            if cli.validate {
                println!("valid");
            } else if cli.pretty {
                write_stdout(&fastjson::serialize_pretty(&value, &cli.indent));
            } else if cli.minify {
                write_stdout(&fastjson::serialize(&value));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("fastjson: {e}");
            ExitCode::from(1)
        }
    }
}

fn write_stdout(bytes: &[u8]) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = lock.write_all(bytes);
    let _ = lock.write_all(b"\n");
}

#[derive(serde::Serialize)]
struct BenchmarkReport {
    #[cfg(feature = "bench-runner")]
    timestamp: String,
    input_bytes: usize,
    iterations: u64,
    seconds: f64,
    throughput_mib_per_sec: f64,
}

/// Repeatedly parses `bytes` for a fixed wall-clock budget (or until
/// Ctrl-C), then reports throughput. Not part of the core specification's
/// scope; this mirrors the documented `--benchmark` CLI surface only.
fn run_benchmark(bytes: &[u8]) -> ExitCode {
    if let Err(e) = fastjson::parse(bytes) {
        eprintln!("fastjson: input does not parse, nothing to benchmark: {e}");
        return ExitCode::from(1);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        // A failure to install the handler just means Ctrl-C won't cut the
        // run short; the fixed time budget below still bounds it.
        let _ = ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst));
    }

    let budget = Duration::from_secs(5);
    let start = Instant::now();
    let mut iterations = 0u64;
    while !interrupted.load(Ordering::SeqCst) && start.elapsed() < budget {
        let _ = fastjson::parse(bytes);
        iterations += 1;
    }
    let elapsed = start.elapsed().as_secs_f64().max(1e-9);
    let mib = (bytes.len() as f64 * iterations as f64) / (1024.0 * 1024.0);

    let report = BenchmarkReport {
        #[cfg(feature = "bench-runner")]
        timestamp: chrono::Utc::now().to_rfc3339(),
        input_bytes: bytes.len(),
        iterations,
        seconds: elapsed,
        throughput_mib_per_sec: mib / elapsed,
    };
    match serde_json::to_string(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("fastjson: failed to format benchmark report: {e}"),
    }
    ExitCode::SUCCESS
}
