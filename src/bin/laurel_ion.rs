//! Laurel Ion CLI
//!
//! Inspect and validate Laurel programs encoded as Ion binary.
//!
//! Usage:
//!   laurel-ion print <file> [--format pretty|json|wire]
//!   laurel-ion symbols <file>
//!   laurel-ion check <file>...

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rayon::prelude::*;

use laurel_ion::config::CodecConfig;
use laurel_ion::file::read_file_bytes;
use laurel_ion::{ion, pretty};

/// Inspect Laurel programs encoded as Ion binary
#[derive(Parser, Debug)]
#[command(name = "laurel-ion", version)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// JSON file with codec limits
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the maximum nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a file and print the program
    Print {
        /// Encoded program
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Print the local symbol table of a file
    Symbols {
        /// Encoded program
        file: PathBuf,
    },
    /// Decode files and report which ones are valid
    Check {
        /// Encoded programs
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Source-like rendering
    Pretty,
    /// The AST as JSON
    Json,
    /// The symbol-resolved wire tree
    Wire,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .filter_level(cli.verbose.log_level_filter())
        .target(env_logger::fmt::Target::Stderr)
        .init();

    let config = load_config(&cli)?;
    log::debug!("codec config: {:?}", config);

    match cli.command {
        Command::Print { file, format } => print(&file, format, &config),
        Command::Symbols { file } => symbols(&file, &config),
        Command::Check { files } => {
            let failures = check(&files, &config);
            if failures > 0 {
                process::exit(1);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<CodecConfig> {
    let mut config = match &cli.config {
        Some(path) => CodecConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    Ok(config)
}

fn read_bytes(file: &Path, config: &CodecConfig) -> Result<Vec<u8>> {
    read_file_bytes(file, config).with_context(|| format!("Failed to read {}", file.display()))
}

fn print(file: &Path, format: Format, config: &CodecConfig) -> Result<()> {
    let bytes = read_bytes(file, config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match format {
        Format::Wire => {
            let root = laurel_ion::read_wire(&bytes, config)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            writeln!(out, "{:#}", root)?;
        }
        Format::Pretty => {
            let program = laurel_ion::decode_with_config(&bytes, config)
                .with_context(|| format!("Failed to decode {}", file.display()))?;
            write!(out, "{}", pretty::print_program(&program))?;
        }
        Format::Json => {
            let program = laurel_ion::decode_with_config(&bytes, config)
                .with_context(|| format!("Failed to decode {}", file.display()))?;
            serde_json::to_writer_pretty(&mut out, &program)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn symbols(file: &Path, config: &CodecConfig) -> Result<()> {
    let bytes = read_bytes(file, config)?;
    let symbols = laurel_ion::read_symbols(&bytes, config)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (i, symbol) in symbols.iter().enumerate() {
        let sid = ion::FIRST_LOCAL_SID + i;
        match symbol {
            Some(text) => writeln!(out, "{:>5}  {}", sid, text)?,
            None => writeln!(out, "{:>5}  <unknown>", sid)?,
        }
    }
    Ok(())
}

/// Decode every file in parallel. Returns the number of failures.
fn check(files: &[PathBuf], config: &CodecConfig) -> usize {
    let results: Vec<(&PathBuf, Result<()>)> = files
        .par_iter()
        .map(|file| {
            let result = read_bytes(file, config).and_then(|bytes| {
                laurel_ion::decode_with_config(&bytes, config)
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            });
            (file, result)
        })
        .collect();

    let mut failures = 0;
    for (file, result) in results {
        match result {
            Ok(()) => println!("ok    {}", file.display()),
            Err(e) => {
                failures += 1;
                println!("FAIL  {}: {:#}", file.display(), e);
            }
        }
    }
    log::info!("checked {} file(s), {} failed", files.len(), failures);
    failures
}
