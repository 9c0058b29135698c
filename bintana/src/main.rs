//! Command-line tool for converting markdown and transcripts to Tana Paste.
//!
//! Usage: tana-paste [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -o, --output <FILE>     Write output to FILE (numbered files when chunked)
//!   -w, --write             Write `<input>.tana` next to each input file
//!       --chunk-size <N>    Maximum characters per chunk [default: 90000]
//!   -c, --config <FILE>     Options file [default: ./tana.toml when present]
//!   -v, --verbose           Debug logging on stderr
//!   -h, --help              Print help
//!   -V, --version           Print version
//!
//! Reads stdin when FILE is omitted or `-`. A directory converts every
//! `.md` file in it and implies `--write`.

use clap::Parser;
use libtana::{chunk_content, convert_with_options, ConvertOptions, Error, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "tana.toml";
const OUTPUT_EXTENSION: &str = "tana";

#[derive(Parser, Debug)]
#[command(name = "tana-paste", version)]
#[command(about = "Convert markdown and transcripts to Tana Paste", long_about = None)]
struct Args {
    /// Input file or directory; stdin when omitted or "-"
    #[arg(value_name = "FILE|DIR")]
    input: Option<PathBuf>,

    /// Write output to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write `<input>.tana` next to each input file
    #[arg(short, long, conflicts_with = "output")]
    write: bool,

    /// Maximum size of one chunk, in characters
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: Option<u64>,

    /// TOML options file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = match load_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let input = args
        .input
        .as_deref()
        .filter(|path| path.as_os_str() != "-");

    if let Some(dir) = input.filter(|path| path.is_dir()) {
        if args.output.is_some() {
            eprintln!("Error: --output cannot be used with directory input");
            process::exit(1);
        }
        process::exit(process_directory(dir, &options));
    }

    if args.write && input.is_none() {
        eprintln!("Error: --write requires an input file");
        process::exit(1);
    }

    let destination = match (&args.output, input) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(path)) if args.write => Some(path.with_extension(OUTPUT_EXTENSION)),
        _ => None,
    };

    if let Err(e) = process_input(input, destination.as_deref(), &options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Options from `--config`, else `./tana.toml` when present, else defaults.
/// `--chunk-size` overrides whatever the file says.
fn load_options(args: &Args) -> Result<ConvertOptions> {
    let mut options = match &args.config {
        Some(path) => ConvertOptions::load(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => ConvertOptions::load(DEFAULT_CONFIG)?,
        None => ConvertOptions::default(),
    };
    if let Some(size) = args.chunk_size {
        options.max_chunk_size = usize::try_from(size).unwrap_or(usize::MAX);
    }
    Ok(options)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|e| Error::io(path, e)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| Error::io("<stdin>", e))?;
            Ok(buffer)
        }
    }
}

fn process_input(
    input: Option<&Path>,
    destination: Option<&Path>,
    options: &ConvertOptions,
) -> Result<()> {
    let text = read_input(input)?;
    let output = convert_with_options(&text, options);
    let chunks = chunk_content(&output, options.max_chunk_size);
    debug!(chunks = chunks.len(), "converted input");

    match destination {
        Some(path) => write_chunks(&chunks, path),
        None => {
            print_chunks(&chunks);
            Ok(())
        }
    }
}

/// Convert every `.md` file in `dir`, writing `<name>.tana` beside each.
/// Returns the process exit code.
fn process_directory(dir: &Path, options: &ConvertOptions) -> i32 {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir.display(), e);
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut had_errors = false;
    for path in paths.iter().map(PathBuf::as_path) {
        let destination = path.with_extension(OUTPUT_EXTENSION);
        if let Err(e) = process_input(Some(path), Some(destination.as_path()), options) {
            eprintln!("Error: {}", e);
            had_errors = true;
        }
    }
    info!(files = paths.len(), "converted directory");

    if had_errors {
        1
    } else {
        0
    }
}

fn write_chunks(chunks: &[String], path: &Path) -> Result<()> {
    if let [only] = chunks {
        return fs::write(path, only).map_err(|e| Error::io(path, e));
    }
    for (i, chunk) in chunks.iter().enumerate() {
        let target = numbered_path(path, i + 1);
        fs::write(&target, chunk).map_err(|e| Error::io(&target, e))?;
        eprintln!("Created chunk {} in {}", i + 1, target.display());
    }
    Ok(())
}

fn print_chunks(chunks: &[String]) {
    if let [only] = chunks {
        print!("{}", only);
        // The no-text notice has no trailing newline
        if !only.ends_with('\n') {
            println!();
        }
        return;
    }
    for (i, chunk) in chunks.iter().enumerate() {
        println!("=== Chunk {} ===", i + 1);
        print!("{}", chunk);
    }
}

/// `notes.tana` -> `notes_2.tana`
fn numbered_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    path.with_file_name(name)
}
