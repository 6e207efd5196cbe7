mod patterns;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rindex::input::DEFAULT_INT_BYTES;
use rindex::{RIndex, RIndexBuilder, Serializable};

#[derive(Parser)]
#[command(name = "rindex")]
#[command(about = "r-index: count and locate patterns in run-length compressed texts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a precomputed BWT and run-boundary SA samples
    Build {
        /// Prefix of PREFIX.bwt, PREFIX.ssa and PREFIX.esa
        #[arg(value_name = "PREFIX")]
        prefix: PathBuf,

        /// Output index file (default: file name of PREFIX); ".ri" is appended when missing
        #[arg(short = 'o', long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Bytes per integer in the sample files
        #[arg(long, value_name = "N", default_value_t = DEFAULT_INT_BYTES)]
        int_bytes: usize,
    },

    /// Count the occurrences of every pattern in PAT_FILE
    Count {
        /// Index file
        #[arg(value_name = "INDEX")]
        index: PathBuf,

        /// Pattern file
        #[arg(value_name = "PAT_FILE")]
        patterns: PathBuf,
    },

    /// Locate the occurrences of every pattern in PAT_FILE
    Locate {
        /// Index file
        #[arg(value_name = "INDEX")]
        index: PathBuf,

        /// Pattern file
        #[arg(value_name = "PAT_FILE")]
        patterns: PathBuf,
    },
}

fn output_path(prefix: &Path, output: Option<PathBuf>) -> PathBuf {
    let mut path = output
        .or_else(|| prefix.file_name().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("index"));
    if path.extension().map_or(true, |ext| ext != "ri") {
        let mut s = path.into_os_string();
        s.push(".ri");
        path = PathBuf::from(s);
    }
    path
}

fn build(prefix: &Path, output: Option<PathBuf>, int_bytes: usize) -> Result<()> {
    let output = output_path(prefix, output);
    log::info!(
        "building the r-index from the precomputed BWT/SA samples in {}",
        prefix.display()
    );
    let index = RIndexBuilder::from_prefix(prefix, int_bytes)?.build()?;

    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let size = index.serialize_into(&mut writer)?;
    writer.flush()?;
    log::info!("stored the index ({size} bytes) in {}", output.display());
    Ok(())
}

fn load(path: &Path) -> Result<RIndex> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    RIndex::deserialize_from(BufReader::new(file))
        .with_context(|| format!("failed to load the index from {}", path.display()))
}

fn load_patterns(path: &Path) -> Result<Vec<Vec<u8>>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    patterns::read_patterns(BufReader::new(file))
        .with_context(|| format!("invalid pattern file {}", path.display()))
}

fn count(index_path: &Path, pattern_path: &Path) -> Result<()> {
    let index = load(index_path)?;
    let patterns = load_patterns(pattern_path)?;

    let mut elapsed = 0u128;
    let mut total = 0;
    for pattern in &patterns {
        let start = Instant::now();
        let range = index.count(pattern);
        elapsed += start.elapsed().as_nanos();
        total += range.len();
    }

    println!("\tTotal number of occurrences {total}");
    println!("\t{:.3} nanosecs/pat", elapsed as f64 / patterns.len() as f64);
    println!("\t{:.3} nanosecs/occ", elapsed as f64 / total as f64);
    Ok(())
}

fn locate(index_path: &Path, pattern_path: &Path) -> Result<()> {
    let index = load(index_path)?;
    let patterns = load_patterns(pattern_path)?;

    let mut elapsed = 0u128;
    let mut total = 0;
    for pattern in &patterns {
        let start = Instant::now();
        let occs = index.locate(pattern);
        elapsed += start.elapsed().as_micros();
        total += occs.len();
    }

    println!("\tTotal number of occurrences {total}");
    println!("\t{:.3} microsecs/pat", elapsed as f64 / patterns.len() as f64);
    println!("\t{:.3} microsecs/occ", elapsed as f64 / total as f64);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match cli.command {
        Commands::Build {
            prefix,
            output,
            int_bytes,
        } => build(&prefix, output, int_bytes),
        Commands::Count { index, patterns } => count(&index, &patterns),
        Commands::Locate { index, patterns } => locate(&index, &patterns),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
