//! CLI parse: clap types for periodic-sync. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Periodically synchronizes a source folder to a target folder
#[derive(Parser, Debug)]
#[command(name = "periodic-sync")]
#[command(
    about = "Periodically synchronizes a source folder '--input-path' to a target folder '--output-path'"
)]
pub struct Cli {
    /// Input path (source folder)
    #[arg(short = 'i', long = "input-path")]
    pub input_path: Option<PathBuf>,

    /// Output path. Its contents are overwritten by the content of the input path
    #[arg(short = 'o', long = "output-path")]
    pub output_path: Option<PathBuf>,

    /// Synchronization time interval in seconds
    #[arg(short = 't', long = "time-interval", value_parser = clap::value_parser!(u64).range(1..))]
    pub time_interval: Option<u64>,

    /// Log file path
    #[arg(short = 'l', long = "log-file-path")]
    pub log_file_path: Option<PathBuf>,

    /// Debug mode: log every skipped file and scan detail
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Configuration file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Overwrite+rehash attempts per file before reporting a mismatch
    #[arg(long)]
    pub verify_attempts: Option<u32>,

    /// Read size in bytes used when hashing files
    #[arg(long)]
    pub chunk_size: Option<usize>,
}
