use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Csv,
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Directory for export files (created if missing; defaults to the desktop)
    #[arg(short, long, visible_alias = "output-path")]
    pub output: Option<PathBuf>,

    /// Maximum rows read from each database (overrides config when set)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_results: Option<u32>,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Limit extraction to these browser families (comma-separated list)
    #[arg(long, value_delimiter = ',')]
    pub families: Option<Vec<String>>,

    /// Export format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Directory for temporary database snapshots (overrides config when set)
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
