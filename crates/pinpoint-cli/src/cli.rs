//! Command line definitions

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Synthesize unique CSS selectors for elements of an HTML document.
#[derive(Debug, Clone, Parser)]
#[command(name = "pinpoint")]
#[command(author, version, about)]
pub struct Cli {
    /// HTML file to load
    pub html: PathBuf,

    /// Elements to synthesize selectors for
    #[arg(short, long, default_value = "body *")]
    pub targets: String,

    /// Element within which selectors must be unique (default: the document)
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Search settings as JSON
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Time budget per target in milliseconds
    #[arg(long)]
    pub budget_ms: Option<u64>,

    /// Domain vocabulary that earns a scoring bonus (repeatable)
    #[arg(long = "relevant")]
    pub relevant: Vec<String>,

    /// Reject ids containing digits
    #[arg(long)]
    pub strict_ids: bool,

    /// Skip the path optimizer
    #[arg(long)]
    pub no_optimize: bool,

    /// Targets written between output flushes and progress lines
    #[arg(long, default_value_t = 8)]
    pub chunk_size: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tsv)]
    pub format: OutputFormat,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `selector<TAB>outcome<TAB>strategy`
    Tsv,
    /// One JSON object per line
    Json,
}
