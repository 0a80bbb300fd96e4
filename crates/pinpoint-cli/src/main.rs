//! Pinpoint - Main Entry Point

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use pinpoint_cli::{Cli, init_logging, run};
use pinpoint_html::HtmlParser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let tree = HtmlParser::new()
        .parse_file(&cli.html)
        .with_context(|| format!("failed to load {}", cli.html.display()))?;
    tracing::info!(path = %cli.html.display(), nodes = tree.len(), "loaded document");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(&cli, &tree, &mut out)
}
