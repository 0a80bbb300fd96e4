//! Pinpoint CLI
//!
//! Loads an HTML document, picks target elements with a selector and
//! synthesizes a selector for each. Targets are processed sequentially; a
//! chunk only groups them for an output flush and a progress line, and all
//! chunks share one cache.

mod cli;

pub use cli::{Cli, OutputFormat};

use std::fs;
use std::io::Write;

use anyhow::{Context, Result, bail};
use pinpoint_css::query_selector_all;
use pinpoint_dom::{DomTree, NodeId};
use pinpoint_engine::{
    SearchConfig, SearchSettings, SelectorCache, SelectorSanitizer, Synthesis, synthesize,
};
use tracing::{debug, info};

/// Install the tracing subscriber, logging to stderr
pub fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level: tracing::Level = level.parse().context("Invalid log level")?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string())))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

/// Settings from `--config` with flag overrides applied
pub fn load_settings(cli: &Cli) -> Result<SearchSettings> {
    let mut settings = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SearchSettings::from_json(&json)
                .with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => SearchSettings::default(),
    };

    if let Some(budget) = cli.budget_ms {
        settings.time_budget_ms = budget;
    }
    settings.relevant_terms.extend(cli.relevant.iter().cloned());
    if cli.strict_ids {
        settings.reject_numeric_ids = true;
    }
    if cli.no_optimize {
        settings.optimize = false;
    }
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

/// Scope element named by `selector`, or the document
fn resolve_scope(tree: &DomTree, selector: Option<&str>) -> Result<NodeId> {
    let Some(selector) = selector else {
        return Ok(tree.root());
    };
    let matches = query_selector_all(tree, tree.root(), selector)
        .with_context(|| format!("invalid scope selector '{selector}'"))?;
    match matches.first() {
        Some(&scope) => Ok(scope),
        None => bail!("scope '{selector}' matches nothing"),
    }
}

/// Synthesize selectors for every target, one after another, and write one
/// line per target. Output is flushed after every `chunk_size` targets.
pub fn run(cli: &Cli, tree: &DomTree, out: &mut impl Write) -> Result<()> {
    if cli.chunk_size == 0 {
        bail!("chunk size must be at least 1");
    }

    let settings = load_settings(cli)?;
    let scope = resolve_scope(tree, cli.scope.as_deref())?;
    let config = SearchConfig::from_settings(scope, settings);

    let targets = query_selector_all(tree, scope, &cli.targets)
        .with_context(|| format!("invalid target selector '{}'", cli.targets))?;
    if targets.is_empty() {
        info!(targets = %cli.targets, "no matching elements");
        return Ok(());
    }

    let sanitizer = SelectorSanitizer::new();
    let mut cache = SelectorCache::new();
    let chunks = targets.len().div_ceil(cli.chunk_size);

    for (index, chunk) in targets.chunks(cli.chunk_size).enumerate() {
        for &target in chunk {
            let mut result = synthesize(tree, target, &config, &mut cache)
                .with_context(|| format!("synthesis failed for node {target}"))?;
            result.selector = sanitizer.sanitize_or_empty(&result.selector);
            write_result(cli.format, target, &result, out)?;
        }
        out.flush()?;
        info!(chunk = index + 1, of = chunks, size = chunk.len(), "processed chunk");
    }

    let stats = cache.stats();
    debug!(
        hits = stats.hits,
        misses = stats.misses,
        rejected = stats.rejected,
        size = stats.size,
        "cache stats"
    );
    Ok(())
}

fn write_result(
    format: OutputFormat,
    target: NodeId,
    result: &Synthesis,
    out: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Tsv => {
            writeln!(out, "{}\t{}\t{}", result.selector, result.outcome, result.strategy)?;
        }
        OutputFormat::Json => {
            let line = serde_json::json!({
                "node": target.index(),
                "selector": result.selector,
                "outcome": result.outcome,
                "strategy": result.strategy,
                "stats": result.stats,
            });
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
