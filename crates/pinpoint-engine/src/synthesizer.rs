//! Synthesis driver
//!
//! Ties the pieces together for one target: cache lookup, the trivial path
//! for elements without usable ancestors, the budgeted search, the optimizer
//! and finally the fallback ladder.

use std::fmt;
use std::time::Duration;

use pinpoint_dom::NodeId;
use serde::Serialize;

use crate::SynthesisError;
use crate::cache::{CacheEntry, NodeSignature, SelectorCache};
use crate::config::{ConfigError, SearchConfig};
use crate::fallback::{Fallback, FallbackLadder};
use crate::optimizer::PathOptimizer;
use crate::provider::DocumentProvider;
use crate::scorer::Scorer;
use crate::search::{Budget, Candidate, Exhaustion, PathSearch};

/// How well the selector identifies the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Resolves to exactly the target within the scope
    Unique,
    /// Matches the target among others
    BestEffort,
    /// Positional or bare fallback, not verified
    Degraded,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::BestEffort => "best_effort",
            Self::Degraded => "degraded",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage produced the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Trivial,
    Search,
    Optimized,
    Pool,
    AncestorChain,
    StableIdentifier,
    LastResort,
    Cached,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trivial => "trivial",
            Self::Search => "search",
            Self::Optimized => "optimized",
            Self::Pool => "pool",
            Self::AncestorChain => "ancestor_chain",
            Self::StableIdentifier => "stable_identifier",
            Self::LastResort => "last_resort",
            Self::Cached => "cached",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected during one call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// Candidate paths resolved against the document
    pub checks: usize,
    /// Candidates skipped because they failed to parse or resolve
    pub invalid: usize,
    /// Deepest level reached by the search
    pub depth: usize,
    /// Set when the search stopped on a limit
    pub exhausted: Option<Exhaustion>,
    pub elapsed: Duration,
    pub cache_hit: bool,
    /// Fragments removed by the optimizer
    pub optimized_away: usize,
}

/// Result of one synthesis call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synthesis {
    pub selector: String,
    pub outcome: Outcome,
    pub strategy: Strategy,
    pub stats: SearchStats,
}

impl Synthesis {
    fn new(selector: String, outcome: Outcome, strategy: Strategy) -> Self {
        Self {
            selector,
            outcome,
            strategy,
            stats: SearchStats::default(),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.outcome == Outcome::Unique
    }
}

impl From<Fallback> for Synthesis {
    fn from(fallback: Fallback) -> Self {
        Self::new(fallback.selector, fallback.outcome, fallback.strategy)
    }
}

/// Selector synthesizer
#[derive(Debug, Clone, Default)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a selector for `target`.
    ///
    /// Always produces a selector for a valid target; the outcome tells how
    /// far it can be trusted. Fails only on a malformed config or a target
    /// that is not an element inside `config.root`.
    pub fn synthesize<D: DocumentProvider + ?Sized>(
        &self,
        doc: &D,
        target: NodeId,
        config: &SearchConfig,
        cache: &mut SelectorCache,
    ) -> Result<Synthesis, SynthesisError> {
        config.validate()?;
        if !doc.is_element(target) {
            return Err(SynthesisError::InvalidTarget(target));
        }
        if !doc.contains(config.root, target) {
            return Err(ConfigError::RootNotAncestor {
                root: config.root,
                target,
            }
            .into());
        }

        let budget = Budget::start(config);
        let cacheable = target != config.root;
        let signature = cacheable
            .then(|| NodeSignature::compute(doc, target, config.fingerprint()))
            .flatten();

        if let Some(signature) = &signature
            && let Some(entry) = cache.lookup(signature, doc, target, config.root)
        {
            let mut result = Synthesis::new(entry.selector, entry.outcome, Strategy::Cached);
            result.stats.cache_hit = true;
            result.stats.elapsed = budget.elapsed();
            tracing::debug!(selector = %result.selector, outcome = %result.outcome, "cache hit");
            return Ok(result);
        }

        let mut stats = SearchStats::default();
        let mut result = self.compute(doc, target, config, &budget, &mut stats);
        stats.elapsed = budget.elapsed();
        result.stats = stats;

        if let Some(signature) = signature
            && result.outcome != Outcome::Degraded
        {
            cache.insert(
                signature,
                CacheEntry {
                    selector: result.selector.clone(),
                    outcome: result.outcome,
                },
            );
        }

        tracing::debug!(
            selector = %result.selector,
            outcome = %result.outcome,
            strategy = %result.strategy,
            checks = result.stats.checks,
            depth = result.stats.depth,
            elapsed_us = result.stats.elapsed.as_micros() as u64,
            "synthesized selector"
        );
        Ok(result)
    }

    fn compute<D: DocumentProvider + ?Sized>(
        &self,
        doc: &D,
        target: NodeId,
        config: &SearchConfig,
        budget: &Budget,
        stats: &mut SearchStats,
    ) -> Synthesis {
        let settings = &config.settings;
        let scorer = Scorer::new(&settings.relevant_terms, settings.length_threshold);
        let ladder = FallbackLadder::new(doc, config, budget);
        let mut search = PathSearch::new(doc, config, &scorer, budget);
        let parent = doc.parent_element(target);

        if target == config.root || parent.is_none() {
            if let Some(reason) = budget.search_exhausted() {
                stats.exhausted = Some(reason);
                return ladder.last_resort(target).into();
            }
            // the root itself can only be told apart from its parent's side
            let scope = if target == config.root {
                parent.unwrap_or(config.root)
            } else {
                config.root
            };
            return match search.trivial(target, scope, stats) {
                Some(candidate) => {
                    let outcome = Self::outcome_of(&candidate);
                    Synthesis::new(candidate.selector, outcome, Strategy::Trivial)
                }
                None => ladder.last_resort(target).into(),
            };
        }

        let Some(found) = search.run(target, stats) else {
            if let Some(reason) = stats.exhausted {
                tracing::debug!(?reason, checks = stats.checks, "search stopped, falling back");
            }
            return ladder.run(target, search.pool()).into();
        };

        let len = found.path.len();
        if !settings.optimize || len <= 2 || len < settings.optimize_min_length {
            return Synthesis::new(found.selector, Outcome::Unique, Strategy::Search);
        }

        let optimizer = PathOptimizer::new(doc, config.root, target, &scorer, budget);
        let optimized = optimizer.optimize(&found.path);
        if optimized.len() < len {
            stats.optimized_away = len - optimized.len();
            Synthesis::new(optimized.compile(), Outcome::Unique, Strategy::Optimized)
        } else {
            Synthesis::new(found.selector, Outcome::Unique, Strategy::Search)
        }
    }

    fn outcome_of(candidate: &Candidate) -> Outcome {
        if candidate.unique {
            Outcome::Unique
        } else if candidate.contains_target {
            Outcome::BestEffort
        } else {
            Outcome::Degraded
        }
    }
}
