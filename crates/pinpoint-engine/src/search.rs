//! Path search
//!
//! Climbs from the target toward the scope root one level at a time. At each
//! depth the Cartesian product of per-level fragments is enumerated lazily in
//! ascending additive cost, pulled in small windows, ordered by the full
//! scorer and checked for uniqueness until a unique path turns up or the
//! budget runs out.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

use pinpoint_dom::NodeId;
use serde::Serialize;

use crate::config::{CancelToken, SearchConfig};
use crate::fragment::{FragmentGenerator, SelectorFragment};
use crate::path::CandidatePath;
use crate::provider::DocumentProvider;
use crate::scorer::{PathScore, Scorer};
use crate::synthesizer::SearchStats;

/// Default number of candidates kept for the fallback ladder
pub const DEFAULT_POOL_CAPACITY: usize = 32;

/// Why a search stopped before finding a unique path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    Time,
    PathChecks,
    Cancelled,
}

/// Wall-clock budget of one synthesis call
#[derive(Debug, Clone)]
pub struct Budget {
    started: Instant,
    search_limit: Duration,
    hard_limit: Duration,
    cancel: Option<CancelToken>,
}

impl Budget {
    /// Start the clock for `config`
    pub fn start(config: &SearchConfig) -> Self {
        Self {
            started: Instant::now(),
            search_limit: config.search_budget(),
            hard_limit: config.time_budget(),
            cancel: config.cancel.clone(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Whether the search phase must stop, and why
    pub fn search_exhausted(&self) -> Option<Exhaustion> {
        if self.is_cancelled() {
            Some(Exhaustion::Cancelled)
        } else if self.elapsed() >= self.search_limit {
            Some(Exhaustion::Time)
        } else {
            None
        }
    }

    /// Whether the full budget (reserve included) is spent
    pub fn hard_exhausted(&self) -> bool {
        self.is_cancelled() || self.elapsed() >= self.hard_limit
    }
}

/// Lazy Cartesian product over per-level cost lists, cheapest first.
///
/// Each level's costs must be ascending. Yields `(total cost, indices)` with
/// one index per level, never materializing the product.
#[derive(Debug)]
pub struct PathProduct {
    costs: Vec<Vec<f64>>,
    heap: BinaryHeap<ProductEntry>,
    seen: HashSet<Vec<usize>>,
}

#[derive(Debug)]
struct ProductEntry {
    cost: f64,
    indices: Vec<usize>,
}

impl PartialEq for ProductEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProductEntry {}

impl PartialOrd for ProductEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProductEntry {
    // reversed: BinaryHeap pops the cheapest entry
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.indices.cmp(&self.indices))
    }
}

impl PathProduct {
    pub fn new(costs: Vec<Vec<f64>>) -> Self {
        let mut product = Self {
            costs,
            heap: BinaryHeap::new(),
            seen: HashSet::new(),
        };
        if !product.costs.is_empty() && product.costs.iter().all(|level| !level.is_empty()) {
            let start = vec![0; product.costs.len()];
            product.push(start);
        }
        product
    }

    fn push(&mut self, indices: Vec<usize>) {
        if !self.seen.insert(indices.clone()) {
            return;
        }
        let cost = indices
            .iter()
            .zip(&self.costs)
            .map(|(&i, level)| level[i])
            .sum();
        self.heap.push(ProductEntry { cost, indices });
    }
}

impl Iterator for PathProduct {
    type Item = (f64, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.heap.pop()?;
        for level in 0..entry.indices.len() {
            if entry.indices[level] + 1 < self.costs[level].len() {
                let mut next = entry.indices.clone();
                next[level] += 1;
                self.push(next);
            }
        }
        Some((entry.cost, entry.indices))
    }
}

/// An inspected path with its verification result
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: CandidatePath,
    pub selector: String,
    pub score: PathScore,
    /// Resolves to exactly the target
    pub unique: bool,
    /// The match set includes the target
    pub contains_target: bool,
}

/// Bounded set of the best inspected candidates
#[derive(Debug, Clone)]
pub struct CandidatePool {
    capacity: usize,
    entries: Vec<Candidate>,
}

impl CandidatePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    fn rank(a: &Candidate, b: &Candidate) -> Ordering {
        b.unique
            .cmp(&a.unique)
            .then_with(|| b.contains_target.cmp(&a.contains_target))
            .then_with(|| Scorer::compare(&a.score, &b.score))
    }

    /// Insert a candidate, dropping the worst if over capacity
    pub fn offer(&mut self, candidate: Candidate) {
        if self.capacity == 0 {
            return;
        }
        let at = self
            .entries
            .partition_point(|e| Self::rank(e, &candidate) != Ordering::Greater);
        if at >= self.capacity {
            return;
        }
        self.entries.insert(at, candidate);
        self.entries.truncate(self.capacity);
    }

    /// Best candidate confirmed unique
    pub fn best_unique(&self) -> Option<&Candidate> {
        self.entries.first().filter(|c| c.unique)
    }

    /// Lowest-score candidate whose matches include the target
    pub fn best_containing(&self) -> Option<&Candidate> {
        self.entries.iter().find(|c| c.contains_target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CandidatePool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

enum DepthResult {
    Found(Candidate),
    Climb,
    Exhausted(Exhaustion),
}

/// Budgeted best-first search for a unique path
pub struct PathSearch<'a, D: DocumentProvider + ?Sized> {
    doc: &'a D,
    config: &'a SearchConfig,
    generator: FragmentGenerator<'a>,
    scorer: &'a Scorer,
    budget: &'a Budget,
    pool: CandidatePool,
}

impl<'a, D: DocumentProvider + ?Sized> PathSearch<'a, D> {
    pub fn new(doc: &'a D, config: &'a SearchConfig, scorer: &'a Scorer, budget: &'a Budget) -> Self {
        Self {
            doc,
            config,
            generator: FragmentGenerator::new(
                config.policy.as_ref(),
                config.escaper.as_ref(),
                &config.settings.relevant_terms,
            ),
            scorer,
            budget,
            pool: CandidatePool::default(),
        }
    }

    /// Candidates gathered so far
    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    /// Fragments of `node` stamped with `level`, cheapest first
    fn level_fragments(&self, node: NodeId, level: usize) -> Vec<SelectorFragment> {
        let mut fragments: Vec<_> = self
            .generator
            .generate(self.doc, node)
            .iter()
            .map(|fragment| fragment.at_level(level))
            .collect();
        fragments.sort_by(|a, b| {
            self.scorer
                .fragment_cost(a)
                .total_cmp(&self.scorer.fragment_cost(b))
        });
        fragments
    }

    /// Single-fragment path for a target with no usable ancestors.
    /// Verified in `scope`; never fails.
    pub fn trivial(&mut self, target: NodeId, scope: NodeId, stats: &mut SearchStats) -> Option<Candidate> {
        let best = self.level_fragments(target, 0).into_iter().next()?;
        let path = CandidatePath::new(vec![best]);
        let score = self.scorer.score(&path);
        stats.checks += 1;
        self.evaluate(path, score, target, scope, stats)
    }

    /// Climb toward the root looking for a unique path.
    ///
    /// A unique candidate is provisional: the climb goes on while the next
    /// depth's cheapest possible path could still score lower.
    pub fn run(&mut self, target: NodeId, stats: &mut SearchStats) -> Option<Candidate> {
        let config = self.config;
        let settings = &config.settings;
        let mut levels: Vec<Vec<SelectorFragment>> = Vec::new();
        let mut best: Option<Candidate> = None;
        let mut searched = false;
        let mut current = Some(target);

        while let Some(node) = current {
            if let Some(reason) = self.budget.search_exhausted() {
                stats.exhausted = Some(reason);
                return best;
            }
            if levels.len() >= settings.max_depth {
                break;
            }

            let fragments = self.level_fragments(node, levels.len());
            if fragments.is_empty() {
                break;
            }
            if let Some(found) = &best {
                let cheapest = levels.iter().chain([&fragments]).filter_map(|level| level.first());
                if !Scorer::can_beat(self.scorer.floor(cheapest), &found.score) {
                    tracing::trace!(selector = %found.selector, depth = levels.len(), "deeper paths cannot win");
                    break;
                }
            }
            levels.push(fragments);
            stats.depth = levels.len();

            if levels.len() >= settings.seed_length {
                searched = true;
                match self.search_depth(&levels, target, best.as_ref(), stats) {
                    DepthResult::Found(candidate) => best = Some(candidate),
                    DepthResult::Exhausted(reason) => {
                        stats.exhausted = Some(reason);
                        return best;
                    }
                    DepthResult::Climb => {}
                }
            }

            if node == config.root {
                break;
            }
            current = self.doc.parent_element(node);
        }

        // tree shallower than the seed length
        if !searched && !levels.is_empty() {
            match self.search_depth(&levels, target, None, stats) {
                DepthResult::Found(candidate) => best = Some(candidate),
                DepthResult::Exhausted(reason) => stats.exhausted = Some(reason),
                DepthResult::Climb => {}
            }
        }

        if best.is_none() {
            tracing::trace!(depth = levels.len(), "reached the top without a unique path");
        }
        best
    }

    fn limit_reached(&self, stats: &SearchStats) -> Option<Exhaustion> {
        self.budget.search_exhausted().or_else(|| {
            (stats.checks >= self.config.settings.max_path_checks).then_some(Exhaustion::PathChecks)
        })
    }

    /// Check the paths of one depth, cheapest first. With a `bound`, only
    /// candidates ranking before it are checked.
    fn search_depth(
        &mut self,
        levels: &[Vec<SelectorFragment>],
        target: NodeId,
        bound: Option<&Candidate>,
        stats: &mut SearchStats,
    ) -> DepthResult {
        let config = self.config;
        let settings = &config.settings;
        let costs = levels
            .iter()
            .map(|level| level.iter().map(|f| self.scorer.fragment_cost(f)).collect())
            .collect();
        let mut product = PathProduct::new(costs);
        let mut pulled = 0;
        let mut drained = false;

        loop {
            let mut window = Vec::with_capacity(settings.window_size);
            while !drained
                && window.len() < settings.window_size
                && pulled < settings.max_candidates_per_depth
            {
                if let Some(reason) = self.limit_reached(stats) {
                    return DepthResult::Exhausted(reason);
                }
                let Some((cost, indices)) = product.next() else {
                    drained = true;
                    break;
                };
                let floor = self.scorer.joined(cost, levels.len());
                if bound.is_some_and(|b| !Scorer::can_beat(floor, &b.score)) {
                    drained = true;
                    break;
                }
                pulled += 1;
                let path = CandidatePath::new(
                    indices
                        .iter()
                        .enumerate()
                        .map(|(level, &i)| levels[level][i].clone())
                        .collect(),
                );
                let score = self.scorer.score(&path);
                window.push((path, score));
            }
            if window.is_empty() {
                return DepthResult::Climb;
            }

            window.sort_by(|a, b| Scorer::compare(&a.1, &b.1));
            for (path, score) in window {
                if bound.is_some_and(|b| Scorer::compare(&score, &b.score) != Ordering::Less) {
                    continue;
                }
                if let Some(reason) = self.limit_reached(stats) {
                    return DepthResult::Exhausted(reason);
                }
                stats.checks += 1;
                let Some(candidate) = self.evaluate(path, score, target, config.root, stats)
                else {
                    continue;
                };
                if candidate.unique {
                    return DepthResult::Found(candidate);
                }
                self.pool.offer(candidate);
            }
        }
    }

    /// Resolve a path in `scope` and record whether it pins the target.
    /// Invalid selectors are counted and skipped.
    pub fn evaluate(
        &self,
        path: CandidatePath,
        score: PathScore,
        target: NodeId,
        scope: NodeId,
        stats: &mut SearchStats,
    ) -> Option<Candidate> {
        let selector = score.text.clone();
        let matches = match self.doc.resolve(&selector, scope, 2) {
            Ok(matches) => matches,
            Err(err) => {
                stats.invalid += 1;
                tracing::trace!(%selector, %err, "skipping invalid candidate");
                return None;
            }
        };

        let unique = matches.len() == 1 && matches[0] == target;
        let contains_target = unique
            || matches.contains(&target)
            || self.doc.is_match(&selector, scope, target).unwrap_or(false);
        tracing::trace!(%selector, unique, contains_target, score = score.score, "checked candidate");

        Some(Candidate {
            path,
            selector,
            score,
            unique,
            contains_target,
        })
    }
}
