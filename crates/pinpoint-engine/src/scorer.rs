//! Penalty & tie-break scoring
//!
//! Fragment costs are additive so the search can enumerate paths in cost
//! order without scoring them. Path scores add the terms that depend on the
//! path as a whole (combinators, repetition, length).

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::fragment::{FragmentKind, SelectorFragment};
use crate::path::CandidatePath;
use crate::validator::{is_vendor_scoped, looks_generated};

const NTH_OF_TYPE_INSTABILITY: f64 = 2.0;
const NTH_CHILD_INSTABILITY: f64 = 4.0;
const GENERATED_INSTABILITY: f64 = 25.0;

const PSEUDO_COMPLEXITY: f64 = 0.5;
const ATTRIBUTE_COMPLEXITY: f64 = 0.25;
const CHILD_COMBINATOR_COST: f64 = 0.1;
const DESCENDANT_COMBINATOR_COST: f64 = 0.3;
const REPEAT_COST: f64 = 1.0;
const LENGTH_COST_PER_CHAR: f64 = 0.05;
const DOMAIN_BONUS_PER_HIT: f64 = 0.1;

const SCORE_EPSILON: f64 = 1e-9;

/// Full score of a compiled path with its tie-break keys
#[derive(Debug, Clone, PartialEq)]
pub struct PathScore {
    pub score: f64,
    pub levels: usize,
    /// Negated sum of instability penalties (higher is more stable)
    pub stability: f64,
    pub domain_bonus: f64,
    /// -1 per positional fragment and per vendor-scoped token
    pub compatibility: i32,
    pub text: String,
}

/// Scores fragments and paths
#[derive(Debug, Clone)]
pub struct Scorer {
    relevant_terms: Vec<String>,
    length_threshold: usize,
}

impl Scorer {
    pub fn new(relevant_terms: &[String], length_threshold: usize) -> Self {
        Self {
            relevant_terms: relevant_terms
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| t.to_lowercase())
                .collect(),
            length_threshold,
        }
    }

    fn hits(&self, token: &str) -> usize {
        if self.relevant_terms.is_empty() {
            return 0;
        }
        let token = token.to_lowercase();
        self.relevant_terms
            .iter()
            .filter(|t| token.contains(t.as_str()))
            .count()
    }

    /// Penalty for fragments likely to break when the page changes
    pub fn instability(&self, fragment: &SelectorFragment) -> f64 {
        let positional = match fragment.kind {
            FragmentKind::TagNthOfType => NTH_OF_TYPE_INSTABILITY,
            FragmentKind::TagNthChild => NTH_CHILD_INSTABILITY,
            _ => 0.0,
        };
        let generated = match fragment.kind {
            FragmentKind::Id
            | FragmentKind::Class
            | FragmentKind::TestAttribute
            | FragmentKind::Attribute
                if looks_generated(&fragment.token) || is_vendor_scoped(&fragment.token) =>
            {
                GENERATED_INSTABILITY
            }
            _ => 0.0,
        };
        positional + generated
    }

    pub fn domain_bonus(&self, fragment: &SelectorFragment) -> f64 {
        self.hits(&fragment.token) as f64 * DOMAIN_BONUS_PER_HIT
    }

    /// Additive cost of one fragment, never negative
    pub fn fragment_cost(&self, fragment: &SelectorFragment) -> f64 {
        let complexity = if fragment.kind.is_positional() {
            PSEUDO_COMPLEXITY
        } else if fragment.kind.is_attribute() {
            ATTRIBUTE_COMPLEXITY
        } else {
            0.0
        };
        (fragment.penalty + self.instability(fragment) + complexity
            - self.domain_bonus(fragment))
        .max(0.0)
    }

    /// `additive` fragment cost of a contiguous path plus its child combinators
    pub fn joined(&self, additive: f64, levels: usize) -> f64 {
        additive + levels.saturating_sub(1) as f64 * CHILD_COMBINATOR_COST
    }

    /// Lowest score reachable by a contiguous path over levels whose cheapest
    /// fragments are `cheapest`
    pub fn floor<'f>(&self, cheapest: impl IntoIterator<Item = &'f SelectorFragment>) -> f64 {
        let (levels, additive) = cheapest
            .into_iter()
            .fold((0, 0.0), |(n, cost), f| (n + 1, cost + self.fragment_cost(f)));
        self.joined(additive, levels)
    }

    /// Whether a path scoring no less than `floor` could rank before `best`.
    /// Equal scores lose to `best`, which has fewer levels.
    pub fn can_beat(floor: f64, best: &PathScore) -> bool {
        floor < best.score - SCORE_EPSILON
    }

    /// Score a path including whole-path terms
    pub fn score(&self, path: &CandidatePath) -> PathScore {
        let text = path.compile();
        let fragments = path.fragments();

        let mut score: f64 = fragments.iter().map(|f| self.fragment_cost(f)).sum();

        let (child, descendant) = path.combinator_counts();
        score += child as f64 * CHILD_COMBINATOR_COST;
        score += descendant as f64 * DESCENDANT_COMBINATOR_COST;

        let mut seen = HashSet::new();
        let repeats = fragments
            .iter()
            .filter(|f| !seen.insert(f.text.as_str()))
            .count();
        score += repeats as f64 * REPEAT_COST;

        let length = text.chars().count();
        if length > self.length_threshold {
            score += (length - self.length_threshold) as f64 * LENGTH_COST_PER_CHAR;
        }

        let compatibility = fragments
            .iter()
            .map(|f| {
                let positional = i32::from(f.kind.is_positional());
                let vendor = i32::from(f.kind != FragmentKind::Tag && is_vendor_scoped(&f.token));
                -(positional + vendor)
            })
            .sum();

        PathScore {
            score,
            levels: fragments.len(),
            stability: -fragments.iter().map(|f| self.instability(f)).sum::<f64>(),
            domain_bonus: fragments.iter().map(|f| self.domain_bonus(f)).sum(),
            compatibility,
            text,
        }
    }

    /// Total order: lower score first, then the tie-break chain
    pub fn compare(a: &PathScore, b: &PathScore) -> Ordering {
        if (a.score - b.score).abs() >= SCORE_EPSILON {
            return a.score.total_cmp(&b.score);
        }
        a.levels
            .cmp(&b.levels)
            .then_with(|| b.stability.total_cmp(&a.stability))
            .then_with(|| b.domain_bonus.total_cmp(&a.domain_bonus))
            .then_with(|| b.compatibility.cmp(&a.compatibility))
            .then_with(|| a.text.cmp(&b.text))
    }
}
