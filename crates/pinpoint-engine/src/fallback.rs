//! Fallback ladder
//!
//! Strategies tried, in order, after the search fails to find a unique path.
//! The first three only run while the full budget lasts; the last one needs
//! no queries and always produces a selector.

use pinpoint_dom::NodeId;

use crate::config::SearchConfig;
use crate::fragment::{FragmentGenerator, FragmentKind, SelectorFragment};
use crate::provider::DocumentProvider;
use crate::search::{Budget, CandidatePool};
use crate::synthesizer::{Outcome, Strategy};

/// Maximum number of levels in an ancestor chain
pub const MAX_CHAIN_LEVELS: usize = 5;

/// Selector produced by a fallback strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub selector: String,
    pub outcome: Outcome,
    pub strategy: Strategy,
}

impl Fallback {
    fn new(selector: String, outcome: Outcome, strategy: Strategy) -> Self {
        Self {
            selector,
            outcome,
            strategy,
        }
    }
}

/// Degrading strategies for targets the search could not pin down
pub struct FallbackLadder<'a, D: DocumentProvider + ?Sized> {
    doc: &'a D,
    config: &'a SearchConfig,
    generator: FragmentGenerator<'a>,
    budget: &'a Budget,
}

impl<'a, D: DocumentProvider + ?Sized> FallbackLadder<'a, D> {
    pub fn new(doc: &'a D, config: &'a SearchConfig, budget: &'a Budget) -> Self {
        Self {
            doc,
            config,
            generator: FragmentGenerator::new(
                config.policy.as_ref(),
                config.escaper.as_ref(),
                &config.settings.relevant_terms,
            ),
            budget,
        }
    }

    /// Run the ladder; never fails
    pub fn run(&self, target: NodeId, pool: &CandidatePool) -> Fallback {
        let found = self
            .within_budget(|| self.from_pool(pool))
            .or_else(|| self.within_budget(|| self.ancestor_chain(target)))
            .or_else(|| self.within_budget(|| self.stable_identifier(target)));

        match found {
            Some(found) => {
                tracing::debug!(selector = %found.selector, strategy = ?found.strategy, "fallback");
                found
            }
            None => self.last_resort(target),
        }
    }

    fn within_budget(&self, attempt: impl FnOnce() -> Option<Fallback>) -> Option<Fallback> {
        if self.budget.hard_exhausted() {
            tracing::debug!("budget spent, skipping to last resort");
            return None;
        }
        attempt()
    }

    /// Strategy 1: best candidate inspected during the search
    pub fn from_pool(&self, pool: &CandidatePool) -> Option<Fallback> {
        if let Some(candidate) = pool.best_unique() {
            return Some(Fallback::new(
                candidate.selector.clone(),
                Outcome::Unique,
                Strategy::Pool,
            ));
        }
        pool.best_containing().map(|candidate| {
            Fallback::new(candidate.selector.clone(), Outcome::BestEffort, Strategy::Pool)
        })
    }

    /// Best single fragment for one chain level: id, stable class, tag with ordinal
    fn chain_fragment(&self, node: NodeId) -> Option<SelectorFragment> {
        let fragments = self.generator.generate(self.doc, node);
        let pick = |kind: FragmentKind| fragments.iter().find(|f| f.kind == kind).cloned();
        pick(FragmentKind::Id)
            .or_else(|| pick(FragmentKind::Class))
            .or_else(|| pick(FragmentKind::TagNthOfType))
            .or_else(|| pick(FragmentKind::Tag))
            .or_else(|| fragments.first().cloned())
    }

    /// Strategy 2: up to five levels joined by descendant combinators
    pub fn ancestor_chain(&self, target: NodeId) -> Option<Fallback> {
        let mut chain = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            if chain.len() == MAX_CHAIN_LEVELS {
                break;
            }
            chain.push(self.chain_fragment(node)?.text);
            if node == self.config.root {
                break;
            }
            current = self.doc.parent_element(node);
        }

        let mut full = None;
        for len in 1..=chain.len() {
            if self.budget.hard_exhausted() {
                return None;
            }
            let selector = chain[..len]
                .iter()
                .rev()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            let Ok(matches) = self.doc.resolve(&selector, self.config.root, 2) else {
                continue;
            };
            if matches.len() == 1 && matches[0] == target {
                return Some(Fallback::new(selector, Outcome::Unique, Strategy::AncestorChain));
            }
            if len == chain.len() {
                full = Some(selector);
            }
        }

        let selector = full?;
        self.doc
            .is_match(&selector, self.config.root, target)
            .ok()
            .filter(|&contained| contained)
            .map(|_| Fallback::new(selector, Outcome::BestEffort, Strategy::AncestorChain))
    }

    /// Strategy 3: the target's best stable identifier on its own
    pub fn stable_identifier(&self, target: NodeId) -> Option<Fallback> {
        let fragments = self.generator.generate(self.doc, target);
        let fragment = [FragmentKind::Id, FragmentKind::TestAttribute, FragmentKind::Class]
            .into_iter()
            .find_map(|kind| fragments.iter().find(|f| f.kind == kind))?;
        self.doc.resolve(&fragment.text, self.config.root, 1).ok()?;
        Some(Fallback::new(
            fragment.text.clone(),
            Outcome::Degraded,
            Strategy::StableIdentifier,
        ))
    }

    /// Strategy 4: tag with an ordinal, or the bare tag
    pub fn last_resort(&self, target: NodeId) -> Fallback {
        let escaper = self.config.escaper.as_ref();
        let tag = self
            .doc
            .tag_name(target)
            .map_or_else(|| "*".to_string(), |t| escaper.identifier(t));
        let position = self.doc.position(target);

        let selector = match position {
            Some(pos) if self.doc.parent_element(target).is_some() => {
                format!("{tag}:nth-of-type({})", pos.type_index)
            }
            Some(pos) => format!("{tag}:nth-child({})", pos.index),
            None => tag,
        };
        tracing::debug!(%selector, "last resort fallback");
        Fallback::new(selector, Outcome::Degraded, Strategy::LastResort)
    }
}
