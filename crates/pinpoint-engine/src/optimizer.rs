//! Path optimizer
//!
//! Drops interior levels from a unique path while it stays unique. The
//! target level, the outermost level and id anchors are never removed.

use std::cmp::Ordering;
use std::collections::HashSet;

use pinpoint_dom::NodeId;

use crate::fragment::FragmentKind;
use crate::path::CandidatePath;
use crate::provider::DocumentProvider;
use crate::scorer::Scorer;
use crate::search::Budget;

/// Shortens unique paths within the remaining budget
pub struct PathOptimizer<'a, D: DocumentProvider + ?Sized> {
    doc: &'a D,
    root: NodeId,
    target: NodeId,
    scorer: &'a Scorer,
    budget: &'a Budget,
}

impl<'a, D: DocumentProvider + ?Sized> PathOptimizer<'a, D> {
    pub fn new(
        doc: &'a D,
        root: NodeId,
        target: NodeId,
        scorer: &'a Scorer,
        budget: &'a Budget,
    ) -> Self {
        Self {
            doc,
            root,
            target,
            scorer,
            budget,
        }
    }

    /// Shortest unique variant of `path` found before the hard deadline.
    /// Returns `path` itself when nothing can be removed.
    pub fn optimize(&self, path: &CandidatePath) -> CandidatePath {
        let mut best = path.clone();
        let mut visited = HashSet::new();
        visited.insert(path.levels());
        self.descend(path, &mut best, &mut visited);
        best
    }

    fn descend(
        &self,
        path: &CandidatePath,
        best: &mut CandidatePath,
        visited: &mut HashSet<Vec<usize>>,
    ) {
        let last = path.len().saturating_sub(1);
        for index in 1..last {
            if self.budget.hard_exhausted() {
                return;
            }
            if path.fragments()[index].kind == FragmentKind::Id {
                continue;
            }
            let shorter = path.without(index);
            if !visited.insert(shorter.levels()) {
                continue;
            }
            if !self.is_unique(&shorter) {
                continue;
            }
            if self.better(&shorter, best) {
                *best = shorter.clone();
            }
            self.descend(&shorter, best, visited);
        }
    }

    fn is_unique(&self, path: &CandidatePath) -> bool {
        let selector = path.compile();
        match self.doc.resolve(&selector, self.root, 2) {
            Ok(matches) => matches.len() == 1 && matches[0] == self.target,
            Err(err) => {
                tracing::trace!(%selector, %err, "optimizer produced an invalid selector");
                false
            }
        }
    }

    /// Fewer fragments, then shorter text, then scorer order
    fn better(&self, a: &CandidatePath, b: &CandidatePath) -> bool {
        let (text_a, text_b) = (a.compile(), b.compile());
        a.len()
            .cmp(&b.len())
            .then_with(|| text_a.len().cmp(&text_b.len()))
            .then_with(|| Scorer::compare(&self.scorer.score(a), &self.scorer.score(b)))
            == Ordering::Less
    }
}
