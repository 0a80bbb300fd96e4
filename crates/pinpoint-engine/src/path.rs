//! Candidate paths
//!
//! A path holds one fragment per level, from the target (level 0) upward.
//! Adjacent levels compile to a child combinator; a gap left by the
//! optimizer compiles to a descendant combinator.

use crate::fragment::SelectorFragment;

/// Fragments ordered by strictly increasing level, starting at level 0
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePath {
    fragments: Vec<SelectorFragment>,
}

impl CandidatePath {
    /// Build a path; fragments are sorted by level
    pub fn new(mut fragments: Vec<SelectorFragment>) -> Self {
        fragments.sort_by_key(|f| f.level);
        Self { fragments }
    }

    pub fn fragments(&self) -> &[SelectorFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Levels present in the path, ascending
    pub fn levels(&self) -> Vec<usize> {
        self.fragments.iter().map(|f| f.level).collect()
    }

    /// Number of child (`>`) and descendant (` `) combinators
    pub fn combinator_counts(&self) -> (usize, usize) {
        self.fragments
            .windows(2)
            .fold((0, 0), |(child, desc), pair| {
                if pair[1].level == pair[0].level + 1 {
                    (child + 1, desc)
                } else {
                    (child, desc + 1)
                }
            })
    }

    /// Copy of the path without the fragment at `index`
    pub fn without(&self, index: usize) -> Self {
        let mut fragments = self.fragments.clone();
        fragments.remove(index);
        Self { fragments }
    }

    /// Serialize to a selector string, outermost level first
    pub fn compile(&self) -> String {
        let mut out = String::new();
        let mut above: Option<usize> = None;
        for fragment in self.fragments.iter().rev() {
            if let Some(level) = above {
                out.push_str(if level == fragment.level + 1 { " > " } else { " " });
            }
            out.push_str(&fragment.text);
            above = Some(fragment.level);
        }
        out
    }
}
