//! Result cache
//!
//! Memoizes synthesized selectors by a structural signature of the target.
//! The signature carries no position, so two elements may share an entry;
//! every hit is verified against the live document before it is returned.

use std::collections::{HashMap, VecDeque};

use pinpoint_dom::NodeId;
use serde::Serialize;

use crate::provider::DocumentProvider;
use crate::synthesizer::Outcome;

/// Cache key: tag, id, sorted class set and the config fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeSignature {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    fingerprint: u64,
}

impl NodeSignature {
    /// Signature of `node`; `None` for non-elements
    pub fn compute<D: DocumentProvider + ?Sized>(
        doc: &D,
        node: NodeId,
        fingerprint: u64,
    ) -> Option<Self> {
        let tag = doc.tag_name(node)?.to_string();
        let mut classes: Vec<String> = doc.classes(node).into_iter().map(str::to_string).collect();
        classes.sort_unstable();
        classes.dedup();

        Some(Self {
            tag,
            id: doc.id(node).map(str::to_string),
            classes,
            fingerprint,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Stored synthesis result
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub selector: String,
    pub outcome: Outcome,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Hits that failed verification against the document
    pub rejected: u64,
    pub size: usize,
}

/// Selector cache owned by the caller
#[derive(Debug, Clone, Default)]
pub struct SelectorCache {
    entries: HashMap<NodeSignature, CacheEntry>,
    order: VecDeque<NodeSignature>,
    max_entries: Option<usize>,
    stats: CacheStats,
}

impl SelectorCache {
    /// Unbounded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `max` entries, evicting the oldest first
    pub fn with_max_entries(max: usize) -> Self {
        Self {
            max_entries: Some(max),
            ..Self::default()
        }
    }

    /// Verified lookup.
    ///
    /// Unique entries must still resolve to exactly `target` within `scope`;
    /// other entries must at least match it. A failed check counts as a
    /// rejected hit and a miss, and the entry stays in place.
    pub fn lookup<D: DocumentProvider + ?Sized>(
        &mut self,
        signature: &NodeSignature,
        doc: &D,
        target: NodeId,
        scope: NodeId,
    ) -> Option<CacheEntry> {
        let Some(entry) = self.entries.get(signature) else {
            self.stats.misses += 1;
            return None;
        };

        let verified = match entry.outcome {
            Outcome::Unique => doc
                .resolve(&entry.selector, scope, 2)
                .is_ok_and(|matches| matches == [target]),
            Outcome::BestEffort | Outcome::Degraded => doc
                .is_match(&entry.selector, scope, target)
                .unwrap_or(false),
        };

        if verified {
            self.stats.hits += 1;
            Some(entry.clone())
        } else {
            tracing::trace!(selector = %entry.selector, "cached selector no longer fits");
            self.stats.rejected += 1;
            self.stats.misses += 1;
            None
        }
    }

    /// Store `entry` unless the signature already has one.
    /// Returns whether the entry was stored.
    pub fn insert(&mut self, signature: NodeSignature, entry: CacheEntry) -> bool {
        if self.max_entries == Some(0) || self.entries.contains_key(&signature) {
            return false;
        }
        if let Some(max) = self.max_entries {
            while self.entries.len() >= max {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(signature.clone());
        self.entries.insert(signature, entry);
        true
    }

    /// Peek at an entry without verification or bookkeeping
    pub fn get(&self, signature: &NodeSignature) -> Option<&CacheEntry> {
        self.entries.get(signature)
    }

    /// Remove one entry
    pub fn evict(&mut self, signature: &NodeSignature) -> Option<CacheEntry> {
        let entry = self.entries.remove(signature)?;
        self.order.retain(|s| s != signature);
        Some(entry)
    }

    /// Drop every entry; counters are kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            ..self.stats
        }
    }
}
