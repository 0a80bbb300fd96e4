//! Pinpoint Engine
//!
//! Synthesizes short, unique, drift-resistant CSS selectors for elements of a
//! document tree within a bounded time budget.
//!
//! # Example
//! ```rust,ignore
//! use pinpoint_engine::{synthesize, SearchConfig, SelectorCache};
//!
//! let config = SearchConfig::new(tree.root());
//! let mut cache = SelectorCache::new();
//! let result = synthesize(&tree, target, &config, &mut cache)?;
//! println!("{} ({:?})", result.selector, result.outcome);
//! ```

mod cache;
mod config;
mod fallback;
mod fragment;
mod optimizer;
mod path;
mod provider;
mod sanitize;
mod scorer;
mod search;
mod synthesizer;
mod validator;

pub use cache::{CacheEntry, CacheStats, NodeSignature, SelectorCache};
pub use config::{CancelToken, ConfigError, SearchConfig, SearchSettings};
pub use fallback::{Fallback, FallbackLadder, MAX_CHAIN_LEVELS};
pub use fragment::{FragmentGenerator, FragmentKind, SelectorFragment, TEST_ATTRIBUTES};
pub use optimizer::PathOptimizer;
pub use path::CandidatePath;
pub use provider::{CssEscaper, DocumentProvider, Escaper, QueryError};
pub use sanitize::{DEFAULT_MAX_LENGTH, SanitizeError, SelectorSanitizer};
pub use scorer::{PathScore, Scorer};
pub use search::{
    Budget, Candidate, CandidatePool, DEFAULT_POOL_CAPACITY, Exhaustion, PathProduct, PathSearch,
};
pub use synthesizer::{Outcome, SearchStats, Strategy, Synthesis, Synthesizer};
pub use validator::{DefaultPolicy, FragmentPolicy, is_vendor_scoped, looks_generated};

pub use pinpoint_dom::{NodeId, SiblingPosition};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Synthesize a selector for `target` (see [`Synthesizer::synthesize`])
pub fn synthesize<D: DocumentProvider + ?Sized>(
    doc: &D,
    target: NodeId,
    config: &SearchConfig,
    cache: &mut SelectorCache,
) -> Result<Synthesis, SynthesisError> {
    Synthesizer::new().synthesize(doc, target, config, cache)
}

/// Synthesis error
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("invalid search configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("target {0} is not an element")]
    InvalidTarget(NodeId),
}
