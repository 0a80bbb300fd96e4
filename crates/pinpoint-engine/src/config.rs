//! Search Configuration

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pinpoint_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::provider::{CssEscaper, Escaper};
use crate::validator::{DefaultPolicy, FragmentPolicy};

/// Tunable search knobs, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Total wall-clock budget per call (milliseconds)
    pub time_budget_ms: u64,
    /// Share of the budget kept back for the optimizer and fallback ladder
    pub reserve_ratio: f64,
    /// Path depth explored before the first uniqueness check
    pub seed_length: usize,
    /// Minimum path length the optimizer will touch
    pub optimize_min_length: usize,
    /// Candidates pulled and scored together
    pub window_size: usize,
    /// Candidates a single depth may contribute before climbing
    pub max_candidates_per_depth: usize,
    /// Total candidate paths inspected per call
    pub max_path_checks: usize,
    /// Maximum number of ancestor levels climbed
    pub max_depth: usize,
    /// Run the path optimizer on found paths
    pub optimize: bool,
    /// Selector length beyond which a length penalty applies
    pub length_threshold: usize,
    /// Domain vocabulary that earns fragments a small bonus
    pub relevant_terms: Vec<String>,
    /// Extra attribute names the default policy accepts
    pub extra_attributes: Vec<String>,
    /// Reject ids containing digits
    pub reject_numeric_ids: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            time_budget_ms: 1000,
            reserve_ratio: 0.2,
            seed_length: 1,
            optimize_min_length: 2,
            window_size: 16,
            max_candidates_per_depth: 1000,
            max_path_checks: 10_000,
            max_depth: 32,
            optimize: true,
            length_threshold: 80,
            relevant_terms: Vec::new(),
            extra_attributes: Vec::new(),
            reject_numeric_ids: false,
        }
    }
}

impl SearchSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the search cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed_length == 0 {
            return Err(ConfigError::SeedLength);
        }
        if !(0.0..1.0).contains(&self.reserve_ratio) {
            return Err(ConfigError::ReserveRatio(self.reserve_ratio));
        }
        if self.window_size == 0 {
            return Err(ConfigError::WindowSize);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::MaxDepth);
        }
        Ok(())
    }

    fn hash_into(&self, hasher: &mut impl Hasher) {
        self.time_budget_ms.hash(hasher);
        self.reserve_ratio.to_bits().hash(hasher);
        self.seed_length.hash(hasher);
        self.optimize_min_length.hash(hasher);
        self.window_size.hash(hasher);
        self.max_candidates_per_depth.hash(hasher);
        self.max_path_checks.hash(hasher);
        self.max_depth.hash(hasher);
        self.optimize.hash(hasher);
        self.length_threshold.hash(hasher);
        self.relevant_terms.hash(hasher);
        self.extra_attributes.hash(hasher);
        self.reject_numeric_ids.hash(hasher);
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("seed length must be at least 1")]
    SeedLength,

    #[error("reserve ratio {0} outside [0, 1)")]
    ReserveRatio(f64),

    #[error("window size must be at least 1")]
    WindowSize,

    #[error("max depth must be at least 1")]
    MaxDepth,

    #[error("root {root} does not contain target {target}")]
    RootNotAncestor { root: NodeId, target: NodeId },

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Cooperative cancellation flag shared with the caller
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every search holding this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runtime configuration for one or more synthesis calls
#[derive(Clone)]
pub struct SearchConfig {
    pub settings: SearchSettings,
    /// Scope within which uniqueness is evaluated
    pub root: NodeId,
    pub policy: Arc<dyn FragmentPolicy>,
    pub escaper: Arc<dyn Escaper>,
    pub cancel: Option<CancelToken>,
}

impl SearchConfig {
    /// Default settings scoped to `root`
    pub fn new(root: NodeId) -> Self {
        Self::from_settings(root, SearchSettings::default())
    }

    /// Build a config from settings, deriving the default policy from them
    pub fn from_settings(root: NodeId, settings: SearchSettings) -> Self {
        let policy = settings
            .extra_attributes
            .iter()
            .fold(DefaultPolicy::new(), |policy, attr| policy.with_attribute(attr.as_str()))
            .reject_numeric_ids(settings.reject_numeric_ids);

        Self {
            settings,
            root,
            policy: Arc::new(policy),
            escaper: Arc::new(CssEscaper),
            cancel: None,
        }
    }

    /// Replace the acceptability policy
    pub fn with_policy(mut self, policy: impl FragmentPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Replace the identifier escaper
    pub fn with_escaper(mut self, escaper: impl Escaper + 'static) -> Self {
        self.escaper = Arc::new(escaper);
        self
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Change the time budget
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.settings.time_budget_ms = budget.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Full wall-clock budget (the hard deadline)
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.settings.time_budget_ms)
    }

    /// Budget available to the path search before the reserve
    pub fn search_budget(&self) -> Duration {
        self.time_budget().mul_f64(1.0 - self.settings.reserve_ratio)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()
    }

    /// Stable hash of everything that influences synthesis results
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.settings.hash_into(&mut hasher);
        self.root.hash(&mut hasher);
        self.policy.fingerprint().hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("settings", &self.settings)
            .field("root", &self.root)
            .field("policy", &self.policy.fingerprint())
            .field("cancel", &self.cancel)
            .finish()
    }
}
