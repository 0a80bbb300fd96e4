//! Edge case and stress tests for pinpoint-engine

use std::time::{Duration, Instant};

use pinpoint_css::query_selector_all;
use pinpoint_dom::{DomTree, NodeId};
use pinpoint_engine::{
    ConfigError, DocumentProvider, FragmentPolicy, Outcome, SearchConfig, SelectorCache,
    Strategy, SynthesisError, synthesize,
};

fn run(tree: &DomTree, target: NodeId, config: &SearchConfig) -> pinpoint_engine::Synthesis {
    synthesize(tree, target, config, &mut SelectorCache::new()).unwrap()
}

/// Rejects every token and tag, leaving only `*` and `*:nth-child(k)`
struct Adversarial;

impl FragmentPolicy for Adversarial {
    fn is_acceptable_identifier(&self, _: &str) -> bool {
        false
    }

    fn is_acceptable_class(&self, _: &str) -> bool {
        false
    }

    fn is_acceptable_attribute(&self, _: &str, _: &str) -> bool {
        false
    }

    fn is_acceptable_tag(&self, _: &str) -> bool {
        false
    }

    fn fingerprint(&self) -> String {
        "adversarial".into()
    }
}

// ============================================================================
// INVALID INPUT
// ============================================================================

#[test]
fn test_document_node_is_not_a_target() {
    let mut tree = DomTree::new();
    tree.append_element(NodeId::ROOT, "html", &[]).unwrap();
    let result = synthesize(&tree, NodeId::ROOT, &SearchConfig::new(NodeId::ROOT), &mut SelectorCache::new());
    assert!(matches!(result, Err(SynthesisError::InvalidTarget(_))));
}

#[test]
fn test_detached_target_is_outside_root() {
    let mut tree = DomTree::new();
    tree.append_element(NodeId::ROOT, "html", &[]).unwrap();
    let detached = tree.create_element("div");
    let result = synthesize(&tree, detached, &SearchConfig::new(NodeId::ROOT), &mut SelectorCache::new());
    assert!(matches!(
        result,
        Err(SynthesisError::InvalidConfig(ConfigError::RootNotAncestor { .. }))
    ));
}

#[test]
fn test_unknown_target_id() {
    let tree = DomTree::new();
    let result = synthesize(&tree, NodeId::NONE, &SearchConfig::new(NodeId::ROOT), &mut SelectorCache::new());
    assert!(matches!(result, Err(SynthesisError::InvalidTarget(_))));
}

#[test]
fn test_invalid_reserve_ratio() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[]).unwrap();
    let mut config = SearchConfig::new(NodeId::ROOT);
    config.settings.reserve_ratio = -0.5;
    let result = synthesize(&tree, div, &config, &mut SelectorCache::new());
    assert!(matches!(
        result,
        Err(SynthesisError::InvalidConfig(ConfigError::ReserveRatio(_)))
    ));
}

// ============================================================================
// DEGENERATE DOCUMENTS
// ============================================================================

#[test]
fn test_lone_document_element() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]).unwrap();
    let result = run(&tree, html, &SearchConfig::new(NodeId::ROOT));
    assert_eq!(result.selector, "html");
    assert_eq!(result.strategy, Strategy::Trivial);
}

#[test]
fn test_root_element_as_scope_and_target() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]).unwrap();
    // nothing strictly inside `html` can be `html` itself
    let result = run(&tree, html, &SearchConfig::new(html));
    assert_eq!(result.selector, "html");
    assert_eq!(result.outcome, Outcome::Degraded);
}

#[test]
fn test_identical_siblings_use_ordinals() {
    let mut tree = DomTree::new();
    let ul = tree.append_element(NodeId::ROOT, "ul", &[]).unwrap();
    let items: Vec<_> = (0..5)
        .map(|_| tree.append_element(ul, "li", &[]).unwrap())
        .collect();

    let result = run(&tree, items[3], &SearchConfig::new(NodeId::ROOT));
    assert_eq!(result.selector, "li:nth-of-type(4)");
    assert_eq!(result.outcome, Outcome::Unique);
}

#[test]
fn test_awkward_identifiers_are_escaped() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    let odd = tree
        .append_element(body, "div", &[("id", "a:b.c")])
        .unwrap();
    let numeric = tree.append_element(body, "div", &[("id", "2col")]).unwrap();
    let unicode = tree
        .append_element(body, "span", &[("class", "résumé")])
        .unwrap();
    tree.append_element(body, "span", &[]).unwrap();

    let config = SearchConfig::new(NodeId::ROOT);
    for (node, expected) in [
        (odd, "#a\\:b\\.c"),
        (numeric, "#\\32 col"),
        (unicode, ".résumé"),
    ] {
        let result = run(&tree, node, &config);
        assert_eq!(result.selector, expected);
        assert_eq!(query_selector_all(&tree, NodeId::ROOT, expected).unwrap(), vec![node]);
    }
}

#[test]
fn test_deep_uniform_nesting_stays_best_effort() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    let mut target = body;
    for _ in 0..300 {
        target = tree.append_element(target, "div", &[]).unwrap();
    }

    let result = run(&tree, target, &SearchConfig::new(NodeId::ROOT));
    assert_ne!(result.outcome, Outcome::Degraded);
    assert!(tree.is_match(&result.selector, NodeId::ROOT, target).unwrap());
    assert!(result.stats.depth <= 32);
}

// ============================================================================
// BUDGET
// ============================================================================

#[test]
fn test_budget_respected_on_wide_tree() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    let mut spans = Vec::new();
    for _ in 0..5000 {
        let div = tree.append_element(body, "div", &[("class", "row")]).unwrap();
        spans.push(tree.append_element(div, "span", &[("class", "cell")]).unwrap());
    }

    let budget = Duration::from_millis(50);
    let config = SearchConfig::new(NodeId::ROOT)
        .with_time_budget(budget)
        .with_policy(Adversarial);

    let started = Instant::now();
    let result = run(&tree, spans[2500], &config);
    let elapsed = started.elapsed();

    assert!(!result.selector.is_empty());
    assert!(elapsed < budget + Duration::from_millis(500), "took {elapsed:?}");
    assert!(tree.is_match(&result.selector, NodeId::ROOT, spans[2500]).unwrap());
}

#[test]
fn test_tiny_budget_on_wide_tree() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    let items: Vec<_> = (0..5000)
        .map(|_| tree.append_element(body, "p", &[("class", "para")]).unwrap())
        .collect();

    let config = SearchConfig::new(NodeId::ROOT).with_time_budget(Duration::from_millis(1));
    let started = Instant::now();
    let result = run(&tree, items[4321], &config);

    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!result.selector.is_empty());
}

#[test]
fn test_adversarial_policy_falls_back_to_universal() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    tree.append_element(body, "p", &[]).unwrap();
    let target = tree.append_element(body, "p", &[]).unwrap();

    let config = SearchConfig::new(NodeId::ROOT).with_policy(Adversarial);
    let result = run(&tree, target, &config);
    assert_eq!(result.selector, "*:nth-child(2)");
    assert_eq!(result.outcome, Outcome::Unique);
}

// ============================================================================
// CACHE LIMITS
// ============================================================================

#[test]
fn test_bounded_cache_keeps_working() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    let nodes: Vec<_> = ["h1", "h2", "h3", "h4"]
        .iter()
        .map(|tag| tree.append_element(body, tag, &[]).unwrap())
        .collect();

    let config = SearchConfig::new(NodeId::ROOT);
    let mut cache = SelectorCache::with_max_entries(2);
    for &node in &nodes {
        synthesize(&tree, node, &config, &mut cache).unwrap();
    }
    assert_eq!(cache.len(), 2);

    let result = synthesize(&tree, nodes[0], &config, &mut cache).unwrap();
    assert_eq!(result.selector, "h1");
    assert_ne!(result.strategy, Strategy::Cached);
}
