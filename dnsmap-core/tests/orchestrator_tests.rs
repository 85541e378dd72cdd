// Tests for frontier expansion

mod common;

use common::{FakeLookup, root_test_lookup};
use dnsmap_core::{
    Edge, OrchestrateOptions, Orchestrator, Relation, Strategy, StrategySet, orchestrate,
};
use dnsmap_scanner::RecordKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn options(max_depth: usize, strategies: StrategySet) -> OrchestrateOptions {
    OrchestrateOptions {
        max_depth,
        strategies,
        ..Default::default()
    }
}

fn only(strategies: &[Strategy]) -> StrategySet {
    strategies.iter().copied().collect()
}

// ============================================================================
// Depth Tests
// ============================================================================

#[tokio::test]
async fn test_depth_zero_processes_only_root() {
    let lookup = root_test_lookup();
    let bundle = orchestrate(&lookup, "root.test", &options(0, StrategySet::all())).await;

    assert_eq!(bundle.domains, vec!["root.test"]);
    assert!(bundle.edges.is_empty());
    // the root's own lookups still ran
    assert_eq!(bundle.txts["root.test"].domains, vec!["txt1.root.test"]);
    assert_eq!(bundle.subs["root.test"][0].sub, "sub1.root.test");
    assert!(!bundle.cancelled);
}

#[tokio::test]
async fn test_scenario_depth_one() {
    let lookup = root_test_lookup();
    let bundle = orchestrate(&lookup, "root.test", &options(1, StrategySet::all())).await;

    assert_eq!(
        bundle.domains,
        vec!["root.test", "txt1.root.test", "sub1.root.test"]
    );
    assert_eq!(
        bundle.edges,
        vec![
            Edge::new("root.test", "txt1.root.test", Relation::Txt),
            Edge::new("root.test", "sub1.root.test", Relation::Sub),
        ]
    );
}

#[tokio::test]
async fn test_scenario_depth_two() {
    let lookup = root_test_lookup();
    let bundle = orchestrate(&lookup, "root.test", &options(2, StrategySet::all())).await;

    assert_eq!(
        bundle.domains,
        vec![
            "root.test",
            "txt1.root.test",
            "sub1.root.test",
            "txt2.root.test"
        ]
    );
    assert!(bundle.txts.contains_key("txt2.root.test"));
}

#[tokio::test]
async fn test_nothing_is_recorded_from_items_at_max_depth() {
    let lookup = root_test_lookup();
    let bundle = orchestrate(&lookup, "root.test", &options(1, StrategySet::all())).await;

    // txt1 was processed at depth 1 and still parsed its TXT...
    assert_eq!(bundle.txts["txt1.root.test"].domains, vec!["txt2.root.test"]);
    // ...but discovered nothing
    assert_eq!(bundle.edges_from("txt1.root.test").count(), 0);
    assert!(!bundle.contains_domain("txt2.root.test"));
}

// ============================================================================
// Dedup and Cycle Tests
// ============================================================================

#[tokio::test]
async fn test_txt_cycle_terminates() {
    let lookup = FakeLookup::new()
        .with_txt_domains("a.test", &["b.test"])
        .with_txt_domains("b.test", &["a.test"]);
    let bundle = orchestrate(&lookup, "a.test", &options(5, only(&[Strategy::Txt]))).await;

    assert_eq!(bundle.domains, vec!["a.test", "b.test"]);
    // the edge back to an already processed name is still recorded
    assert_eq!(
        bundle.edges,
        vec![
            Edge::new("a.test", "b.test", Relation::Txt),
            Edge::new("b.test", "a.test", Relation::Txt),
        ]
    );
    assert_eq!(lookup.call_count("txt", "a.test"), 1);
    assert_eq!(lookup.call_count("txt", "b.test"), 1);
}

#[tokio::test]
async fn test_duplicate_discovery_keeps_both_edges() {
    let lookup = FakeLookup::new()
        .with_txt_domains("root.test", &["x.root.test"])
        .with_sub("root.test", "x.root.test", &["192.0.2.1"]);
    let bundle = orchestrate(&lookup, "root.test", &options(2, StrategySet::all())).await;

    assert_eq!(bundle.domains, vec!["root.test", "x.root.test"]);
    // txt runs before sub, so its edge comes first
    assert_eq!(
        bundle.edges_from("root.test").cloned().collect::<Vec<_>>(),
        vec![
            Edge::new("root.test", "x.root.test", Relation::Txt),
            Edge::new("root.test", "x.root.test", Relation::Sub),
        ]
    );
}

#[tokio::test]
async fn test_each_name_resolved_at_most_once() {
    let lookup = FakeLookup::new()
        .with_txt_domains("root.test", &["x.root.test", "y.root.test"])
        .with_sub("root.test", "x.root.test", &[])
        .with_parents("x.root.test", &["root.test", "test"])
        .with_txt_domains("y.root.test", &["x.root.test", "root.test"]);
    let bundle = orchestrate(&lookup, "root.test", &options(3, StrategySet::all())).await;

    for name in &bundle.domains {
        let expected = usize::from(name.parse::<std::net::IpAddr>().is_err());
        assert_eq!(lookup.call_count("records", name), expected, "{}", name);
    }
    assert!(bundle.contains_domain("test"));
}

#[tokio::test]
async fn test_discovered_names_are_normalized() {
    let lookup = FakeLookup::new().with_txt_domains("root.test", &["Mixed.Root.TEST."]);
    let bundle = orchestrate(&lookup, "ROOT.test.", &options(1, only(&[Strategy::Txt]))).await;

    assert_eq!(bundle.root, "root.test");
    assert_eq!(bundle.domains, vec!["root.test", "mixed.root.test"]);
}

// ============================================================================
// Strategy Tests
// ============================================================================

#[tokio::test]
async fn test_strategies_run_in_fixed_order() {
    let lookup = FakeLookup::new().with_records("root.test", RecordKind::A, &["192.0.2.10"]);
    orchestrate(&lookup, "root.test", &options(0, StrategySet::all())).await;

    let ops: Vec<String> = lookup.calls().into_iter().map(|(op, _)| op).collect();
    assert_eq!(
        ops,
        vec!["records", "txt", "sub", "crawl", "srv", "neighbors", "rev"]
    );
}

#[tokio::test]
async fn test_disabled_strategies_are_not_called() {
    let lookup = root_test_lookup();
    let bundle = orchestrate(&lookup, "root.test", &options(2, only(&[Strategy::Sub]))).await;

    assert_eq!(bundle.domains, vec!["root.test", "sub1.root.test"]);
    assert!(lookup.subjects_of("txt").is_empty());
    assert!(bundle.txts.is_empty());
}

#[tokio::test]
async fn test_rev_without_neighbors() {
    let lookup = FakeLookup::new()
        .with_records("root.test", RecordKind::A, &["192.0.2.10"])
        .with_ptr("192.0.2.10", &["host.root.test"])
        .with_neighbor("192.0.2.10", "192.0.2.11", &["n1.root.test"]);
    let bundle = orchestrate(&lookup, "root.test", &options(0, only(&[Strategy::Rev]))).await;

    assert_eq!(bundle.reverse["192.0.2.10"], vec!["host.root.test"]);
    assert!(bundle.neighbors.is_empty());
}

#[tokio::test]
async fn test_neighbors_without_rev() {
    let lookup = FakeLookup::new()
        .with_records("root.test", RecordKind::A, &["192.0.2.10"])
        .with_ptr("192.0.2.10", &["host.root.test"])
        .with_neighbor("192.0.2.10", "192.0.2.11", &["n1.root.test"]);
    let bundle =
        orchestrate(&lookup, "root.test", &options(0, only(&[Strategy::Neighbors]))).await;

    assert_eq!(bundle.neighbors["192.0.2.10"][0].ip, "192.0.2.11");
    assert!(bundle.reverse.is_empty());
}

#[tokio::test]
async fn test_ptr_names_are_expanded() {
    let lookup = FakeLookup::new()
        .with_records("root.test", RecordKind::A, &["192.0.2.10"])
        .with_records("root.test", RecordKind::Aaaa, &["2001:db8::10"])
        .with_ptr("192.0.2.10", &["host.root.test."])
        .with_ptr("2001:db8::10", &["v6.root.test"])
        .with_neighbor("192.0.2.10", "192.0.2.11", &["n1.root.test"]);
    let strategies = only(&[Strategy::Neighbors, Strategy::Rev]);
    let bundle = orchestrate(&lookup, "root.test", &options(1, strategies)).await;

    assert_eq!(
        bundle.domains,
        vec!["root.test", "n1.root.test", "host.root.test", "v6.root.test"]
    );
    assert_eq!(
        bundle.edges,
        vec![
            Edge::new("192.0.2.10", "n1.root.test", Relation::Ptr),
            Edge::new("192.0.2.10", "host.root.test", Relation::Ptr),
            Edge::new("2001:db8::10", "v6.root.test", Relation::Ptr),
        ]
    );
    // neighbor probing is IPv4-only
    assert_eq!(lookup.subjects_of("neighbors"), vec!["192.0.2.10"]);
}

#[tokio::test]
async fn test_leaf_results_are_not_expanded() {
    let lookup = FakeLookup::new()
        .with_records("root.test", RecordKind::Mx, &["10 mail.root.test."])
        .with_txt_ips("root.test", &["198.51.100.7"])
        .with_srv("root.test", "_sip._tcp", "sip.root.test", 5060);
    let bundle = orchestrate(&lookup, "root.test", &options(3, StrategySet::all())).await;

    assert_eq!(bundle.domains, vec!["root.test"]);
    assert!(bundle.edges.is_empty());
    assert_eq!(bundle.srvs["root.test"]["_sip._tcp"][0].port, 5060);
    assert_eq!(bundle.txts["root.test"].ips, vec!["198.51.100.7"]);
}

#[tokio::test]
async fn test_crawl_parents_become_items() {
    let lookup = FakeLookup::new().with_parents("a.b.example.com", &["b.example.com", "example.com", "com"]);
    let bundle =
        orchestrate(&lookup, "a.b.example.com", &options(1, only(&[Strategy::Crawl]))).await;

    assert_eq!(
        bundle.domains,
        vec!["a.b.example.com", "b.example.com", "example.com", "com"]
    );
    assert_eq!(
        bundle.parents_of("a.b.example.com"),
        vec!["b.example.com", "example.com", "com"]
    );
}

#[tokio::test]
async fn test_wordlist_is_passed_to_subdomain_enumeration() {
    let lookup = FakeLookup::new()
        .with_sub("root.test", "www.root.test", &["192.0.2.1"])
        .with_sub("root.test", "mail.root.test", &["192.0.2.2"]);
    let opts = OrchestrateOptions {
        max_depth: 0,
        strategies: only(&[Strategy::Sub]),
        wordlist: Some(vec!["www".to_string()]),
        ..Default::default()
    };
    let bundle = orchestrate(&lookup, "root.test", &opts).await;

    let subs: Vec<&str> = bundle.subs["root.test"].iter().map(|h| h.sub.as_str()).collect();
    assert_eq!(subs, vec!["www.root.test"]);
}

#[tokio::test]
async fn test_address_root_skips_name_strategies() {
    let lookup = FakeLookup::new().with_ptr("192.0.2.10", &["host.example"]);
    let bundle = orchestrate(&lookup, "192.0.2.10", &options(1, StrategySet::all())).await;

    assert_eq!(bundle.domains[0], "192.0.2.10");
    assert!(!bundle.records.contains_key("192.0.2.10"));
    assert_eq!(bundle.reverse["192.0.2.10"], vec!["host.example"]);
    assert!(bundle.contains_domain("host.example"));
    assert!(lookup.subjects_of("txt").iter().all(|s| s != "192.0.2.10"));
    assert!(lookup.subjects_of("records").iter().all(|s| s != "192.0.2.10"));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_failing_strategy_does_not_stop_the_run() {
    let lookup = root_test_lookup().failing("txt", "root.test");
    let bundle = orchestrate(&lookup, "root.test", &options(1, StrategySet::all())).await;

    assert_eq!(bundle.domains, vec!["root.test", "sub1.root.test"]);
    assert!(bundle.txts["root.test"].is_empty());
    // later strategies for the same item still ran
    assert_eq!(lookup.call_count("srv", "root.test"), 1);
}

#[tokio::test]
async fn test_failing_forward_resolution_yields_empty_records() {
    let lookup = root_test_lookup().failing("records", "root.test");
    let bundle = orchestrate(&lookup, "root.test", &options(1, StrategySet::all())).await;

    let records = &bundle.records["root.test"];
    assert_eq!(records.len(), RecordKind::ALL.len());
    assert!(records.values().all(Vec::is_empty));
    assert!(bundle.contains_domain("txt1.root.test"));
}

// ============================================================================
// Output Contract Tests
// ============================================================================

#[tokio::test]
async fn test_result_keys_belong_to_the_run() {
    let lookup = root_test_lookup()
        .with_records("sub1.root.test", RecordKind::A, &["192.0.2.20"])
        .with_ptr("192.0.2.20", &["web.root.test"])
        .with_neighbor("192.0.2.20", "192.0.2.21", &[]);
    let bundle = orchestrate(&lookup, "root.test", &options(2, StrategySet::all())).await;

    let domains = bundle.domain_set();
    for key in bundle
        .records
        .keys()
        .chain(bundle.txts.keys())
        .chain(bundle.subs.keys())
        .chain(bundle.srvs.keys())
    {
        assert!(domains.contains(key.as_str()), "{}", key);
    }
    for key in bundle.reverse.keys().chain(bundle.neighbors.keys()) {
        assert!(bundle.owns_address(key), "{}", key);
    }
    for edge in &bundle.edges {
        assert!(domains.contains(edge.source.as_str()) || bundle.owns_address(&edge.source));
    }
}

#[tokio::test]
async fn test_progress_callback_sees_every_item() {
    let lookup = root_test_lookup();
    let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let bundle = Orchestrator::new(&lookup)
        .with_max_depth(2)
        .with_progress_callback(Arc::new(move |value, depth| {
            seen_clone.lock().unwrap().push((value, depth));
        }))
        .run("root.test")
        .await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), bundle.domains.len());
    assert_eq!(seen[0], ("root.test".to_string(), 0));
    assert_eq!(seen[3], ("txt2.root.test".to_string(), 2));
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let lookup = root_test_lookup();
    let token = CancellationToken::new();
    token.cancel();

    let bundle = Orchestrator::new(&lookup)
        .with_cancellation(token)
        .run("root.test")
        .await;

    assert!(bundle.cancelled);
    assert!(bundle.domains.is_empty());
    assert!(lookup.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_run_returns_partial_bundle() {
    let lookup = root_test_lookup().with_delay(Duration::from_secs(10));
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let bundle = Orchestrator::new(&lookup)
        .with_max_depth(2)
        .with_cancellation(token)
        .run("root.test")
        .await;

    assert!(bundle.cancelled);
    assert_eq!(bundle.domains, vec!["root.test"]);
    assert!(bundle.txts.is_empty());
}
