// Breadth-first frontier expansion over discovered names and addresses

use crate::bundle::{Edge, Relation, ResultBundle, resolved_addresses};
use crate::strategy::{Strategy, StrategySet};
use dnsmap_scanner::{DnsLookup, LookupError, RecordMap, empty_records};
use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Called with `(value, depth)` when an item starts processing.
pub type ProgressCallback = Arc<dyn Fn(String, usize) + Send + Sync>;

/// Options for configuring an expansion run
#[derive(Debug, Clone)]
pub struct OrchestrateOptions {
    pub max_depth: usize,
    pub strategies: StrategySet,
    /// Subdomain wordlist; `None` lets the lookup use its default list.
    pub wordlist: Option<Vec<String>>,
    pub neighbor_radius: u32,
}

impl Default for OrchestrateOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            strategies: StrategySet::all(),
            wordlist: None,
            neighbor_radius: 2,
        }
    }
}

/// Expand from `root` with the given options.
pub async fn orchestrate<L>(lookup: &L, root: &str, options: &OrchestrateOptions) -> ResultBundle
where
    L: DnsLookup + ?Sized,
{
    Orchestrator::new(lookup)
        .with_max_depth(options.max_depth)
        .with_strategies(options.strategies.clone())
        .with_wordlist(options.wordlist.clone())
        .with_neighbor_radius(options.neighbor_radius)
        .run(root)
        .await
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierItem {
    value: String,
    depth: usize,
}

/// Queue, visited set and bundle for one run.
struct Traversal {
    queue: VecDeque<FrontierItem>,
    visited: HashSet<String>,
    bundle: ResultBundle,
    max_depth: usize,
}

impl Traversal {
    fn new(root: String, max_depth: usize) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(FrontierItem {
            value: root.clone(),
            depth: 0,
        });

        Self {
            queue,
            visited: HashSet::new(),
            bundle: ResultBundle::new(root, max_depth),
            max_depth,
        }
    }

    /// Record that `source` (processed at `depth`) led to `target`.
    ///
    /// Nothing is recorded at the depth limit. The edge is kept even when the
    /// target was already processed; only the enqueue is skipped.
    fn discover(&mut self, source: &str, target: &str, relation: Relation, depth: usize) {
        if depth >= self.max_depth {
            return;
        }
        let target = normalize(target);
        if target.is_empty() {
            return;
        }

        self.bundle.edges.push(Edge::new(source, target.as_str(), relation));
        if !self.visited.contains(&target) {
            debug!("Queuing {} at depth {} ({} from {})", target, depth + 1, relation, source);
            self.queue.push_back(FrontierItem {
                value: target,
                depth: depth + 1,
            });
        }
    }
}

/// The multi-strategy expansion engine.
pub struct Orchestrator<'a, L: DnsLookup + ?Sized> {
    lookup: &'a L,
    max_depth: usize,
    strategies: StrategySet,
    wordlist: Option<Vec<String>>,
    neighbor_radius: u32,
    progress_callback: Option<ProgressCallback>,
    cancellation: CancellationToken,
}

impl<'a, L: DnsLookup + ?Sized> Orchestrator<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            max_depth: 1,
            strategies: StrategySet::all(),
            wordlist: None,
            neighbor_radius: 2,
            progress_callback: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_strategies(mut self, strategies: StrategySet) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_wordlist(mut self, wordlist: Option<Vec<String>>) -> Self {
        self.wordlist = wordlist;
        self
    }

    pub fn with_neighbor_radius(mut self, radius: u32) -> Self {
        self.neighbor_radius = radius;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Stop the run when `token` is cancelled; the partial bundle is returned.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub async fn run(&self, root: &str) -> ResultBundle {
        let root = normalize(root);
        info!(
            "Expanding {} (max depth {}, strategies: {})",
            root, self.max_depth, self.strategies
        );

        let mut state = Traversal::new(root, self.max_depth);

        while let Some(item) = state.queue.pop_front() {
            if self.cancellation.is_cancelled() {
                state.bundle.cancelled = true;
                break;
            }
            if !state.visited.insert(item.value.clone()) {
                debug!("Already processed {}, skipping", item.value);
                continue;
            }
            state.bundle.domains.push(item.value.clone());

            if let Some(ref callback) = self.progress_callback {
                callback(item.value.clone(), item.depth);
            }

            let finished = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => false,
                _ = self.expand(&item, &mut state) => true,
            };
            if !finished {
                warn!("Expansion cancelled while processing {}", item.value);
                state.bundle.cancelled = true;
                break;
            }
        }

        info!(
            "Expansion complete. Processed {} values, {} edges",
            state.bundle.domains.len(),
            state.bundle.edges.len()
        );
        state.bundle
    }

    /// Run forward resolution and every enabled strategy for one item.
    async fn expand(&self, item: &FrontierItem, state: &mut Traversal) {
        let FrontierItem { value, depth } = item;
        let depth = *depth;
        let address = value.parse::<IpAddr>().ok();
        debug!("Processing {} at depth {}", value, depth);

        let records = match address {
            Some(_) => RecordMap::new(),
            None => {
                let records = settle_with(
                    self.lookup.resolve_records(value).await,
                    empty_records,
                    "records",
                    value,
                );
                state.bundle.records.insert(value.clone(), records.clone());
                records
            }
        };

        // An address item stands for itself; a name for what it resolved to.
        let addresses = match address {
            Some(ip) => vec![ip],
            None => resolved_addresses(&records),
        };

        for strategy in self.strategies.iter() {
            match (strategy, address) {
                (Strategy::Txt, None) => self.run_txt(value, depth, state).await,
                (Strategy::Sub, None) => self.run_sub(value, depth, state).await,
                (Strategy::Crawl, None) => self.run_crawl(value, depth, state).await,
                (Strategy::Srv, None) => self.run_srv(value, state).await,
                (Strategy::Neighbors, _) => self.run_neighbors(&addresses, depth, state).await,
                (Strategy::Rev, _) => self.run_rev(&addresses, depth, state).await,
                _ => {}
            }
        }
    }

    async fn run_txt(&self, name: &str, depth: usize, state: &mut Traversal) {
        let txt = settle(self.lookup.parse_txt(name).await, "txt", name);
        // embedded IPv4s stay leaf information
        for domain in &txt.domains {
            state.discover(name, domain, Relation::Txt, depth);
        }
        state.bundle.txts.insert(name.to_string(), txt);
    }

    async fn run_sub(&self, name: &str, depth: usize, state: &mut Traversal) {
        let subs = settle(
            self.lookup
                .enumerate_subdomains(name, self.wordlist.as_deref())
                .await,
            "sub",
            name,
        );
        for hit in &subs {
            state.discover(name, &hit.sub, Relation::Sub, depth);
        }
        state.bundle.subs.insert(name.to_string(), subs);
    }

    async fn run_crawl(&self, name: &str, depth: usize, state: &mut Traversal) {
        let parents = settle(self.lookup.crawl_to_tld(name).await, "crawl", name);
        for parent in &parents {
            state.discover(name, parent, Relation::Parent, depth);
        }
    }

    async fn run_srv(&self, name: &str, state: &mut Traversal) {
        // SRV targets are never expanded
        let srv = settle(self.lookup.scan_srv(name).await, "srv", name);
        state.bundle.srvs.insert(name.to_string(), srv);
    }

    async fn run_neighbors(&self, addresses: &[IpAddr], depth: usize, state: &mut Traversal) {
        for ip in addresses.iter().filter(|ip| ip.is_ipv4()) {
            let key = ip.to_string();
            let neighbors = settle(
                self.lookup.ip_neighbors(&key, self.neighbor_radius).await,
                "neighbors",
                &key,
            );
            for neighbor in &neighbors {
                for ptr in &neighbor.ptrs {
                    state.discover(&key, ptr, Relation::Ptr, depth);
                }
            }
            state.bundle.neighbors.insert(key, neighbors);
        }
    }

    async fn run_rev(&self, addresses: &[IpAddr], depth: usize, state: &mut Traversal) {
        for ip in addresses {
            let key = ip.to_string();
            let ptrs = settle(self.lookup.reverse_lookup(&key).await, "rev", &key);
            for ptr in &ptrs {
                state.discover(&key, ptr, Relation::Ptr, depth);
            }
            state.bundle.reverse.insert(key, ptrs);
        }
    }
}

/// A failed strategy counts as an empty result for that item.
fn settle<T: Default>(result: Result<T, LookupError>, strategy: &str, subject: &str) -> T {
    settle_with(result, T::default, strategy, subject)
}

fn settle_with<T>(
    result: Result<T, LookupError>,
    empty: impl FnOnce() -> T,
    strategy: &str,
    subject: &str,
) -> T {
    result.unwrap_or_else(|e| {
        warn!("{} lookup for {} failed: {}", strategy, subject, e);
        empty()
    })
}

/// Lowercase, trimmed, without the trailing root dot. Addresses are put in
/// canonical form.
pub fn normalize(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('.');
    match trimmed.parse::<IpAddr>() {
        Ok(ip) => ip.to_string(),
        Err(_) => trimmed.to_lowercase(),
    }
}
