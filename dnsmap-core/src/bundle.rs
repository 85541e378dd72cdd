use dnsmap_scanner::{Neighbor, RecordKind, RecordMap, SrvMap, SubdomainHit, TxtRecords};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::IpAddr;

/// How a target was discovered from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Txt,
    Sub,
    Parent,
    Ptr,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Txt => "txt",
            Relation::Sub => "sub",
            Relation::Parent => "parent",
            Relation::Ptr => "ptr",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance: `target` was discovered while processing `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: Relation) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}

/// Everything one expansion run discovered.
///
/// Name-keyed maps only hold processed names. Address-keyed maps hold either
/// processed addresses or A/AAAA values of processed names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub root: String,
    pub max_depth: usize,
    /// Processed names/addresses, in processing order.
    pub domains: Vec<String>,
    pub records: BTreeMap<String, RecordMap>,
    pub txts: BTreeMap<String, TxtRecords>,
    pub subs: BTreeMap<String, Vec<SubdomainHit>>,
    pub srvs: BTreeMap<String, SrvMap>,
    pub neighbors: BTreeMap<String, Vec<Neighbor>>,
    pub reverse: BTreeMap<String, Vec<String>>,
    pub edges: Vec<Edge>,
    /// Set when the run was cancelled before the frontier drained.
    #[serde(default)]
    pub cancelled: bool,
}

impl ResultBundle {
    pub fn new(root: impl Into<String>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            max_depth,
            ..Default::default()
        }
    }

    pub fn contains_domain(&self, value: &str) -> bool {
        self.domains.iter().any(|d| d == value)
    }

    pub fn domain_set(&self) -> HashSet<&str> {
        self.domains.iter().map(String::as_str).collect()
    }

    /// A/AAAA values of `name`, parsed, in record order without duplicates.
    pub fn addresses_of(&self, name: &str) -> Vec<IpAddr> {
        self.records
            .get(name)
            .map(resolved_addresses)
            .unwrap_or_default()
    }

    /// Edges whose source is `source`, in discovery order.
    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    /// Parent domains recorded for `name` during the run.
    pub fn parents_of(&self, name: &str) -> Vec<String> {
        self.edges_from(name)
            .filter(|e| e.relation == Relation::Parent)
            .map(|e| e.target.clone())
            .collect()
    }

    /// Whether `address` belongs to the run: processed itself, or resolved
    /// from a processed name.
    pub fn owns_address(&self, address: &str) -> bool {
        if self.contains_domain(address) {
            return true;
        }
        let Ok(ip) = address.parse::<IpAddr>() else {
            return false;
        };
        self.records
            .values()
            .any(|records| resolved_addresses(records).contains(&ip))
    }
}

/// A then AAAA values that parse as addresses, first occurrence kept.
pub fn resolved_addresses(records: &RecordMap) -> Vec<IpAddr> {
    let mut out = Vec::new();
    for kind in [RecordKind::A, RecordKind::Aaaa] {
        for value in records.get(&kind).into_iter().flatten() {
            if let Ok(ip) = value.parse::<IpAddr>()
                && !out.contains(&ip)
            {
                out.push(ip);
            }
        }
    }
    out
}
