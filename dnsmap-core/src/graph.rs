// Relation graph built from expansion results

use crate::bundle::{Relation, ResultBundle};
use dnsmap_scanner::RecordKind;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Domain,
    Ip,
}

impl NodeKind {
    pub fn of(label: &str) -> Self {
        if label.parse::<IpAddr>().is_ok() {
            NodeKind::Ip
        } else {
            NodeKind::Domain
        }
    }

    fn dot_style(&self) -> &'static str {
        match self {
            NodeKind::Domain => "shape = ellipse, style = filled, fillcolor = \"#d9edf7\"",
            NodeKind::Ip => "shape = box, style = filled, fillcolor = \"#f2f2f2\"",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub label: String,
    pub kind: NodeKind,
}

/// Label -> node index for the graph under construction. Lives exactly as
/// long as one build.
#[derive(Debug, Default)]
pub struct BuildContext {
    added: HashMap<String, NodeIndex>,
}

impl BuildContext {
    pub fn get(&self, label: &str) -> Option<NodeIndex> {
        self.added.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

/// Builds the relation graph of a run.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DiGraph<GraphNode, String>,
    context: BuildContext,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full graph for a bundle.
    pub fn from_bundle(bundle: &ResultBundle) -> Self {
        let mut builder = Self::new();
        builder.add_bundle(bundle);
        builder
    }

    pub fn graph(&self) -> &DiGraph<GraphNode, String> {
        &self.graph
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn into_graph(self) -> DiGraph<GraphNode, String> {
        self.graph
    }

    /// Node for `label`, created on first use with the kind its syntax implies.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(index) = self.context.get(label) {
            return index;
        }
        let index = self.graph.add_node(GraphNode {
            label: label.to_string(),
            kind: NodeKind::of(label),
        });
        self.context.added.insert(label.to_string(), index);
        index
    }

    pub fn add_edge(&mut self, source: &str, target: &str, label: impl Into<String>) {
        let target = target.trim_end_matches('.');
        if target.is_empty() {
            return;
        }
        let from = self.add_node(source);
        let to = self.add_node(target);
        self.graph.add_edge(from, to, label.into());
    }

    pub fn add_bundle(&mut self, bundle: &ResultBundle) {
        for domain in &bundle.domains {
            self.add_node(domain);
        }

        for (name, records) in &bundle.records {
            for (kind, values) in records {
                for value in values {
                    if let Some(target) = record_target(*kind, value) {
                        self.add_edge(name, &target, kind.as_str());
                    }
                }
            }
        }

        for (name, txt) in &bundle.txts {
            for target in txt.domains.iter().chain(txt.ips.iter()) {
                self.add_edge(name, target, "TXT");
            }
        }

        for (name, services) in &bundle.srvs {
            for (service, entries) in services {
                for entry in entries {
                    self.add_edge(name, &entry.target, format!("SRV {} :{}", service, entry.port));
                }
            }
        }

        for (name, hits) in &bundle.subs {
            for hit in hits {
                self.add_edge(name, &hit.sub, Relation::Sub.as_str());
                for a in &hit.a {
                    self.add_edge(&hit.sub, a, "A");
                }
                for aaaa in &hit.aaaa {
                    self.add_edge(&hit.sub, aaaa, "AAAA");
                }
                for cname in &hit.cname {
                    self.add_edge(&hit.sub, cname, "CNAME");
                }
            }
        }

        for (ip, ptrs) in &bundle.reverse {
            for ptr in ptrs {
                self.add_edge(ip, ptr, "PTR");
            }
        }

        for (ip, neighbors) in &bundle.neighbors {
            for neighbor in neighbors {
                self.add_edge(ip, &neighbor.ip, "neighbor");
                for ptr in &neighbor.ptrs {
                    self.add_edge(&neighbor.ip, ptr, "PTR");
                }
            }
        }

        // TXT, sub and PTR discoveries are already drawn from the stored
        // results; parents only exist as provenance.
        for edge in bundle.edges.iter().filter(|e| e.relation == Relation::Parent) {
            self.add_edge(&edge.source, &edge.target, edge.relation.as_str());
        }
    }

    /// Parent edges for a name whose parents were derived outside a run.
    pub fn add_parents(&mut self, name: &str, parents: &[String]) {
        for parent in parents {
            self.add_edge(name, parent, Relation::Parent.as_str());
        }
    }

    /// Graphviz DOT source for the graph.
    pub fn to_dot(&self) -> String {
        format!(
            "{:?}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::EdgeNoLabel, Config::NodeNoLabel],
                &|_, edge| format!("label = {:?}", edge.weight()),
                &|_, (_, node)| format!("label = {:?}, {}", node.label, node.kind.dot_style()),
            )
        )
    }

    /// Write `<outpath>.dot` and, when Graphviz is installed, render it to
    /// `<outpath>.<format>`. Returns the rendered file, or the DOT file when
    /// `dot` is unavailable or fails.
    pub fn render(&self, outpath: &Path, format: &str) -> io::Result<PathBuf> {
        if let Some(parent) = outpath.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let dot_path = with_suffix(outpath, "dot");
        fs::write(&dot_path, self.to_dot())?;

        if format == "dot" {
            return Ok(dot_path);
        }

        let rendered = with_suffix(outpath, format);
        match Command::new("dot")
            .arg(format!("-T{}", format))
            .arg(&dot_path)
            .arg("-o")
            .arg(&rendered)
            .status()
        {
            Ok(status) if status.success() => {
                debug!("Rendered graph to {}", rendered.display());
                Ok(rendered)
            }
            Ok(status) => {
                warn!("Graphviz exited with {}, keeping DOT source", status);
                Ok(dot_path)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Graphviz `dot` not found, keeping DOT source");
                Ok(dot_path)
            }
            Err(e) => Err(e),
        }
    }
}

/// The node a forward record points at, if it names one. SOA values are not
/// drawn; MX values drop their preference.
fn record_target(kind: RecordKind, value: &str) -> Option<String> {
    let target = match kind {
        RecordKind::Soa => return None,
        RecordKind::Mx => value.split_whitespace().last()?,
        _ => value,
    };
    let target = target.trim_end_matches('.');
    (!target.is_empty()).then(|| target.to_string())
}

fn with_suffix(path: &Path, extension: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}
