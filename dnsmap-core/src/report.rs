// Report generation from expansion results

use crate::bundle::ResultBundle;
use dnsmap_scanner::RecordKind;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// Format named by the file extension, Markdown when it names none.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
            .unwrap_or(ReportFormat::Markdown)
    }
}

/// Render the bundle in `format`.
pub fn generate_report(bundle: &ResultBundle, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Markdown => Ok(generate_markdown_report(bundle)),
        ReportFormat::Json => generate_json_report(bundle),
    }
}

pub fn generate_markdown_report(bundle: &ResultBundle) -> String {
    let mut report = String::new();

    report.push_str(&format!("# DNS report for {}\n\n", bundle.root));
    report.push_str(&format!(
        "Generated: {}\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!("- Max depth: {}\n", bundle.max_depth));
    report.push_str(&format!("- Values processed: {}\n", bundle.domains.len()));
    report.push_str(&format!("- Relations: {}\n", bundle.edges.len()));
    if bundle.cancelled {
        report.push_str("- Status: cancelled (partial results)\n");
    }
    report.push('\n');

    for domain in &bundle.domains {
        report.push_str(&format!("## {}\n\n", domain));

        if let Some(records) = bundle.records.get(domain) {
            report.push_str("### A/AAAA/NS/MX/CNAME/SOA\n\n");
            for kind in RecordKind::ALL {
                let values = records.get(&kind).map(Vec::as_slice).unwrap_or_default();
                report.push_str(&format!("#### {}\n", kind));
                push_items(&mut report, values.iter().map(String::as_str));
                report.push('\n');
            }
        }

        if let Some(txt) = bundle.txts.get(domain) {
            report.push_str("### TXT (domains / ips)\n\n");
            if txt.domains.is_empty() && txt.ips.is_empty() {
                report.push_str("- (none)\n");
            }
            for d in &txt.domains {
                report.push_str(&format!("- domain: {}\n", d));
            }
            for ip in &txt.ips {
                report.push_str(&format!("- ip: {}\n", ip));
            }
            report.push('\n');
        }

        if let Some(hits) = bundle.subs.get(domain) {
            report.push_str("### Subdomains\n\n");
            if hits.is_empty() {
                report.push_str("- (none)\n");
            }
            for hit in hits {
                let mut answers: Vec<String> = Vec::new();
                answers.extend(hit.a.iter().map(|a| format!("A {}", a)));
                answers.extend(hit.aaaa.iter().map(|a| format!("AAAA {}", a)));
                answers.extend(hit.cname.iter().map(|c| format!("CNAME {}", c)));
                report.push_str(&format!("- {} ({})\n", hit.sub, answers.join(", ")));
            }
            report.push('\n');
        }

        if let Some(services) = bundle.srvs.get(domain) {
            report.push_str("### SRV\n\n");
            let mut any = false;
            for (service, entries) in services {
                for e in entries {
                    any = true;
                    report.push_str(&format!(
                        "- {}: {}:{} (priority {}, weight {})\n",
                        service, e.target, e.port, e.priority, e.weight
                    ));
                }
            }
            if !any {
                report.push_str("- (none)\n");
            }
            report.push('\n');
        }

        let addresses: Vec<String> = match domain.parse::<std::net::IpAddr>() {
            Ok(_) => vec![domain.clone()],
            Err(_) => bundle
                .addresses_of(domain)
                .iter()
                .map(|ip| ip.to_string())
                .collect(),
        };

        let reverse: Vec<(&String, &Vec<String>)> = addresses
            .iter()
            .filter_map(|ip| bundle.reverse.get_key_value(ip))
            .collect();
        if !reverse.is_empty() {
            report.push_str("### Reverse DNS\n\n");
            for (ip, ptrs) in reverse {
                if ptrs.is_empty() {
                    report.push_str(&format!("- {} -> (no PTR)\n", ip));
                } else {
                    report.push_str(&format!("- {} -> {}\n", ip, ptrs.join(", ")));
                }
            }
            report.push('\n');
        }

        let neighbors: Vec<_> = addresses
            .iter()
            .filter_map(|ip| bundle.neighbors.get_key_value(ip))
            .collect();
        if !neighbors.is_empty() {
            report.push_str("### IP neighbors\n\n");
            for (ip, entries) in neighbors {
                report.push_str(&format!("#### {}\n", ip));
                for n in entries {
                    if n.ptrs.is_empty() {
                        report.push_str(&format!("- {} -> (no PTR)\n", n.ip));
                    } else {
                        report.push_str(&format!("- {} -> {}\n", n.ip, n.ptrs.join(", ")));
                    }
                }
                report.push('\n');
            }
        }
    }

    if !bundle.edges.is_empty() {
        report.push_str("## Relations\n\n");
        report.push_str("| Source | Target | Relation |\n");
        report.push_str("|--------|--------|----------|\n");
        for edge in &bundle.edges {
            report.push_str(&format!("| {} | {} | {} |\n", edge.source, edge.target, edge.relation));
        }
        report.push('\n');
    }

    report
}

pub fn generate_json_report(bundle: &ResultBundle) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "dnsmap",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "root": bundle.root,
                "max_depth": bundle.max_depth,
                "total_domains": bundle.domains.len(),
                "total_edges": bundle.edges.len(),
                "cancelled": bundle.cancelled
            },
            "results": bundle
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn push_items<'a>(report: &mut String, items: impl Iterator<Item = &'a str>) {
    let mut empty = true;
    for item in items {
        empty = false;
        report.push_str(&format!("- {}\n", item));
    }
    if empty {
        report.push_str("- (none)\n");
    }
}
