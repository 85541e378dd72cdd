use crate::handlers::ScanOutcome;
use colored::Colorize;
use dnsmap_core::Strategy;
use dnsmap_scanner::RecordKind;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Console rendering of a finished (or cancelled) run.
pub fn render_results(outcome: &ScanOutcome) -> String {
    let bundle = &outcome.bundle;
    let root = bundle.root.as_str();
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", RULE.dimmed()));
    out.push_str(&format!("{} {}\n", "Target:".bold(), root.bright_white()));

    if let Some(records) = bundle.records.get(root) {
        section(&mut out, "Records");
        for kind in RecordKind::ALL {
            let values = records.get(&kind).map(Vec::as_slice).unwrap_or_default();
            out.push_str(&format!("  {}\n", format!("{}:", kind).cyan()));
            items(&mut out, values, 4);
        }
    }

    if let Some(txt) = bundle.txts.get(root) {
        section(&mut out, "TXT");
        out.push_str(&format!("  {}\n", "raw:".cyan()));
        items(&mut out, &txt.raw, 4);
        out.push_str(&format!("  {}\n", "domains:".cyan()));
        items(&mut out, &txt.domains, 4);
        out.push_str(&format!("  {}\n", "ips:".cyan()));
        items(&mut out, &txt.ips, 4);
    }

    if outcome.strategies.contains(Strategy::Crawl) {
        section(&mut out, "Parents");
        items(&mut out, &outcome.parents, 2);
    }

    if let Some(services) = bundle.srvs.get(root) {
        section(&mut out, "SRV");
        for (service, entries) in services {
            out.push_str(&format!("  {}\n", format!("{}:", service).cyan()));
            if entries.is_empty() {
                out.push_str(&format!("    {}\n", "(none)".dimmed()));
            }
            for e in entries {
                out.push_str(&format!(
                    "    {}:{} {}\n",
                    e.target,
                    e.port,
                    format!("(priority {}, weight {})", e.priority, e.weight).dimmed()
                ));
            }
        }
    }

    let addresses = root_addresses(outcome);

    let reverse: Vec<_> = addresses
        .iter()
        .filter_map(|ip| bundle.reverse.get_key_value(ip))
        .collect();
    if outcome.strategies.contains(Strategy::Rev) {
        section(&mut out, "Reverse DNS");
        if reverse.is_empty() {
            out.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for (ip, ptrs) in reverse {
            out.push_str(&format!("  {}\n", format!("{}:", ip).cyan()));
            items(&mut out, ptrs, 4);
        }
    }

    if let Some(hits) = bundle.subs.get(root) {
        section(&mut out, "Subdomains");
        if hits.is_empty() {
            out.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for hit in hits {
            let mut answers: Vec<String> = Vec::new();
            answers.extend(hit.a.iter().map(|a| format!("A {}", a)));
            answers.extend(hit.aaaa.iter().map(|a| format!("AAAA {}", a)));
            answers.extend(hit.cname.iter().map(|c| format!("CNAME {}", c)));
            out.push_str(&format!("  {} {}\n", hit.sub.green(), answers.join(", ").dimmed()));
        }
    }

    if outcome.strategies.contains(Strategy::Neighbors) {
        section(&mut out, "Neighbors");
        let probed: Vec<_> = addresses
            .iter()
            .filter_map(|ip| bundle.neighbors.get_key_value(ip))
            .collect();
        if probed.is_empty() {
            out.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for (ip, neighbors) in probed {
            out.push_str(&format!("  {}\n", format!("{}:", ip).cyan()));
            if neighbors.is_empty() {
                out.push_str(&format!("    {}\n", "(none)".dimmed()));
            }
            for n in neighbors {
                let ptrs = if n.ptrs.is_empty() {
                    "(no PTR)".dimmed().to_string()
                } else {
                    n.ptrs.join(", ")
                };
                out.push_str(&format!("    {} -> {}\n", n.ip, ptrs));
            }
        }
    }

    if bundle.max_depth > 0 {
        section(&mut out, &format!("Discovered ({} values)", bundle.domains.len()));
        items(&mut out, &bundle.domains, 2);

        section(&mut out, &format!("Relations ({})", bundle.edges.len()));
        if bundle.edges.is_empty() {
            out.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for edge in &bundle.edges {
            out.push_str(&format!(
                "  {} {} {} {}\n",
                edge.source,
                "->".dimmed(),
                edge.target,
                format!("[{}]", edge.relation).yellow()
            ));
        }
    }

    if bundle.cancelled {
        out.push_str(&format!("\n{}\n", "⚠ Run cancelled, results are partial".yellow()));
    }

    out.push_str(&format!("\n{}\n", RULE.dimmed()));
    out
}

/// Addresses the root section reports on: the root itself when it is an
/// address, otherwise what it resolved to.
fn root_addresses(outcome: &ScanOutcome) -> Vec<String> {
    let root = outcome.bundle.root.as_str();
    match root.parse::<std::net::IpAddr>() {
        Ok(_) => vec![root.to_string()],
        Err(_) => outcome
            .bundle
            .addresses_of(root)
            .iter()
            .map(|ip| ip.to_string())
            .collect(),
    }
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n", title.bold().bright_blue()));
}

fn items(out: &mut String, values: &[String], indent: usize) {
    if values.is_empty() {
        out.push_str(&format!("{:indent$}{}\n", "", "(none)".dimmed(), indent = indent));
        return;
    }
    for value in values {
        out.push_str(&format!("{:indent$}- {}\n", "", value, indent = indent));
    }
}
