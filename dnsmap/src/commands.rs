use clap::arg;
use dnsmap_scanner::MAX_NEIGHBOR_RADIUS;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_REPORT_PATH: &str = "out/report.md";

/// Strategy flags, in execution order.
pub const STRATEGY_FLAGS: [&str; 6] = ["txt", "sub", "crawl", "srv", "neighbors", "rev"];

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("dnsmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("dnsmap")
        .about("Multi-hop DNS reconnaissance: expand a domain into the names and addresses around it")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log every query and frontier item to stderr").required(false))
        .arg(
            arg!(<DOMAIN>)
                .required(true)
                .help("The domain (or IP address) to start from"),
        )
        .arg(
            arg!(--"txt")
                .help("Parse TXT records for embedded domains and IPv4 addresses")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"sub")
                .help("Brute-force subdomains from a wordlist")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"crawl")
                .help("Walk parent domains up to the public suffix")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"srv")
                .help("Probe well-known SRV services")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"neighbors")
                .help("Reverse-resolve IPv4 addresses adjacent to each resolved address")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"rev")
                .help("Reverse-resolve every resolved address")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-w --"wordlist" <PATH>)
                .required(false)
                .help("Subdomain wordlist, one word per line (default: bundled list)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-r --"radius" <N>)
                .required(false)
                .help("Number of addresses to probe on each side for --neighbors (max 1024)")
                .value_parser(
                    clap::value_parser!(u32).range(0..=i64::from(MAX_NEIGHBOR_RADIUS)),
                )
                .default_value("2"),
        )
        .arg(
            arg!(-d --"depth" <N>)
                .required(false)
                .help("Number of hops to expand from the root (0: root only)")
                .value_parser(clap::value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            arg!(--"graph" <PATH>)
                .required(false)
                .help("Write the relation graph to PATH.dot and render it with Graphviz")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"graph-format" <FORMAT>)
                .required(false)
                .help("Graphviz output format")
                .value_parser(["png", "pdf", "svg", "dot"])
                .default_value("png"),
        )
        .arg(
            arg!(--"report" [PATH])
                .required(false)
                .help("Write a report, JSON for a .json path and Markdown otherwise")
                .num_args(0..=1)
                .default_missing_value(DEFAULT_REPORT_PATH)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"json" <PATH>)
                .required(false)
                .help("Write the full result bundle as JSON")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Per-query resolver timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("2"),
        )
}
