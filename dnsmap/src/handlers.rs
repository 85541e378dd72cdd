use crate::commands::STRATEGY_FLAGS;
use crate::display::render_results;
use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use dnsmap_core::report::{ReportFormat, generate_json_report, generate_report, save_report};
use dnsmap_core::{
    GraphBuilder, OrchestrateOptions, Orchestrator, ProgressCallback, ResultBundle, Strategy,
    StrategySet,
};
use dnsmap_scanner::{DnsLookup, Scanner, ScannerConfig, load_wordlist};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Everything one invocation asked for.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub domain: String,
    pub options: OrchestrateOptions,
    pub timeout: Duration,
    pub graph: Option<PathBuf>,
    pub graph_format: String,
    pub report: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub quiet: bool,
}

/// A finished run plus what the console needs beyond the bundle.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub bundle: ResultBundle,
    pub parents: Vec<String>,
    pub strategies: StrategySet,
}

/// Enabled strategies from the flags. No flag at all enables every strategy.
pub fn strategies_from_matches(matches: &ArgMatches) -> StrategySet {
    let chosen: StrategySet = STRATEGY_FLAGS
        .iter()
        .filter(|flag| matches.get_flag(flag))
        .filter_map(|flag| flag.parse::<Strategy>().ok())
        .collect();

    if chosen.is_empty() {
        StrategySet::all()
    } else {
        chosen
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

pub fn settings_from_matches(matches: &ArgMatches) -> Result<ScanSettings> {
    let domain = matches
        .get_one::<String>("DOMAIN")
        .context("A domain is required")?
        .clone();

    let wordlist = match matches.get_one::<PathBuf>("wordlist") {
        Some(path) => {
            let path = expand_path(path);
            let words = load_wordlist(&path)
                .with_context(|| format!("Failed to read wordlist {}", path.display()))?;
            if words.is_empty() {
                anyhow::bail!("No words found in {}", path.display());
            }
            Some(words)
        }
        None => None,
    };

    let options = OrchestrateOptions {
        max_depth: matches.get_one::<usize>("depth").copied().unwrap_or(0),
        strategies: strategies_from_matches(matches),
        wordlist,
        neighbor_radius: matches.get_one::<u32>("radius").copied().unwrap_or(2),
    };

    Ok(ScanSettings {
        domain,
        options,
        timeout: Duration::from_secs(matches.get_one::<u64>("timeout").copied().unwrap_or(2)),
        graph: matches.get_one::<PathBuf>("graph").map(|p| expand_path(p)),
        graph_format: matches
            .get_one::<String>("graph-format")
            .cloned()
            .unwrap_or_else(|| "png".to_string()),
        report: matches.get_one::<PathBuf>("report").map(|p| expand_path(p)),
        json: matches.get_one::<PathBuf>("json").map(|p| expand_path(p)),
        quiet: matches.get_flag("quiet"),
    })
}

/// Run the expansion and collect the parent chain of the root.
///
/// At depth 0 no discovery is recorded, so the parents are derived directly.
pub async fn run_scan<L>(
    lookup: &L,
    settings: &ScanSettings,
    cancellation: CancellationToken,
    progress: Option<ProgressCallback>,
) -> ScanOutcome
where
    L: DnsLookup + ?Sized,
{
    let options = &settings.options;
    let mut orchestrator = Orchestrator::new(lookup)
        .with_max_depth(options.max_depth)
        .with_strategies(options.strategies.clone())
        .with_wordlist(options.wordlist.clone())
        .with_neighbor_radius(options.neighbor_radius)
        .with_cancellation(cancellation);
    if let Some(callback) = progress {
        orchestrator = orchestrator.with_progress_callback(callback);
    }

    let bundle = orchestrator.run(&settings.domain).await;

    let crawl = options.strategies.contains(Strategy::Crawl);
    let is_address = bundle.root.parse::<IpAddr>().is_ok();
    let parents = if !crawl || is_address {
        Vec::new()
    } else if options.max_depth == 0 {
        lookup.crawl_to_tld(&bundle.root).await.unwrap_or_else(|e| {
            warn!("crawl lookup for {} failed: {}", bundle.root, e);
            Vec::new()
        })
    } else {
        bundle.parents_of(&bundle.root)
    };

    ScanOutcome {
        bundle,
        parents,
        strategies: options.strategies.clone(),
    }
}

/// Relation graph for the outcome, including the root's parents at depth 0.
pub fn build_graph(outcome: &ScanOutcome) -> GraphBuilder {
    let mut builder = GraphBuilder::from_bundle(&outcome.bundle);
    if outcome.bundle.max_depth == 0 {
        builder.add_parents(&outcome.bundle.root, &outcome.parents);
    }
    builder
}

/// Write the requested report, JSON and graph files. Returns what was written.
///
/// The report is JSON when its path ends in `.json`, Markdown otherwise.
pub fn write_outputs(outcome: &ScanOutcome, settings: &ScanSettings) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(path) = &settings.report {
        let report = generate_report(&outcome.bundle, ReportFormat::from_path(path))
            .context("Failed to serialize results")?;
        save_report(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        written.push(path.clone());
    }

    if let Some(path) = &settings.json {
        let json = generate_json_report(&outcome.bundle).context("Failed to serialize results")?;
        save_report(&json, path)
            .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        written.push(path.clone());
    }

    if let Some(path) = &settings.graph {
        let rendered = build_graph(outcome)
            .render(path, &settings.graph_format)
            .with_context(|| format!("Failed to write graph to {}", path.display()))?;
        if settings.graph_format != "dot" && rendered.extension().is_some_and(|e| e == "dot") {
            warn!("Graphviz could not render {}; DOT source kept", settings.graph_format);
        }
        written.push(rendered);
    }

    Ok(written)
}

pub async fn handle_scan(matches: &ArgMatches) -> Result<()> {
    let settings = settings_from_matches(matches)?;
    let config = ScannerConfig::default().with_timeout(settings.timeout);
    let scanner = Scanner::with_config(config);

    if !settings.quiet {
        eprintln!(
            "{} {} (depth {}, strategies: {})\n",
            "🔎 Mapping".bold(),
            settings.domain.bright_white(),
            settings.options.max_depth,
            settings.options.strategies
        );
    }

    let spinner = if settings.quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };

    let progress_spinner = spinner.clone();
    let progress: ProgressCallback = Arc::new(move |value: String, depth: usize| {
        progress_spinner.set_message(format!("[depth {}] {}", depth, value));
    });

    let cancellation = CancellationToken::new();
    let ctrl_c = cancellation.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling run");
            ctrl_c.cancel();
        }
    });

    let outcome = run_scan(&scanner, &settings, cancellation, Some(progress)).await;
    signal_task.abort();
    spinner.finish_and_clear();

    print!("{}", render_results(&outcome));

    for path in write_outputs(&outcome, &settings)? {
        println!("{} {}", "✓ Wrote".green(), path.display());
    }

    Ok(())
}
