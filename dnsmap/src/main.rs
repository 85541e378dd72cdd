use colored::Colorize;
use dnsmap::commands::command_argument_builder;
use dnsmap::handle_scan;
use dnsmap_core::print_banner;
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str = "warn,dnsmap=debug,dnsmap_core=debug,dnsmap_scanner=debug";

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();

    init_tracing(matches.get_flag("verbose"));

    // Show banner unless --quiet flag is set
    if !matches.get_flag("quiet") {
        print_banner();
    }

    if let Err(e) = handle_scan(&matches).await {
        eprintln!("{} {:#}", "✗".red(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays clean for the results. `RUST_LOG` wins
/// unless `-v` was given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
