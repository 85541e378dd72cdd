pub mod bundle;
pub mod graph;
pub mod orchestrator;
pub mod report;
pub mod strategy;

use colored::Colorize;

pub use bundle::{Edge, Relation, ResultBundle};
pub use graph::{BuildContext, GraphBuilder, GraphNode, NodeKind};
pub use orchestrator::{OrchestrateOptions, Orchestrator, ProgressCallback, normalize, orchestrate};
pub use report::ReportFormat;
pub use strategy::{Strategy, StrategySet};

pub fn print_banner() {
    let banner = r#"
     _
  __| |_ __  ___ _ __ ___   __ _ _ __
 / _` | '_ \/ __| '_ ` _ \ / _` | '_ \
| (_| | | | \__ \ | | | | | (_| | |_) |
 \__,_|_| |_|___/_| |_| |_|\__,_| .__/
                                |_|"#;
    eprintln!("{}", banner.bright_cyan());
    eprintln!(
        "{}\n",
        format!("  v{} - DNS frontier mapper", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
