pub mod commands;
pub mod display;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    ScanOutcome, ScanSettings, build_graph, expand_path, handle_scan, run_scan,
    settings_from_matches, strategies_from_matches, write_outputs,
};
