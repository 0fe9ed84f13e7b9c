//! CLI entry point logic.
//!
//! Kept out of main.rs so the launcher can be embedded by other binaries.

use crate::{config, launcher};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "PLAY_LOG";

/// Install the stderr log subscriber. Warnings only unless `PLAY_LOG` says otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Load configuration, run the launcher against the process arguments and
/// return the exit code.
pub fn run_cli() -> i32 {
    init_tracing();

    let config = config::load_config();
    launcher::play(&config, std::env::args_os().skip(1))
}
