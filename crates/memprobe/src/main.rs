//! check_memory - available memory monitoring plugin
//!
//! Prints one status line and exits 0/1/2/3 for OK/WARNING/CRITICAL/UNKNOWN.

use memprobe::cli::Cli;
use memprobe::logging;
use memprobe::runner;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_or_exit();
    logging::init(cli.verbosity());

    debug!("check_memory v{} starting", env!("CARGO_PKG_VERSION"));

    let report = runner::run_invocation(cli).await;

    println!("{}", report);

    // Exit here rather than returning, so a read still blocked past the
    // deadline cannot keep the runtime alive.
    std::process::exit(report.exit_code());
}
