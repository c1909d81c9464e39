//! CLI - Command-line argument parsing
//!
//! Plugin conventions: argument errors are reported as UNKNOWN (exit 3),
//! never with clap's default exit status of 2, which a supervisor would
//! read as CRITICAL.

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use memprobe_common::{ServiceState, Verbosity};
use std::path::PathBuf;

/// Check available system memory against warning/critical thresholds
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "check_memory")]
#[command(version, about = "Report available system memory as a monitoring plugin")]
#[command(long_about = "Estimates the share of memory available to new applications from \n\
    /proc/meminfo and reports OK, WARNING, CRITICAL or UNKNOWN.\n\n\
    Ranges use the usual plugin syntax: '25:' alerts below 25, '~:80' or ':80' \n\
    alerts above 80, '10:90' alerts outside 10..90, '@10:90' alerts inside it.")]
pub struct Cli {
    /// Warning range for the percentage available [default: 25:]
    #[arg(short, long, value_name = "RANGE", allow_hyphen_values = true)]
    pub warning: Option<String>,

    /// Critical range for the percentage available [default: 10:]
    #[arg(short, long, value_name = "RANGE", allow_hyphen_values = true)]
    pub critical: Option<String>,

    /// Show the estimation method (-v) and every parsed field (-vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Seconds before the check gives up with UNKNOWN [default: 15]
    #[arg(short, long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Meminfo file to read, '-' for stdin [default: /proc/meminfo]
    #[arg(short, long, value_name = "PATH")]
    pub meminfo: Option<String>,

    /// Config file (default: /etc/memprobe/config.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse process arguments, exiting with UNKNOWN on bad usage
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) => exit_on_usage_error(err),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::new(self.verbose)
    }
}

fn exit_on_usage_error(err: clap::Error) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => {
            let _ = err.print();
            println!("{} - invalid arguments", ServiceState::Unknown);
            std::process::exit(ServiceState::Unknown.exit_code());
        }
    }
}
