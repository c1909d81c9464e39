//! Check runner
//!
//! Resolves settings from CLI + config file, runs the measurement on a
//! blocking thread and races it against the invocation deadline. Every
//! failure path ends in a [`CheckReport`], never in an error or a crash.

use crate::cli::Cli;
use anyhow::{Context, Result};
use memprobe_common::config::DEFAULT_TIMEOUT_SECS;
use memprobe_common::{
    estimate, CheckReport, MeminfoParser, MeminfoSource, ProbeConfig, Thresholds, Verbosity,
};
use std::any::Any;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Everything one check run needs, after merging CLI and config
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSettings {
    pub thresholds: Thresholds,
    pub source: MeminfoSource,
    pub timeout: Duration,
    pub verbosity: Verbosity,
}

impl CheckSettings {
    /// Command-line values win over the config file
    pub fn resolve(cli: &Cli, config: &ProbeConfig) -> Result<Self> {
        let warning = cli.warning.as_deref().unwrap_or(&config.thresholds.warning);
        let critical = cli.critical.as_deref().unwrap_or(&config.thresholds.critical);
        let thresholds = Thresholds::parse(warning, critical)?;

        let source = MeminfoSource::from_arg(
            cli.meminfo.as_deref().unwrap_or(&config.source.meminfo_path),
        );
        let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.runtime.timeout_secs));

        Ok(Self {
            thresholds,
            source,
            timeout,
            verbosity: cli.verbosity(),
        })
    }

    /// Load the config file named on the command line (or the system one) and resolve
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = ProbeConfig::load(cli.config.as_deref()).context("loading configuration")?;
        debug!(?config, "configuration loaded");
        Self::resolve(cli, &config)
    }
}

/// Time budget for one invocation, measured from its start
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    /// Same start instant, new limit
    pub fn with_limit(self, limit: Duration) -> Self {
        Self { limit, ..self }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    fn expired_report(&self) -> CheckReport {
        CheckReport::unknown(format!(
            "check timed out after {} seconds",
            self.limit.as_secs()
        ))
    }
}

/// Read, estimate and evaluate once
pub fn run_check(settings: &CheckSettings) -> CheckReport {
    let verbosity = settings.verbosity;
    let measured = MeminfoParser::new(verbosity)
        .read(&settings.source)
        .and_then(|stats| estimate(&stats, verbosity));

    match measured {
        Ok(estimate) => {
            let report = CheckReport::measured(estimate, settings.thresholds.clone(), verbosity);
            info!(
                state = %report.state(),
                available_kb = estimate.available_kb,
                method = estimate.method.as_str(),
                "check complete"
            );
            report
        }
        Err(err) => {
            warn!(source = %settings.source.describe(), error = %err, "check failed");
            CheckReport::from(err)
        }
    }
}

/// Run `work` on a blocking thread, giving up when `deadline` runs out.
///
/// Timeouts and panics come back as the UNKNOWN report to print.
pub async fn with_deadline<T, F>(deadline: Deadline, work: F) -> std::result::Result<T, CheckReport>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);

    match tokio::time::timeout(deadline.remaining(), task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) => {
            let message = if join_err.is_panic() {
                panic_message(join_err.into_panic())
            } else {
                join_err.to_string()
            };
            warn!(%message, "check aborted");
            Err(CheckReport::unknown(format!("internal error: {}", message)))
        }
        Err(_) => {
            warn!(limit = ?deadline.limit(), "check deadline exceeded");
            Err(deadline.expired_report())
        }
    }
}

/// Measurement bounded by `deadline`
pub async fn run_within(settings: CheckSettings, deadline: Deadline) -> CheckReport {
    with_deadline(deadline, move || run_check(&settings))
        .await
        .unwrap_or_else(|report| report)
}

/// Measurement bounded by the settings' own timeout
pub async fn run(settings: CheckSettings) -> CheckReport {
    let deadline = Deadline::start(settings.timeout);
    run_within(settings, deadline).await
}

/// Full invocation: config loading and measurement share one deadline.
///
/// Until the config file is read the limit comes from `--timeout` or the
/// built-in default; afterwards the resolved timeout applies from the same
/// start instant.
pub async fn run_invocation(cli: Cli) -> CheckReport {
    let startup = Duration::from_secs(cli.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let deadline = Deadline::start(startup);

    let settings = match with_deadline(deadline, move || CheckSettings::from_cli(&cli)).await {
        Ok(Ok(settings)) => settings,
        Ok(Err(err)) => {
            error!("{:#}", err);
            return CheckReport::unknown(format!("{:#}", err));
        }
        Err(report) => return report,
    };

    let deadline = deadline.with_limit(settings.timeout);
    run_within(settings, deadline).await
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}
