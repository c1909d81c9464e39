//! Plugin output line
//!
//! `OK - 58.0% (9251MB) memory available (via MemAvailable) | available_memory=58.0%;25:;10:;0;100`

use crate::error::ProbeError;
use crate::estimate::AvailabilityEstimate;
use crate::status::ServiceState;
use crate::threshold::Thresholds;
use crate::verbosity::Verbosity;
use std::fmt;

/// Perfdata label for the measured value
pub const PERFDATA_LABEL: &str = "available_memory";

/// Outcome of one check run, ready to be printed
#[derive(Debug, Clone, PartialEq)]
pub enum CheckReport {
    Measured {
        state: ServiceState,
        estimate: AvailabilityEstimate,
        thresholds: Thresholds,
        verbosity: Verbosity,
    },
    Failed {
        message: String,
    },
}

impl CheckReport {
    /// Evaluate `estimate` against `thresholds`
    pub fn measured(
        estimate: AvailabilityEstimate,
        thresholds: Thresholds,
        verbosity: Verbosity,
    ) -> Self {
        let state = thresholds.evaluate(estimate.percent_available());
        CheckReport::Measured {
            state,
            estimate,
            thresholds,
            verbosity,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        CheckReport::Failed {
            message: message.into(),
        }
    }

    pub fn state(&self) -> ServiceState {
        match self {
            CheckReport::Measured { state, .. } => *state,
            CheckReport::Failed { .. } => ServiceState::Unknown,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.state().exit_code()
    }
}

impl From<ProbeError> for CheckReport {
    fn from(err: ProbeError) -> Self {
        CheckReport::unknown(err.to_string())
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckReport::Measured {
                state,
                estimate,
                thresholds,
                verbosity,
            } => {
                let pct = estimate.percent_text();
                write!(
                    f,
                    "{} - {}% ({}MB) memory available",
                    state,
                    pct,
                    estimate.available_mb()
                )?;
                if verbosity.reports_method() {
                    write!(f, " (via {})", estimate.method)?;
                }
                write!(
                    f,
                    " | {}={}%;{};{};0;100",
                    PERFDATA_LABEL, pct, thresholds.warning, thresholds.critical
                )
            }
            CheckReport::Failed { message } => {
                write!(f, "{} - {}", ServiceState::Unknown, message)
            }
        }
    }
}
