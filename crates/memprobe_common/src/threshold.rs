//! Monitoring-plugin threshold ranges
//!
//! | range   | alert when            |
//! |---------|-----------------------|
//! | `10`    | < 0 or > 10           |
//! | `10:`   | < 10                  |
//! | `~:10`  | > 10                  |
//! | `:10`   | > 10                  |
//! | `10:20` | < 10 or > 20          |
//! | `@10:20`| >= 10 and <= 20       |

use crate::error::{ProbeError, Result};
use crate::status::ServiceState;
use std::fmt;
use std::str::FromStr;

/// Default warning range: alert below 25% available
pub const DEFAULT_WARNING: &str = "25:";
/// Default critical range: alert below 10% available
pub const DEFAULT_CRITICAL: &str = "10:";

/// A parsed threshold range
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRange {
    start: f64,
    end: f64,
    inside: bool,
    text: String,
}

impl ThresholdRange {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ProbeError::InvalidThreshold(text.to_string());

        let trimmed = text.trim();
        let (inside, body) = match trimmed.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return Err(invalid());
        }

        let (start, end) = match body.split_once(':') {
            Some((start, end)) => {
                let start = match start {
                    "" | "~" => f64::NEG_INFINITY,
                    s => parse_bound(s).ok_or_else(invalid)?,
                };
                let end = match end {
                    "" => f64::INFINITY,
                    e => parse_bound(e).ok_or_else(invalid)?,
                };
                (start, end)
            }
            None => (0.0, parse_bound(body).ok_or_else(invalid)?),
        };

        if start > end || (start.is_infinite() && end.is_infinite()) {
            return Err(invalid());
        }

        Ok(Self {
            start,
            end,
            inside,
            text: trimmed.to_string(),
        })
    }

    /// True if `value` breaches this range
    pub fn alerts_on(&self, value: f64) -> bool {
        let within = value >= self.start && value <= self.end;
        if self.inside {
            within
        } else {
            !within
        }
    }

    /// The range as written, for perfdata
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn parse_bound(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl FromStr for ThresholdRange {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ThresholdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Warning and critical ranges evaluated together
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub warning: ThresholdRange,
    pub critical: ThresholdRange,
}

impl Thresholds {
    pub fn new(warning: ThresholdRange, critical: ThresholdRange) -> Self {
        Self { warning, critical }
    }

    pub fn parse(warning: &str, critical: &str) -> Result<Self> {
        Ok(Self::new(
            ThresholdRange::parse(warning)?,
            ThresholdRange::parse(critical)?,
        ))
    }

    /// Critical takes precedence over warning
    pub fn evaluate(&self, value: f64) -> ServiceState {
        if self.critical.alerts_on(value) {
            ServiceState::Critical
        } else if self.warning.alerts_on(value) {
            ServiceState::Warning
        } else {
            ServiceState::Ok
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: ThresholdRange {
                start: 25.0,
                end: f64::INFINITY,
                inside: false,
                text: DEFAULT_WARNING.to_string(),
            },
            critical: ThresholdRange {
                start: 10.0,
                end: f64::INFINITY,
                inside: false,
                text: DEFAULT_CRITICAL.to_string(),
            },
        }
    }
}
