//! memprobe common - memory availability check primitives
//!
//! Reads kernel memory counters, estimates how much memory is available,
//! and maps the result onto monitoring-plugin service states.

pub mod config;
pub mod error;
pub mod estimate;
pub mod meminfo;
pub mod report;
pub mod status;
pub mod threshold;
pub mod verbosity;

pub use config::ProbeConfig;
pub use error::{ProbeError, Result};
pub use estimate::{estimate, AvailabilityEstimate, EstimationMethod};
pub use meminfo::{MeminfoField, MeminfoParser, MeminfoSource, MemoryStats};
pub use report::CheckReport;
pub use status::ServiceState;
pub use threshold::{ThresholdRange, Thresholds};
pub use verbosity::Verbosity;
