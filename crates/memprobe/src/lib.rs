//! memprobe - monitoring plugin reporting available system memory
//!
//! The `check_memory` binary is a thin shell around these modules so the
//! argument handling and deadline logic can be exercised from tests.

pub mod cli;
pub mod logging;
pub mod runner;
