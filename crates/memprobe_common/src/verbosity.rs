//! Verbosity level handed explicitly to every stage of the check

/// How much diagnostic detail a check run produces.
///
/// - 0: status line only
/// - 1: status line names the estimation method
/// - 2: additionally dumps every parsed meminfo field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const MAX: u8 = 2;

    /// Clamp a raw `-v` count into the supported range
    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn reports_method(&self) -> bool {
        self.0 >= 1
    }

    pub fn dumps_fields(&self) -> bool {
        self.0 >= 2
    }

    /// Default log filter directive for this level
    pub fn log_directive(&self) -> &'static str {
        match self.0 {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
