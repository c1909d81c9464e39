//! Parser for /proc/meminfo
//!
//! Only the counters the availability estimate needs are retained:
//!
//! ```text
//! MemTotal:       16310196 kB
//! MemFree:         1034288 kB
//! MemAvailable:    9473788 kB
//! Buffers:          512044 kB
//! Cached:          7530128 kB
//! SReclaimable:     611860 kB
//! ```

use crate::error::{ProbeError, Result};
use crate::verbosity::Verbosity;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Kernel memory statistics pseudo-file
pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_()]+):[ \t]+([0-9]+)[ \t]+kB\s*$").expect("meminfo line pattern"));

/// Counters recognized by the parser, in /proc/meminfo order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeminfoField {
    MemTotal,
    MemFree,
    MemAvailable,
    Buffers,
    Cached,
    SReclaimable,
}

impl MeminfoField {
    pub const ALL: [MeminfoField; 6] = [
        MeminfoField::MemTotal,
        MeminfoField::MemFree,
        MeminfoField::MemAvailable,
        MeminfoField::Buffers,
        MeminfoField::Cached,
        MeminfoField::SReclaimable,
    ];

    /// Fields whose absence makes the source unusable, in the order they are checked
    pub const REQUIRED: [MeminfoField; 4] = [
        MeminfoField::MemTotal,
        MeminfoField::MemFree,
        MeminfoField::Buffers,
        MeminfoField::Cached,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeminfoField::MemTotal => "MemTotal",
            MeminfoField::MemFree => "MemFree",
            MeminfoField::MemAvailable => "MemAvailable",
            MeminfoField::Buffers => "Buffers",
            MeminfoField::Cached => "Cached",
            MeminfoField::SReclaimable => "SReclaimable",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for MeminfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed snapshot of the memory counters, values in kB.
///
/// Construction goes through [`MemoryStats::from_values`], which guarantees
/// the four required counters are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    values: BTreeMap<MeminfoField, u64>,
}

impl MemoryStats {
    /// Validate a raw field map
    pub fn from_values(values: BTreeMap<MeminfoField, u64>) -> Result<Self> {
        if let Some(missing) = MeminfoField::REQUIRED
            .iter()
            .find(|field| !values.contains_key(*field))
        {
            return Err(ProbeError::MissingRequiredField(missing.as_str()));
        }
        Ok(Self { values })
    }

    pub fn get(&self, field: MeminfoField) -> Option<u64> {
        self.values.get(&field).copied()
    }

    // Required fields are checked in from_values
    fn required(&self, field: MeminfoField) -> u64 {
        self.get(field).unwrap_or_default()
    }

    pub fn mem_total_kb(&self) -> u64 {
        self.required(MeminfoField::MemTotal)
    }

    pub fn mem_free_kb(&self) -> u64 {
        self.required(MeminfoField::MemFree)
    }

    pub fn buffers_kb(&self) -> u64 {
        self.required(MeminfoField::Buffers)
    }

    pub fn cached_kb(&self) -> u64 {
        self.required(MeminfoField::Cached)
    }

    pub fn mem_available_kb(&self) -> Option<u64> {
        self.get(MeminfoField::MemAvailable)
    }

    pub fn sreclaimable_kb(&self) -> Option<u64> {
        self.get(MeminfoField::SReclaimable)
    }

    /// All retained fields in /proc/meminfo order
    pub fn iter(&self) -> impl Iterator<Item = (MeminfoField, u64)> + '_ {
        self.values.iter().map(|(field, value)| (*field, *value))
    }
}

/// Where the meminfo text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeminfoSource {
    Path(PathBuf),
    Stdin,
}

impl MeminfoSource {
    /// `-` selects standard input, anything else is a filesystem path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            MeminfoSource::Stdin
        } else {
            MeminfoSource::Path(PathBuf::from(arg))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            MeminfoSource::Path(path) => path.display().to_string(),
            MeminfoSource::Stdin => "<stdin>".to_string(),
        }
    }
}

impl Default for MeminfoSource {
    fn default() -> Self {
        MeminfoSource::Path(PathBuf::from(DEFAULT_MEMINFO_PATH))
    }
}

/// Line-oriented meminfo parser
#[derive(Debug, Clone, Copy, Default)]
pub struct MeminfoParser {
    verbosity: Verbosity,
}

impl MeminfoParser {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Open `source` and parse it. The source is read exactly once.
    pub fn read(&self, source: &MeminfoSource) -> Result<MemoryStats> {
        let name = source.describe();
        match source {
            MeminfoSource::Path(path) => {
                let file = File::open(path).map_err(|e| ProbeError::unreadable(&name, &e))?;
                self.parse_reader(BufReader::new(file), &name)
            }
            MeminfoSource::Stdin => self.parse_reader(io::stdin().lock(), &name),
        }
    }

    /// Parse already-loaded meminfo text
    pub fn parse_str(&self, text: &str) -> Result<MemoryStats> {
        self.parse_reader(text.as_bytes(), "<memory>")
    }

    /// Parse a line stream; `name` is only used in error messages
    pub fn parse_reader<R: BufRead>(&self, reader: R, name: &str) -> Result<MemoryStats> {
        let mut values = BTreeMap::new();

        // Split on raw bytes: a line that is not UTF-8 cannot match and is skipped
        for line in reader.split(b'\n') {
            let line = line.map_err(|e| ProbeError::unreadable(name, &e))?;
            let Some((field, value)) = parse_line(&String::from_utf8_lossy(&line)) else {
                continue;
            };
            // Last occurrence wins
            values.insert(field, value);
        }

        if self.verbosity.dumps_fields() {
            for (field, value_kb) in &values {
                debug!(field = field.as_str(), value_kb, "meminfo field");
            }
        }

        MemoryStats::from_values(values)
    }
}

/// Match one `<Name>: <int> kB` line and keep it if the name is recognized
fn parse_line(line: &str) -> Option<(MeminfoField, u64)> {
    let caps = LINE_RE.captures(line)?;
    let field = MeminfoField::from_name(caps.get(1)?.as_str())?;
    let raw = caps.get(2)?.as_str();
    match raw.parse::<u64>() {
        Ok(value) => Some((field, value)),
        Err(e) => {
            warn!(field = field.as_str(), raw, error = %e, "skipping out-of-range meminfo value");
            None
        }
    }
}
