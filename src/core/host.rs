//! # Host Snapshot
//!
//! What the machine looks like, as far as `neofetch` and the hardware panel
//! care. Filled in by `platform::probe_host`; core only formats it.
//!
//! Every query can come back empty. The labels turn that into the sentinel
//! strings the UI shows ("Unknown", "Unavailable").

use std::fmt;

/// Appended to a known memory figure in `neofetch`. `/proc/meminfo` and
/// `hw.memsize` report the machine, not a container's limit.
pub const MEMORY_CAVEAT: &str = "(host total, container limits may be lower)";

/// Graphics renderer, as far as the host will say.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GpuInfo {
    /// No graphics subsystem to ask.
    #[default]
    Unavailable,
    /// A graphics subsystem exists but won't name its renderer.
    Unknown,
    Renderer(String),
}

impl fmt::Display for GpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuInfo::Unavailable => write!(f, "Unavailable"),
            GpuInfo::Unknown => write!(f, "Unknown GPU"),
            GpuInfo::Renderer(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostInfo {
    pub cpu_cores: Option<usize>,
    pub gpu: GpuInfo,
    pub memory_mb: Option<u64>,
    /// Terminal size in cells (columns, rows).
    pub viewport: (u16, u16),
}

impl HostInfo {
    pub fn cpu_label(&self) -> String {
        match self.cpu_cores {
            Some(n) => format!("{n} cores"),
            None => "Unknown".to_string(),
        }
    }

    pub fn gpu_label(&self) -> String {
        self.gpu.to_string()
    }

    pub fn memory_label(&self) -> String {
        match self.memory_mb {
            Some(mb) => format!("{mb} MB"),
            None => "Unknown".to_string(),
        }
    }

    /// `memory_label` plus the caveat, when there is a figure to qualify.
    pub fn memory_detail(&self) -> String {
        match self.memory_mb {
            Some(_) => format!("{} {MEMORY_CAVEAT}", self.memory_label()),
            None => self.memory_label(),
        }
    }

    pub fn resolution_label(&self) -> String {
        format!("{}x{}", self.viewport.0, self.viewport.1)
    }
}
