//! Host facts and OS integration.
//!
//! Everything here touches the real machine, so `core` only ever sees the
//! resulting [`HostInfo`] value.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::core::host::{GpuInfo, HostInfo};

const MEMINFO: &str = "/proc/meminfo";
const NVIDIA_GPUS: &str = "/proc/driver/nvidia/gpus";
const DRM_CLASS: &str = "/sys/class/drm";

/// Probe the machine once at startup. Unknown facts stay `None`.
pub fn probe_host(viewport: (u16, u16)) -> HostInfo {
    let host = HostInfo {
        cpu_cores: std::thread::available_parallelism()
            .ok()
            .map(|cores| cores.get()),
        gpu: probe_gpu(),
        memory_mb: probe_memory_mb(),
        viewport,
    };
    debug!("Probed host: {:?}", host);
    host
}

fn probe_memory_mb() -> Option<u64> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let bytes = String::from_utf8(output.stdout).ok()?.trim().parse::<u64>().ok()?;
        Some(bytes / (1024 * 1024))
    }

    #[cfg(not(target_os = "macos"))]
    {
        let content = fs::read_to_string(MEMINFO).ok()?;
        parse_meminfo_mb(&content)
    }
}

/// `MemTotal` from a `/proc/meminfo` dump, in MB.
fn parse_meminfo_mb(content: &str) -> Option<u64> {
    content
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb / 1024)
}

fn probe_gpu() -> GpuInfo {
    if let Ok(dirs) = fs::read_dir(NVIDIA_GPUS) {
        for dir in dirs.flatten() {
            let info = dir.path().join("information");
            if let Some(model) = fs::read_to_string(&info)
                .ok()
                .as_deref()
                .and_then(parse_nvidia_model)
            {
                return GpuInfo::Renderer(model);
            }
        }
    }

    if Path::new(DRM_CLASS).exists() {
        GpuInfo::Unknown
    } else {
        GpuInfo::Unavailable
    }
}

/// The `Model:` field of an NVIDIA driver `information` file.
fn parse_nvidia_model(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("Model:"))
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
}

/// Hand `url` to the desktop's default handler. Failures are logged and
/// otherwise ignored.
pub fn open_url(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };

    // Keep the opener from scribbling over the alternate screen
    let result = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match result {
        Ok(child) => debug!("Opened {} (pid {})", url, child.id()),
        Err(e) => warn!("Could not open {}: {}", url, e),
    }
}
