//! # Command Table
//!
//! The fake shell's entire vocabulary. Lookups are exact and case-sensitive:
//! no arguments, no flags, no prefixes. `uname -a` is one key, not a command
//! with an argument.
//!
//! Entries are either a fixed string or a producer closure. A producer may
//! return a line, write lines to the transcript itself, or ask the TUI to
//! open a URL via [`CommandContext::request_open`].
//!
//! `clear` and `py` are session transitions, not table entries. The session
//! handles them before it ever looks here.

use std::collections::HashMap;
use std::fmt;

use super::host::HostInfo;
use super::transcript::{LineStyle, Transcript};

pub const INSTAGRAM_URL: &str = "https://instagram.com/mang0.inc";

const HELP_TEXT: &str = "Available commands:
--help         Show this help message
clear          Clear the terminal
py             Enter Python mode
version        Show MangoOS version
neofetch       Display system info
uname -a       Show kernel and system info
ls             List current directory
cd             Change directory (mock)
whoami         Display current user
instagram      Open Instagram";

/// What a producer is allowed to touch while it runs.
pub struct CommandContext<'a> {
    pub host: &'a HostInfo,
    pub transcript: &'a mut Transcript,
    requested_url: Option<String>,
}

impl<'a> CommandContext<'a> {
    pub fn new(host: &'a HostInfo, transcript: &'a mut Transcript) -> Self {
        Self {
            host,
            transcript,
            requested_url: None,
        }
    }

    /// Ask for `url` to be opened once dispatch finishes.
    pub fn request_open(&mut self, url: impl Into<String>) {
        self.requested_url = Some(url.into());
    }

    pub fn into_requested_url(self) -> Option<String> {
        self.requested_url
    }
}

pub type Producer = Box<dyn Fn(&mut CommandContext<'_>) -> Option<String> + Send + Sync>;

pub enum CommandEntry {
    Literal(&'static str),
    Action(Producer),
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandEntry::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            CommandEntry::Action(_) => f.write_str("Action(..)"),
        }
    }
}

/// Read-only after construction.
#[derive(Debug)]
pub struct CommandTable {
    entries: HashMap<&'static str, CommandEntry>,
}

impl CommandTable {
    /// The MangoOS command set.
    pub fn standard() -> Self {
        let mut entries: HashMap<&'static str, CommandEntry> = HashMap::new();

        entries.insert("--help", CommandEntry::Literal(HELP_TEXT));
        entries.insert("version", CommandEntry::Literal("MangoOS version 1.0.0"));
        entries.insert("neofetch", CommandEntry::Action(Box::new(neofetch)));
        entries.insert(
            "uname -a",
            CommandEntry::Literal("MangoOS 5.15.0-mango #1 SMP Fri Jun 21 2025 x86_64 GNU/Linux"),
        );
        entries.insert(
            "ls",
            CommandEntry::Literal("Desktop  Documents  Downloads  Music  Pictures  Videos"),
        );
        entries.insert(
            "cd",
            CommandEntry::Literal("You are not allowed to leave this directory :)"),
        );
        entries.insert("whoami", CommandEntry::Literal("mang0"));
        entries.insert("instagram", CommandEntry::Action(Box::new(instagram)));

        Self { entries }
    }

    pub fn lookup(&self, key: &str) -> Option<&CommandEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn neofetch(ctx: &mut CommandContext<'_>) -> Option<String> {
    let host = ctx.host;
    Some(format!(
        "MangoOS 1.0.0\nResolution: {}\nCPU: {}\nGPU: {}\nMemory: {}",
        host.resolution_label(),
        host.cpu_label(),
        host.gpu_label(),
        host.memory_detail()
    ))
}

// Writes its own link line instead of returning text
fn instagram(ctx: &mut CommandContext<'_>) -> Option<String> {
    ctx.transcript.append(INSTAGRAM_URL, LineStyle::Link);
    ctx.request_open(INSTAGRAM_URL);
    None
}
