//! # Application State
//!
//! Core session state for Mango. Domain logic only; presentation state
//! (scroll offsets, the half-typed input line, the rain) lives in `tui`.
//!
//! ```text
//! App
//! ├── mode: Mode                          // Shell or Interpreter
//! ├── affordance: Option<Affordance>      // the one open input line, if any
//! ├── transcript: Transcript              // output log
//! ├── commands: CommandTable              // fixed at startup
//! ├── interpreter: Arc<dyn Interpreter>   // delegated Python
//! ├── interpreter_status: InterpreterStatus
//! └── host: HostInfo                      // neofetch / hardware panel data
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::fmt;
use std::sync::Arc;

use crate::core::commands::CommandTable;
use crate::core::host::HostInfo;
use crate::core::transcript::Transcript;
use crate::interpreter::Interpreter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Shell,
    Interpreter,
}

impl Mode {
    /// Top line of the prompt.
    pub fn header(&self) -> &'static str {
        match self {
            Mode::Shell => "┌──(mang0㉿mang0)-[~]",
            Mode::Interpreter => "┌──(mang0㉿mang0)-[Python]",
        }
    }

    /// Start of the input line.
    pub fn marker(&self) -> &'static str {
        match self {
            Mode::Shell => "└─$ ",
            Mode::Interpreter => "└─>>> ",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Shell => "shell",
            Mode::Interpreter => "python",
        }
    }
}

/// The single input line that currently accepts a commit.
///
/// Retired on commit and never reopened; the next one gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    pub id: u64,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterStatus {
    Loading,
    /// Banner reported by the backend, e.g. "Python 3.12.1".
    Ready(String),
    Unavailable(String),
}

impl fmt::Display for InterpreterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpreterStatus::Loading => write!(f, "python loading..."),
            InterpreterStatus::Ready(banner) => write!(f, "{banner}"),
            InterpreterStatus::Unavailable(_) => write!(f, "python unavailable"),
        }
    }
}

pub struct App {
    pub mode: Mode,
    pub affordance: Option<Affordance>,
    pub transcript: Transcript,
    pub commands: CommandTable,
    pub interpreter: Arc<dyn Interpreter>,
    pub interpreter_status: InterpreterStatus,
    pub host: HostInfo,
    next_affordance_id: u64,
}

impl App {
    /// Fresh session in Shell mode with its first prompt open.
    pub fn new(interpreter: Arc<dyn Interpreter>, host: HostInfo) -> Self {
        let mut app = Self {
            mode: Mode::Shell,
            affordance: None,
            transcript: Transcript::new(),
            commands: CommandTable::standard(),
            interpreter,
            interpreter_status: InterpreterStatus::Loading,
            host,
            next_affordance_id: 0,
        };
        app.open_affordance();
        app
    }

    /// Open a new input line for the current mode and return its id.
    pub(crate) fn open_affordance(&mut self) -> u64 {
        let id = self.next_affordance_id;
        self.next_affordance_id += 1;
        self.affordance = Some(Affordance {
            id,
            mode: self.mode,
        });
        id
    }

    /// Retire the open affordance if `id` names it. `None` means the commit is stale.
    pub(crate) fn take_affordance(&mut self, id: u64) -> Option<Affordance> {
        self.affordance.take_if(|affordance| affordance.id == id)
    }

    pub fn active_affordance(&self) -> Option<Affordance> {
        self.affordance
    }
}
