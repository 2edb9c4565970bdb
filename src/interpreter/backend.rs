use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

/// Receives text the interpreter prints by itself, one line per call.
pub type OutputCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Errors that can occur while loading or talking to an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    /// Switched off by configuration. Never becomes ready.
    Disabled,
    /// The backend process could not be started.
    Spawn(String),
    /// Reading from or writing to the backend failed.
    Io(String),
    /// The backend said something we could not understand.
    Protocol(String),
    /// The backend went away.
    Closed,
    /// The submitted code raised. Carries the interpreter's own message.
    Execution(String),
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpreterError::Disabled => write!(f, "python is disabled"),
            InterpreterError::Spawn(msg) => write!(f, "failed to start python: {msg}"),
            InterpreterError::Io(msg) => write!(f, "python I/O error: {msg}"),
            InterpreterError::Protocol(msg) => write!(f, "python protocol error: {msg}"),
            InterpreterError::Closed => write!(f, "python exited"),
            InterpreterError::Execution(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for InterpreterError {}

/// A delegated interpreter the session can hand source text to.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Whether `run` can be called right now.
    fn is_ready(&self) -> bool;

    /// Bring the backend up. Returns a human-readable banner on success.
    async fn load(&self) -> Result<String, InterpreterError>;

    /// Execute `source`. `Ok(None)` means it ran but produced no value.
    async fn run(&self, source: &str) -> Result<Option<String>, InterpreterError>;

    /// Register where printed output goes. Replaces any previous callback.
    fn on_output(&self, callback: OutputCallback);
}
