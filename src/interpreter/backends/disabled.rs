//! Stand-in used when Python is turned off (`--no-python` or
//! `[python] enabled = false`). Never becomes ready, so py mode keeps
//! answering with the loading line.

use async_trait::async_trait;

use crate::interpreter::{Interpreter, InterpreterError, OutputCallback};

#[derive(Debug, Default)]
pub struct DisabledInterpreter;

impl DisabledInterpreter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Interpreter for DisabledInterpreter {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn load(&self) -> Result<String, InterpreterError> {
        Err(InterpreterError::Disabled)
    }

    async fn run(&self, _source: &str) -> Result<Option<String>, InterpreterError> {
        Err(InterpreterError::Disabled)
    }

    fn on_output(&self, _callback: OutputCallback) {}
}
