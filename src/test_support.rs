//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::host::HostInfo;
use crate::core::state::App;
use crate::interpreter::{Interpreter, InterpreterError, OutputCallback};

/// An interpreter whose readiness and answers are set by the test.
///
/// Each `run` pops the next scripted result (or answers `Ok(None)` when the
/// script is empty) after sending any scripted output lines.
#[derive(Default)]
pub struct ScriptedInterpreter {
    ready: AtomicBool,
    results: Mutex<VecDeque<Result<Option<String>, InterpreterError>>>,
    output_lines: Mutex<Vec<String>>,
    callback: Mutex<Option<OutputCallback>>,
    sources: Mutex<Vec<String>>,
}

impl ScriptedInterpreter {
    pub fn ready() -> Self {
        let interpreter = Self::default();
        interpreter.set_ready(true);
        interpreter
    }

    pub fn loading() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn push_result(&self, result: Result<Option<String>, InterpreterError>) {
        self.results.lock().unwrap().push_back(result);
    }

    /// Lines the next run prints before it resolves.
    pub fn print_on_run(&self, lines: &[&str]) {
        let mut output = self.output_lines.lock().unwrap();
        output.extend(lines.iter().map(|line| line.to_string()));
    }

    /// Every source string `run` has received, in order.
    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().unwrap().clone()
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn load(&self) -> Result<String, InterpreterError> {
        self.set_ready(true);
        Ok("Python 3.test".to_string())
    }

    async fn run(&self, source: &str) -> Result<Option<String>, InterpreterError> {
        self.sources.lock().unwrap().push(source.to_string());

        let printed: Vec<String> = self.output_lines.lock().unwrap().drain(..).collect();
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            for line in printed {
                callback(line);
            }
        }

        self.results.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    fn on_output(&self, callback: OutputCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }
}

/// A fresh session whose interpreter is still loading.
pub fn test_app() -> App {
    App::new(Arc::new(ScriptedInterpreter::loading()), HostInfo::default())
}

/// A fresh session around `interpreter`, plus a handle to drive it.
pub fn test_app_with(interpreter: ScriptedInterpreter) -> (App, Arc<ScriptedInterpreter>) {
    let handle = Arc::new(interpreter);
    let app = App::new(handle.clone(), HostInfo::default());
    (app, handle)
}
