//! CPython backend driven over pipes.
//!
//! The child runs a small driver script (passed with `-c`) that reads one
//! JSON request per line on stdin and answers with JSON events on stdout:
//!
//! ```text
//! → {"id": 3, "source": "print('hi'); 1+1"}
//! ← {"kind": "stdout", "text": "hi"}
//! ← {"kind": "stdout", "text": "\n"}
//! ← {"kind": "result", "id": 3, "value": "2"}
//! ```
//!
//! Code runs in one persistent namespace, so names defined by one line are
//! visible to the next. If the last statement is an expression, its `str()`
//! is the result; `None` gives no result. Everything the code prints
//! (stdout and stderr) arrives as `stdout` events, which are batched into
//! whole lines before they reach the output callback.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::interpreter::{Interpreter, InterpreterError, OutputCallback};

const DRIVER: &str = r#"
import ast, io, json, sys, traceback

_out = sys.stdout
_in = sys.stdin


def _emit(event):
    _out.write(json.dumps(event) + "\n")
    _out.flush()


class _Forward(io.TextIOBase):
    def writable(self):
        return True

    def write(self, text):
        if text:
            _emit({"kind": "stdout", "text": text})
        return len(text)


sys.stdout = sys.stderr = _Forward()
sys.stdin = io.StringIO("")
_scope = {"__name__": "__main__", "__builtins__": __builtins__}


def _run(source):
    tree = ast.parse(source, "<input>", "exec")
    last = None
    if tree.body and isinstance(tree.body[-1], ast.Expr):
        last = ast.Expression(tree.body.pop().value)
    exec(compile(tree, "<input>", "exec"), _scope)
    if last is not None:
        return eval(compile(last, "<input>", "eval"), _scope)
    return None


_emit({"kind": "ready", "version": sys.version.split()[0]})
while True:
    line = _in.readline()
    if not line:
        break
    try:
        request = json.loads(line)
    except ValueError:
        continue
    rid = request.get("id")
    try:
        value = _run(request.get("source", ""))
        _emit({"kind": "result", "id": rid, "value": None if value is None else str(value)})
    except BaseException:
        kind, err, tb = sys.exc_info()
        while tb is not None and tb.tb_frame.f_code.co_filename != "<input>":
            tb = tb.tb_next
        message = "".join(traceback.format_exception(kind, err, tb)).rstrip()
        _emit({"kind": "error", "id": rid, "message": message})
"#;

// ============================================================================
// Driver Protocol Types
// ============================================================================

#[derive(Serialize, Debug)]
struct RunRequest<'a> {
    id: u64,
    source: &'a str,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum DriverEvent {
    Ready { version: String },
    Stdout { text: String },
    Result { id: u64, value: Option<String> },
    Error { id: u64, message: String },
}

/// Remove every complete line from `pending` and return them without their
/// newlines. Whatever follows the last newline stays buffered.
fn take_complete_lines(pending: &mut String) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = pending.find('\n') {
        let line = pending[..pos].trim_end_matches('\r').to_string();
        pending.drain(..pos + 1);
        lines.push(line);
    }
    lines
}

// ============================================================================
// Interpreter Implementation
// ============================================================================

struct Process {
    // Held so `kill_on_drop` reaps the child with the handle
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// Python via a `python3` child process.
pub struct PythonInterpreter {
    program: String,
    ready: AtomicBool,
    next_id: AtomicU64,
    process: tokio::sync::Mutex<Option<Process>>,
    output: Mutex<Option<OutputCallback>>,
}

impl PythonInterpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ready: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            process: tokio::sync::Mutex::new(None),
            output: Mutex::new(None),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn emit(&self, line: String) {
        let callback = self
            .output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        match callback {
            Some(callback) => callback(line),
            None => debug!("Python output with no listener: {}", line),
        }
    }

    /// Send one request and read events until its answer arrives.
    async fn exchange(
        &self,
        process: &mut Process,
        id: u64,
        source: &str,
    ) -> Result<Option<String>, InterpreterError> {
        let mut request = serde_json::to_string(&RunRequest { id, source })
            .map_err(|e| InterpreterError::Protocol(e.to_string()))?;
        request.push('\n');

        process
            .stdin
            .write_all(request.as_bytes())
            .await
            .map_err(|e| InterpreterError::Io(e.to_string()))?;
        process
            .stdin
            .flush()
            .await
            .map_err(|e| InterpreterError::Io(e.to_string()))?;

        let mut pending = String::new();
        let result = loop {
            let line = match process.stdout.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Err(InterpreterError::Closed),
                Err(e) => break Err(InterpreterError::Io(e.to_string())),
            };

            match serde_json::from_str::<DriverEvent>(&line) {
                Ok(DriverEvent::Stdout { text }) => {
                    pending.push_str(&text);
                    for complete in take_complete_lines(&mut pending) {
                        self.emit(complete);
                    }
                }
                Ok(DriverEvent::Result { id: answered, value }) if answered == id => {
                    break Ok(value);
                }
                Ok(DriverEvent::Error { id: answered, message }) if answered == id => {
                    break Err(InterpreterError::Execution(message));
                }
                Ok(other) => debug!("Ignoring driver event {:?}", other),
                Err(e) => warn!("Unparseable driver line {:?}: {}", line, e),
            }
        };

        // A print without a trailing newline still shows up
        if !pending.is_empty() {
            self.emit(std::mem::take(&mut pending));
        }

        result
    }
}

#[async_trait]
impl Interpreter for PythonInterpreter {
    fn name(&self) -> &str {
        "python"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn load(&self) -> Result<String, InterpreterError> {
        let mut guard = self.process.lock().await;
        self.ready.store(false, Ordering::SeqCst);
        // Dropping an old process kills it
        *guard = None;

        info!("Starting {} for py mode", self.program);
        let mut child = Command::new(&self.program)
            .args(["-u", "-c", DRIVER])
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| InterpreterError::Spawn(format!("{}: {e}", self.program)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| InterpreterError::Io("stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| InterpreterError::Io("stdout was not captured".to_string()))?;
        let mut stdout = BufReader::new(stdout).lines();

        let first = stdout
            .next_line()
            .await
            .map_err(|e| InterpreterError::Io(e.to_string()))?
            .ok_or(InterpreterError::Closed)?;

        let version = match serde_json::from_str::<DriverEvent>(&first) {
            Ok(DriverEvent::Ready { version }) => version,
            Ok(other) => {
                return Err(InterpreterError::Protocol(format!(
                    "expected ready, got {other:?}"
                )));
            }
            Err(e) => {
                return Err(InterpreterError::Protocol(format!("{e} in {first:?}")));
            }
        };

        *guard = Some(Process {
            _child: child,
            stdin,
            stdout,
        });
        self.ready.store(true, Ordering::SeqCst);
        info!("Python {} ready", version);
        Ok(format!("Python {version}"))
    }

    async fn run(&self, source: &str) -> Result<Option<String>, InterpreterError> {
        let mut guard = self.process.lock().await;
        let Some(process) = guard.as_mut() else {
            return Err(InterpreterError::Closed);
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("Python run {} ({} bytes)", id, source.len());
        let result = self.exchange(process, id, source).await;

        if matches!(
            result,
            Err(InterpreterError::Closed | InterpreterError::Io(_))
        ) {
            warn!("Python process lost during run {}: {:?}", id, result);
            self.ready.store(false, Ordering::SeqCst);
            *guard = None;
        }

        result
    }

    fn on_output(&self, callback: OutputCallback) {
        *self
            .output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(callback);
    }
}
