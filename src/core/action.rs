//! # Actions
//!
//! Everything that can happen in Mango becomes an `Action`.
//! User presses Enter? That's `Action::Commit`.
//! Python finishes a line? That's `Action::RunFinished(result)`.
//!
//! The `update()` function applies an action to the state and returns an
//! `Effect` describing the I/O the TUI loop should do next. No side effects
//! here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! ## Dispatch
//!
//! ```text
//!            "py"                         "exit()" (any case)
//!   Shell ──────────────▶ Interpreter ──────────────────────▶ Shell
//!     │ "clear" / table / not found        │ not ready → "Python is still loading..."
//!     └──▶ Shell                           └──▶ ready → Effect::RunSource, wait for RunFinished
//! ```

use log::{debug, info, warn};

use crate::core::commands::{CommandContext, CommandEntry};
use crate::core::state::{App, InterpreterStatus, Mode};
use crate::core::transcript::LineStyle;
use crate::interpreter::InterpreterError;

pub const PYTHON_ENTERED: &str = "Python interactive mode (type 'exit' to quit)";
pub const PYTHON_EXITED: &str = "Exited Python interactive mode";
pub const PYTHON_LOADING: &str = "Python is still loading...";
pub const NOT_FOUND_PREFIX: &str = "Command not found: ";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user pressed Enter on the affordance with this id.
    Commit { affordance: u64, input: String },
    /// Background load finished.
    InterpreterLoaded(Result<String, InterpreterError>),
    /// Text the interpreter printed on its own.
    InterpreterOutput(String),
    /// The pending run resolved.
    RunFinished(Result<Option<String>, InterpreterError>),
    Resize { width: u16, height: u16 },
    Quit,
}

/// I/O the caller should perform after `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Hand this source to the interpreter and report back with `RunFinished`.
    RunSource(String),
    /// Start the interpreter again in the background.
    LoadInterpreter,
    OpenUrl(String),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Commit { affordance, input } => commit(app, affordance, &input),
        Action::InterpreterLoaded(Ok(banner)) => {
            info!("Interpreter ready: {}", banner);
            app.interpreter_status = InterpreterStatus::Ready(banner);
            Effect::None
        }
        Action::InterpreterLoaded(Err(e)) => {
            warn!("Interpreter failed to load: {}", e);
            app.interpreter_status = InterpreterStatus::Unavailable(e.to_string());
            Effect::None
        }
        Action::InterpreterOutput(text) => {
            app.transcript.append(text, LineStyle::Normal);
            Effect::None
        }
        Action::RunFinished(result) => {
            if app.affordance.is_some() {
                warn!("RunFinished with an affordance already open, ignoring: {:?}", result);
                return Effect::None;
            }
            let mut effect = Effect::None;
            match result {
                Ok(Some(value)) => app.transcript.append(value, LineStyle::Normal),
                Ok(None) => {}
                Err(e) => {
                    if matches!(e, InterpreterError::Closed | InterpreterError::Io(_)) {
                        warn!("Interpreter went away, reloading: {}", e);
                        app.interpreter_status = InterpreterStatus::Loading;
                        effect = Effect::LoadInterpreter;
                    }
                    app.transcript.append(e.to_string(), LineStyle::Error);
                }
            }
            app.open_affordance();
            effect
        }
        Action::Resize { width, height } => {
            app.host.viewport = (width, height);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn commit(app: &mut App, affordance_id: u64, raw: &str) -> Effect {
    let Some(affordance) = app.take_affordance(affordance_id) else {
        debug!("Ignoring commit from retired affordance {}", affordance_id);
        return Effect::None;
    };

    app.transcript.retire_prompt(affordance.mode, raw);
    let input = raw.trim();
    debug!("Dispatching {:?} in {:?} mode", input, affordance.mode);

    match affordance.mode {
        Mode::Shell => dispatch_shell(app, input),
        Mode::Interpreter => dispatch_interpreter(app, input),
    }
}

fn dispatch_shell(app: &mut App, input: &str) -> Effect {
    let mut effect = Effect::None;

    match input {
        "clear" => app.transcript.clear(),
        "py" => {
            info!("Entering Python mode");
            app.mode = Mode::Interpreter;
            app.transcript.append(PYTHON_ENTERED, LineStyle::Normal);
        }
        _ => match app.commands.lookup(input) {
            Some(CommandEntry::Literal(text)) => app.transcript.append(*text, LineStyle::Normal),
            Some(CommandEntry::Action(producer)) => {
                let mut ctx = CommandContext::new(&app.host, &mut app.transcript);
                let output = producer(&mut ctx);
                if let Some(url) = ctx.into_requested_url() {
                    effect = Effect::OpenUrl(url);
                }
                if let Some(text) = output.filter(|text| !text.is_empty()) {
                    app.transcript.append(text, LineStyle::Normal);
                }
            }
            None => app
                .transcript
                .append(format!("{NOT_FOUND_PREFIX}{input}"), LineStyle::Normal),
        },
    }

    app.open_affordance();
    effect
}

fn dispatch_interpreter(app: &mut App, input: &str) -> Effect {
    if input.eq_ignore_ascii_case("exit()") {
        info!("Leaving Python mode");
        app.mode = Mode::Shell;
        app.transcript.append(PYTHON_EXITED, LineStyle::Normal);
        app.open_affordance();
        return Effect::None;
    }

    if !app.interpreter.is_ready() {
        // Dropped, not queued
        app.transcript.append(PYTHON_LOADING, LineStyle::Normal);
        app.open_affordance();
        return Effect::None;
    }

    app.transcript.append(format!(">>> {input}"), LineStyle::PythonEcho);
    // No affordance until RunFinished comes back
    Effect::RunSource(input.to_string())
}
