//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values, and carries out the
//! `Effect`s that `update` hands back.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Raining**: the poll timeout is whatever is left of the current rain
//!   tick, and every tick forces a frame.
//! - **No rain**: sleeps up to 500ms, only redraws on events, background
//!   actions, or terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::{RainSettings, ResolvedConfig};
use crate::core::state::App;
use crate::interpreter::{DisabledInterpreter, Interpreter, OutputCallback, PythonInterpreter};
use crate::platform;
use crate::tui::component::EventHandler;
use crate::tui::components::{MatrixRain, PromptBox, PromptEvent, TranscriptViewState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub transcript_view: TranscriptViewState,
    pub prompt: PromptBox,
    /// `None` when the rain is switched off.
    pub rain: Option<MatrixRain>,
}

impl TuiState {
    pub fn new(rain: &RainSettings, (width, height): (u16, u16)) -> Self {
        Self {
            transcript_view: TranscriptViewState::new(),
            prompt: PromptBox::new(),
            rain: rain
                .enabled
                .then(|| MatrixRain::new(rain, width, height)),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

/// Build the interpreter backend a resolved config asks for.
pub fn build_interpreter(config: &ResolvedConfig) -> Arc<dyn Interpreter> {
    match &config.python_program {
        Some(program) => Arc::new(PythonInterpreter::new(program.clone())),
        None => {
            info!("Python disabled by configuration");
            Arc::new(DisabledInterpreter::new())
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let interpreter = build_interpreter(&config);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Could not enable terminal modes: {}", e);
            None
        }
    };

    let size = terminal.size()?;
    let mut app = App::new(
        interpreter.clone(),
        platform::probe_host((size.width, size.height)),
    );
    let mut tui = TuiState::new(&config.rain, (size.width, size.height));

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    interpreter.on_output(forward_output(tx.clone()));
    spawn_load(interpreter.clone(), tx.clone());

    let mut needs_redraw = true; // Force first frame
    let mut last_tick = Instant::now();

    let result = loop {
        if let Some(rain) = tui.rain.as_mut()
            && last_tick.elapsed() >= config.rain.tick
        {
            rain.tick();
            last_tick = Instant::now();
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            if let Err(e) = terminal.draw(|f| ui::draw_ui(f, &app, &mut tui)) {
                break Err(e);
            }
            needs_redraw = false;
        }

        let timeout = if tui.rain.is_some() {
            config.rain.tick.saturating_sub(last_tick.elapsed())
        } else {
            IDLE_POLL
        };

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        let mut pending = match poll_event_timeout(timeout) {
            Ok(event) => event,
            Err(e) => break Err(e),
        };
        while let Some(event) = pending.take() {
            needs_redraw = true;
            if handle_event(event, &mut app, &mut tui, &config, &tx) == Effect::Quit {
                should_quit = true;
                break;
            }
            pending = match poll_event_immediate() {
                Ok(event) => event,
                Err(e) => {
                    warn!("Event read failed: {}", e);
                    None
                }
            };
        }

        // Handle background task actions (load, output, run results)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(effect, &app, &config, &tx) {
                should_quit = true;
            }
        }

        if should_quit {
            break Ok(());
        }
    };

    info!("Shutting down");
    ratatui::restore();
    result
}

/// Route one terminal event. Returns `Effect::Quit` when the loop should stop.
fn handle_event(
    event: TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    config: &ResolvedConfig,
    tx: &mpsc::Sender<Action>,
) -> Effect {
    match event {
        TuiEvent::Quit => update(app, Action::Quit),
        TuiEvent::Resize(width, height) => {
            if let Some(rain) = tui.rain.as_mut() {
                rain.resize(width, height);
            }
            update(app, Action::Resize { width, height })
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.transcript_view.handle_event(&event);
            Effect::None
        }
        _ => {
            // Edits only land while an input line is open
            let Some(affordance) = app.active_affordance() else {
                return Effect::None;
            };
            match tui.prompt.handle_event(&event) {
                Some(PromptEvent::Submit(input)) => {
                    tui.transcript_view.pin_to_bottom();
                    let effect = update(
                        app,
                        Action::Commit {
                            affordance: affordance.id,
                            input,
                        },
                    );
                    if apply_effect(effect, app, config, tx) {
                        Effect::Quit
                    } else {
                        Effect::None
                    }
                }
                Some(PromptEvent::ContentChanged) | None => Effect::None,
            }
        }
    }
}

/// Carry out what `update` asked for. Returns true to quit.
fn apply_effect(
    effect: Effect,
    app: &App,
    config: &ResolvedConfig,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::RunSource(source) => {
            spawn_run(app.interpreter.clone(), source, tx.clone());
            false
        }
        Effect::LoadInterpreter => {
            spawn_load(app.interpreter.clone(), tx.clone());
            false
        }
        Effect::OpenUrl(url) => {
            if config.open_links {
                platform::open_url(&url);
            } else {
                debug!("Link opening disabled, not opening {}", url);
            }
            false
        }
    }
}

/// Printed lines go through the same channel as `RunFinished`, so they land
/// in the transcript before the run's result.
fn forward_output(tx: mpsc::Sender<Action>) -> OutputCallback {
    Arc::new(move |line: String| {
        if tx.send(Action::InterpreterOutput(line)).is_err() {
            warn!("Failed to forward interpreter output: receiver dropped");
        }
    })
}

fn spawn_load(interpreter: Arc<dyn Interpreter>, tx: mpsc::Sender<Action>) {
    info!("Loading interpreter '{}' in the background", interpreter.name());
    tokio::spawn(async move {
        let result = interpreter.load().await;
        if tx.send(Action::InterpreterLoaded(result)).is_err() {
            warn!("Failed to send InterpreterLoaded: receiver dropped");
        }
    });
}

fn spawn_run(interpreter: Arc<dyn Interpreter>, source: String, tx: mpsc::Sender<Action>) {
    debug!("Spawning interpreter run ({} bytes)", source.len());
    tokio::spawn(async move {
        let result = interpreter.run(&source).await;
        if let Err(e) = &result {
            debug!("Interpreter run failed: {}", e);
        }
        if tx.send(Action::RunFinished(result)).is_err() {
            warn!("Failed to send RunFinished: receiver dropped");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DEFAULT_LOG_LEVEL, RainSettings};
    use crate::core::state::Mode;
    use crate::core::transcript::{LineStyle, OutputLine};
    use crate::test_support::{ScriptedInterpreter, test_app, test_app_with};
    use std::path::PathBuf;

    fn config() -> ResolvedConfig {
        ResolvedConfig {
            python_program: None,
            rain: RainSettings {
                enabled: false,
                tick: Duration::from_millis(50),
                charset: "01".to_string(),
                color: "#800080".to_string(),
            },
            open_links: false,
            log_file: PathBuf::from("mango.log"),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    fn type_line(
        text: &str,
        app: &mut App,
        tui: &mut TuiState,
        tx: &mpsc::Sender<Action>,
    ) -> Effect {
        for c in text.chars() {
            handle_event(TuiEvent::InputChar(c), app, tui, &config(), tx);
        }
        handle_event(TuiEvent::Submit, app, tui, &config(), tx)
    }

    #[test]
    fn test_build_interpreter_respects_config() {
        let mut resolved = config();
        assert_eq!(build_interpreter(&resolved).name(), "disabled");

        resolved.python_program = Some("python3".to_string());
        assert_eq!(build_interpreter(&resolved).name(), "python");
    }

    #[test]
    fn test_typed_command_reaches_transcript() {
        let mut app = test_app();
        let mut tui = TuiState::new(&config().rain, (80, 24));
        let (tx, _rx) = mpsc::channel();

        assert_eq!(type_line("whoami", &mut app, &mut tui, &tx), Effect::None);
        assert_eq!(
            app.transcript.last_line(),
            Some(&OutputLine::new("mang0", LineStyle::Normal))
        );
        assert!(tui.prompt.buffer.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = test_app();
        let mut tui = TuiState::new(&config().rain, (80, 24));
        let (tx, _rx) = mpsc::channel();
        assert_eq!(
            handle_event(TuiEvent::Quit, &mut app, &mut tui, &config(), &tx),
            Effect::Quit
        );
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut app = test_app();
        let mut tui = TuiState::new(&config().rain, (80, 24));
        let (tx, _rx) = mpsc::channel();
        handle_event(TuiEvent::Resize(132, 43), &mut app, &mut tui, &config(), &tx);
        assert_eq!(app.host.viewport, (132, 43));
    }

    #[tokio::test]
    async fn test_run_result_comes_back_over_channel() {
        let interpreter = ScriptedInterpreter::ready();
        interpreter.print_on_run(&["hi"]);
        interpreter.push_result(Ok(Some("2".to_string())));
        let (mut app, handle) = test_app_with(interpreter);
        let mut tui = TuiState::new(&config().rain, (80, 24));
        let (tx, rx) = mpsc::channel();
        handle.on_output(forward_output(tx.clone()));

        type_line("py", &mut app, &mut tui, &tx);
        type_line("print('hi'); 1+1", &mut app, &mut tui, &tx);
        assert!(app.active_affordance().is_none());

        // Typing while the run is pending goes nowhere
        handle_event(TuiEvent::InputChar('x'), &mut app, &mut tui, &config(), &tx);
        assert!(tui.prompt.buffer.is_empty());

        let output = tokio::task::spawn_blocking(move || {
            let first = rx.recv().unwrap();
            let second = rx.recv().unwrap();
            (first, second)
        })
        .await
        .unwrap();
        assert_eq!(output.0, Action::InterpreterOutput("hi".to_string()));
        assert_eq!(output.1, Action::RunFinished(Ok(Some("2".to_string()))));

        update(&mut app, output.0);
        update(&mut app, output.1);
        assert_eq!(app.transcript.last_line().unwrap().text, "2");
        assert_eq!(app.active_affordance().unwrap().mode, Mode::Interpreter);
        assert_eq!(handle.sources(), vec!["print('hi'); 1+1".to_string()]);
    }
}
