//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as parameters:
//! - `TitleBar`: Top status bar showing mode and interpreter status
//! - `EntryView`: One transcript entry (retired prompt or output line)
//! - `HardwarePanel`: Resolution / CPU / GPU / memory sidebar
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `PromptBox`: The live input line
//! - `TranscriptView`: Scrollable log with layout caching
//! - `MatrixRain`: Background animation, advanced by the event loop's tick
//!
//! Components receive external data as "props" rather than reaching into
//! `App`, so each one can be rendered against a `TestBackend` on its own:
//!
//! ```rust,ignore
//! title_bar.render(frame, area);            // props set at construction
//! TranscriptView::new(&mut state, &app.transcript, prompt).render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs              (this file)
//! ├── title_bar.rs        (Top status bar)
//! ├── entry.rs            (Single entry renderer + shared prompt styling)
//! ├── transcript_view.rs  (Scrollable transcript container)
//! ├── hardware_panel.rs   (Host facts sidebar)
//! ├── matrix_rain.rs      (Background animation)
//! └── prompt_box/         (Live input line)
//! ```

pub mod entry;
pub mod hardware_panel;
pub mod matrix_rain;
pub mod prompt_box;
mod title_bar;
pub mod transcript_view;

pub use hardware_panel::HardwarePanel;
pub use matrix_rain::MatrixRain;
pub use prompt_box::{PromptBox, PromptEvent};
pub use title_bar::TitleBar;
pub use transcript_view::{TranscriptView, TranscriptViewState};
