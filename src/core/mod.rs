//! # Core Session Logic
//!
//! Everything MangoOS knows about commands, modes and the transcript.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (session)      │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌─────────────┐
//!             │    TUI     │          │ Interpreter │
//!             │  Adapter   │          │  (python3)  │
//!             │ (ratatui)  │          │             │
//!             └────────────┘          └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, mode and input affordance
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`commands`]: The fixed command table
//! - [`transcript`]: Output lines and retired prompts
//! - [`host`]: Hardware facts shown by `neofetch` and the side panel
//! - [`config`]: `config.toml` loading and precedence

pub mod action;
pub mod commands;
pub mod config;
pub mod host;
pub mod state;
pub mod transcript;
