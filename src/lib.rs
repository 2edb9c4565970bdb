//! Mango library exports for testing

pub mod core;
pub mod interpreter;
pub mod platform;
pub mod tui;

#[cfg(test)]
pub mod test_support;
