//! # Transcript
//!
//! The terminal's output log. Lines are appended, never edited, and only
//! ever removed all at once by `clear`.
//!
//! A committed prompt stays in the log too (the input line you typed into is
//! frozen in place), so the transcript holds two kinds of entries:
//!
//! ```text
//! Transcript
//! ├── Prompt { mode: Shell, input: "whoami" }
//! ├── Line   { text: "mang0", style: Normal }
//! ├── Prompt { mode: Shell, input: "py" }
//! └── Line   { text: "Python interactive mode ...", style: Normal }
//! ```

use super::state::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Normal,
    /// Echo of a line sent to the interpreter (`>>> 1+1`).
    PythonEcho,
    Error,
    /// A URL the user can follow.
    Link,
}

/// One line of output. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub style: LineStyle,
}

impl OutputLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// An input line that has been committed and can no longer be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetiredPrompt {
    pub mode: Mode,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Prompt(RetiredPrompt),
    Line(OutputLine),
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    /// Bumped by every `clear`, so render caches can tell "cleared and
    /// refilled" apart from "grew".
    generation: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` as one output line.
    pub fn append(&mut self, text: impl Into<String>, style: LineStyle) {
        self.append_line(OutputLine::new(text, style));
    }

    pub fn append_line(&mut self, line: OutputLine) {
        self.entries.push(Entry::Line(line));
    }

    pub fn retire_prompt(&mut self, mode: Mode, input: impl Into<String>) {
        self.entries.push(Entry::Prompt(RetiredPrompt {
            mode,
            input: input.into(),
        }));
    }

    /// Remove everything. Fine to call on an empty log.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Output lines only, skipping retired prompts.
    pub fn lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Line(line) => Some(line),
            Entry::Prompt(_) => None,
        })
    }

    pub fn last_line(&self) -> Option<&OutputLine> {
        self.lines().last()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut transcript = Transcript::new();
        transcript.retire_prompt(Mode::Shell, "ls");
        transcript.append("one", LineStyle::Normal);
        transcript.append("two", LineStyle::Error);

        assert_eq!(transcript.len(), 3);
        let texts: Vec<&str> = transcript.lines().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(transcript.last_line().unwrap().style, LineStyle::Error);
        assert!(matches!(
            &transcript.entries()[0],
            Entry::Prompt(RetiredPrompt { mode: Mode::Shell, input }) if input == "ls"
        ));
    }

    #[test]
    fn test_clear_empties_and_bumps_generation() {
        let mut transcript = Transcript::new();
        transcript.append("hello", LineStyle::Normal);
        assert_eq!(transcript.generation(), 0);

        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.generation(), 1);

        // Clearing an empty log is not an error
        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.generation(), 2);
    }
}
