use std::fmt;

use log::debug;
use rustyline::{
    self,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::Result;

struct EditorHelper(FilenameCompleter);

impl Completer for EditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> ::std::result::Result<(usize, Vec<Pair>), ReadlineError> {
        self.0.complete(line, pos, ctx)
    }
}

impl Hinter for EditorHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for EditorHelper {}

impl Helper for EditorHelper {}

impl Validator for EditorHelper {}

/// Interactive line source: line editing, filename completion and an
/// in-memory history that is never written to disk.
pub struct Editor {
    internal: rustyline::Editor<EditorHelper>,
}

impl Editor {
    pub fn with_capacity(history_capacity: usize) -> Editor {
        let config = Config::builder()
            .max_history_size(history_capacity)
            .history_ignore_space(true)
            .completion_type(CompletionType::Circular)
            .build();

        let mut internal = rustyline::Editor::with_config(config);
        internal.set_helper(Some(EditorHelper(FilenameCompleter::new())));

        Editor { internal }
    }

    /// Reads one line, without its trailing newline.
    ///
    /// Returns `None` at end of input. Ctrl-C at the prompt abandons the
    /// current line and yields an empty one.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.internal.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => {
                debug!("line abandoned at the prompt");
                Ok(Some(String::new()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lines starting with a space and repeats of the previous line are not
    /// recorded.
    pub fn add_history_entry(&mut self, line: &str) {
        if !self.internal.add_history_entry(line) {
            debug!("history entry skipped");
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "history: {} entries", self.internal.history().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_with_capacity() {
        let capacity = 10;
        let editor = Editor::with_capacity(capacity);
        assert!(editor.internal.history().is_empty());
    }

    #[test]
    fn add_history_entry_keeps_capacity() {
        let mut editor = Editor::with_capacity(2);
        for line in &["echo a", "echo b", "echo c"] {
            editor.add_history_entry(line);
        }
        assert_eq!(editor.internal.history().len(), 2);
    }

    #[test]
    fn add_history_entry_duplicate() {
        let mut editor = Editor::with_capacity(2);

        let item = "sleep 1 &";
        editor.add_history_entry(item);
        assert_eq!(editor.internal.history().len(), 1);

        editor.add_history_entry(item);
        assert_eq!(editor.internal.history().len(), 1);
    }

    #[test]
    fn add_history_entry_leading_space_is_ignored() {
        let mut editor = Editor::with_capacity(2);
        editor.add_history_entry(" echo secret");
        assert!(editor.internal.history().is_empty());
    }
}
