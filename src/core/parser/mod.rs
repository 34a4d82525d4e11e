//! Ampsh Parser
//!
//! The only grammar ampsh knows is made of three control words: a trailing
//! `&` detaches a command, `&&` chains commands one after another and `&&&`
//! starts them all at once.

use std::fmt;

use log::debug;

use crate::core::lexer::ArgumentVector;

pub const BACKGROUND_TOKEN: &str = "&";
pub const SEQUENTIAL_TOKEN: &str = "&&";
pub const PARALLEL_TOKEN: &str = "&&&";

/// One unit of work inside a command line.
pub type SubCommand = ArgumentVector;

/// How the sub-commands of a line are run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
    Foreground,
    Background,
    Sequential,
    Parallel,
}

impl RunMode {
    /// Selects the run mode of `argv`.
    ///
    /// `&&&` wins over `&&`, which wins over `&`. A `&` only detaches the
    /// command when it is the last word; anywhere else it is an ordinary
    /// argument and the command runs in the foreground.
    pub fn classify<S: AsRef<str>>(argv: &[S]) -> RunMode {
        let mut background_position = None;
        let mut sequential = false;
        let mut parallel = false;
        for (i, word) in argv.iter().enumerate() {
            match word.as_ref() {
                BACKGROUND_TOKEN => background_position = Some(i),
                SEQUENTIAL_TOKEN => sequential = true,
                PARALLEL_TOKEN => parallel = true,
                _ => (),
            }
        }

        if parallel {
            RunMode::Parallel
        } else if sequential {
            RunMode::Sequential
        } else if background_position.is_some() && background_position == argv.len().checked_sub(1)
        {
            RunMode::Background
        } else {
            RunMode::Foreground
        }
    }

    /// The word separating sub-commands in chain modes.
    pub fn separator(self) -> Option<&'static str> {
        match self {
            RunMode::Sequential => Some(SEQUENTIAL_TOKEN),
            RunMode::Parallel => Some(PARALLEL_TOKEN),
            RunMode::Foreground | RunMode::Background => None,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RunMode::Foreground => write!(f, "foreground"),
            RunMode::Background => write!(f, "background"),
            RunMode::Sequential => write!(f, "sequential"),
            RunMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Splits `argv` into sub-commands at every `separator`.
///
/// Empty sub-commands (doubled, leading or trailing separators) are dropped.
pub fn split<S: AsRef<str>>(argv: &[S], separator: &str) -> Vec<SubCommand> {
    let mut commands = Vec::new();
    let mut current = SubCommand::new();
    for word in argv {
        if word.as_ref() == separator {
            if !current.is_empty() {
                commands.push(current);
            }
            current = SubCommand::new();
        } else {
            current.push(word.as_ref().to_string());
        }
    }

    if !current.is_empty() {
        commands.push(current);
    }

    commands
}

/// A command line ready to be executed.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandGroup {
    pub mode: RunMode,
    /// Non-empty sub-commands in input order. Foreground and background
    /// groups hold at most one.
    pub commands: Vec<SubCommand>,
}

impl CommandGroup {
    pub fn parse(mut argv: ArgumentVector) -> Self {
        let mode = RunMode::classify(&argv);
        let commands = match mode.separator() {
            Some(separator) => split(&argv, separator),
            None => {
                if mode == RunMode::Background {
                    argv.pop();
                }

                if argv.is_empty() {
                    vec![]
                } else {
                    vec![argv]
                }
            }
        };

        let group = CommandGroup { mode, commands };
        debug!("parsed CommandGroup: {:?}", group);
        group
    }
}
