//! Ampsh builtins
//!
//! Commands that only make sense inside the shell's own process and are
//! therefore never launched as children.

use crate::errors::Result;
use crate::shell::Shell;

use self::dirs::Cd;
use self::exit::Exit;

mod dirs;
mod exit;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";

/// Represents an Ampsh builtin command such as cd or exit.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// The help string to display to the user.
    const HELP: &'static str;
    /// The usage string to display to the user.
    fn usage() -> &'static str {
        Self::HELP.lines().next().unwrap_or(Self::NAME)
    }
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T]) -> Result<()>;
}

/// Is `argv` a builtin that runs in the shell in every run mode?
///
/// `exit` is not one of them: it only counts as the first word of a line.
pub fn is_builtin<T: AsRef<str>>(argv: &[T]) -> bool {
    argv.first().map_or(false, |program| program.as_ref() == Cd::NAME)
}

/// Does the line start with `exit`?
pub fn is_exit<T: AsRef<str>>(argv: &[T]) -> bool {
    argv.first().map_or(false, |program| program.as_ref() == Exit::NAME)
}

/// precondition: `is_builtin(argv)` or `is_exit(argv)`.
pub fn run<T: AsRef<str>>(shell: &mut Shell, argv: &[T]) -> Result<()> {
    debug_assert!(is_builtin(argv) || is_exit(argv));
    match argv.split_first() {
        Some((program, args)) => match program.as_ref() {
            CD_NAME => Cd::run(shell, args),
            EXIT_NAME => Exit::run(shell, args),
            _ => unreachable!(),
        },
        None => Ok(()),
    }
}
