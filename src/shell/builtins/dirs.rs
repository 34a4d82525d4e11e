use log::debug;
use nix::unistd;

use crate::errors::{ErrorKind, Result};
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::Shell;

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    const HELP: &'static str = "\
cd: cd dir
    Change the shell's working directory to DIR. Exactly one DIR is required.";

    fn run<T: AsRef<str>>(_shell: &mut Shell, args: &[T]) -> Result<()> {
        let dir = match args {
            [dir] => dir.as_ref(),
            _ => {
                debug!("usage: {}", Self::usage());
                return Err(ErrorKind::IncorrectCommand(Self::NAME.to_string()).into());
            }
        };

        unistd::chdir(dir).map_err(|errno| ErrorKind::ChangeDirectory(dir.to_string(), errno))?;
        debug!("changed directory to {}", dir);
        Ok(())
    }
}
