use log::debug;

use crate::errors::Result;
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::Shell;

pub struct Exit;

impl BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    const HELP: &'static str = "\
exit: exit
    Terminate every background job, wait for them and leave the shell.
    Arguments are ignored.";

    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T]) -> Result<()> {
        if !args.is_empty() {
            debug!("exit: ignoring {} arguments", args.len());
        }
        shell.exit();
        Ok(())
    }
}
