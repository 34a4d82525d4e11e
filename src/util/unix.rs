use log::debug;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{self, Signal};
use nix::unistd::{self, Pid};

use crate::errors::Result;

pub fn isatty() -> bool {
    let temp_result = unistd::isatty(libc::STDIN_FILENO);
    log_if_err!(temp_result, "unistd::isatty");
    temp_result.unwrap_or(false)
}

/// Asks `pid` to terminate with SIGTERM so its own handlers get to run.
///
/// A process that has already exited is not an error.
pub fn terminate(pid: Pid) -> Result<()> {
    debug!("sending SIGTERM to {}", pid);
    match signal::kill(pid, Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            debug!("{} already exited", pid);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
