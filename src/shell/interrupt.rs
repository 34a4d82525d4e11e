//! Ctrl-C handling.
//!
//! The SIGINT handler does nothing but raise a flag and print a line break.
//! Terminating children is left to the checkpoints in `execute_command`,
//! which re-read the flag whenever they are about to wait or launch.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;

use crate::errors::Result;

static INTERRUPT_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigint(_: libc::c_int) {
    INTERRUPT_REQUESTED.store(true, Ordering::SeqCst);
    let _ = unistd::write(libc::STDOUT_FILENO, b"\n");
}

/// Cooperative view of the process-wide interrupt flag.
#[derive(Clone, Copy, Debug)]
pub struct Interrupt {
    flag: &'static AtomicBool,
}

impl Interrupt {
    /// Installs the SIGINT handler.
    ///
    /// The handler runs without `SA_RESTART`: a blocking `waitpid` returns
    /// `EINTR` and the waiter gets to act on the interrupt.
    pub fn install() -> Result<Self> {
        let action = SigAction::new(
            SigHandler::Handler(handle_sigint),
            SaFlags::empty(),
            SigSet::empty(),
        );
        unsafe {
            signal::sigaction(Signal::SIGINT, &action)?;
        }
        debug!("SIGINT handler installed");

        Ok(Self::from_flag(&INTERRUPT_REQUESTED))
    }

    pub(crate) fn from_flag(flag: &'static AtomicBool) -> Self {
        Self { flag }
    }

    /// Back to idle. Only done at the start of a command cycle.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
