//! Bookkeeping for launched processes: the background job table, the reaper
//! that runs after every command cycle and the waits used by foreground jobs.

use std::fmt;

use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::core::job::JobSlotTable;
use crate::errors::{ErrorKind, Result};
use crate::shell::interrupt::Interrupt;
use crate::util::unix;

pub const BACKGROUND_FINISHED_MESSAGE: &str = "Shell: Background process finished";
pub const TOO_MANY_JOBS_MESSAGE: &str = "Shell: Too many jobs, process not tracked";

/// Owns the background job table.
pub struct JobManager {
    background: JobSlotTable,
}

impl JobManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            background: JobSlotTable::new(capacity),
        }
    }

    pub fn has_jobs(&self) -> bool {
        !self.background.is_empty()
    }

    pub fn background_jobs(&self) -> &JobSlotTable {
        &self.background
    }

    /// Starts tracking a detached process. A full table leaves it untracked.
    pub fn add_background_job(&mut self, pid: Pid) {
        track(&mut self.background, pid);
    }

    /// Reclaims background jobs that have finished, without blocking, and
    /// tells the user about each one.
    ///
    /// Returns the number of jobs reclaimed.
    pub fn do_job_notification(&mut self) -> usize {
        let mut reclaimed = 0;
        let jobs: Vec<(usize, Pid)> = self.background.iter().collect();
        for (slot, pid) in jobs {
            match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => (),
                Ok(status) => {
                    debug!("background job {} finished: {:?}", pid, status);
                    self.background.clear(slot);
                    println!("{}", BACKGROUND_FINISHED_MESSAGE);
                    reclaimed += 1;
                }
                Err(Errno::ECHILD) => {
                    warn!("background job {} is not a child of the shell", pid);
                    self.background.clear(slot);
                }
                Err(e) => warn!("failed to poll background job {}: {}", pid, e),
            }
        }

        reclaimed
    }

    /// Terminates every background job and waits for each of them.
    pub fn shutdown(&mut self) {
        let jobs: Vec<(usize, Pid)> = self.background.iter().collect();
        info!("shutting down {} background jobs", jobs.len());
        for (slot, pid) in jobs {
            log_if_err!(unix::terminate(pid), "failed to terminate {}", pid);
            log_if_err!(wait_uninterrupted(pid), "failed to wait for {}", pid);
            self.background.clear(slot);
        }
    }
}

impl fmt::Debug for JobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background: {:?}", self.background)
    }
}

/// Inserts `pid` into `table`, warning the user when the table is full.
pub fn track(table: &mut JobSlotTable, pid: Pid) -> Option<usize> {
    match table.insert(pid) {
        Ok(slot) => Some(slot),
        Err(e) => {
            if let ErrorKind::JobTableFull(capacity) = *e.kind() {
                warn!("{} is not tracked: all {} slots are in use", pid, capacity);
            }
            println!("{}", TOO_MANY_JOBS_MESSAGE);
            None
        }
    }
}

/// Blocks until `pid` exits.
///
/// If an interrupt has been requested, before or during the wait, `pid` is
/// sent SIGTERM once and the wait resumes until the process is gone.
pub fn wait_for_process(pid: Pid, interrupt: &Interrupt) -> Result<WaitStatus> {
    let mut terminated = false;
    loop {
        if interrupt.is_requested() && !terminated {
            unix::terminate(pid)?;
            terminated = true;
        }

        match wait::waitpid(pid, None) {
            Ok(status) => {
                debug!("{} finished: {:?}", pid, status);
                return Ok(status);
            }
            Err(Errno::EINTR) => debug!("wait for {} interrupted", pid),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Blocks until `pid` exits, ignoring interrupts.
fn wait_uninterrupted(pid: Pid) -> Result<WaitStatus> {
    loop {
        match wait::waitpid(pid, None) {
            Err(Errno::EINTR) => continue,
            result => return Ok(result?),
        }
    }
}

/// Sends SIGTERM to every process in `table`.
pub fn terminate_all(table: &JobSlotTable) {
    for (_, pid) in table.iter() {
        log_if_err!(unix::terminate(pid), "failed to terminate {}", pid);
    }
}

/// Waits for every process in `table` and empties it.
///
/// Processes that already finished are collected first, in any order; then
/// the wait blocks on the lowest remaining slot. An interrupt requested
/// while reaping terminates every process still in the table.
pub fn reap_all(table: &mut JobSlotTable, interrupt: &Interrupt) -> Result<()> {
    let mut terminated = false;
    while !table.is_empty() {
        if interrupt.is_requested() && !terminated {
            terminate_all(table);
            terminated = true;
        }

        let jobs: Vec<(usize, Pid)> = table.iter().collect();
        for &(slot, pid) in &jobs {
            match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::EINTR) => (),
                Ok(status) => {
                    debug!("{} finished: {:?}", pid, status);
                    table.clear(slot);
                }
                Err(e) => {
                    warn!("failed to poll {}: {}", pid, e);
                    table.clear(slot);
                }
            }
        }

        let (slot, pid) = match table.iter().next() {
            Some(job) => job,
            None => break,
        };
        match wait::waitpid(pid, None) {
            Ok(status) => {
                debug!("{} finished: {:?}", pid, status);
                table.clear(slot);
            }
            Err(Errno::EINTR) => debug!("wait for {} interrupted", pid),
            Err(e) => {
                warn!("failed to wait for {}: {}", pid, e);
                table.clear(slot);
            }
        }
    }

    Ok(())
}
