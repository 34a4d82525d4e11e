use std::ffi::CString;

use log::debug;
use nix::libc;
use nix::unistd::{self, ForkResult, Pid};

use crate::core::job::JobSlotTable;
use crate::core::parser::{CommandGroup, RunMode, SubCommand};
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::builtins;
use crate::shell::job_control;
use crate::shell::Shell;

pub const INCORRECT_COMMAND_MESSAGE: &str = "Shell: Incorrect command";
const INCORRECT_COMMAND_LINE: &[u8] = b"Shell: Incorrect command\n";

/// Forks a child that runs `argv` and returns its pid.
///
/// The child inherits the shell's environment and standard streams and
/// resolves the program through `PATH`. If the program cannot be started the
/// child prints the incorrect command notice and exits with status 1, so the
/// caller always gets a process to wait for.
///
/// A detached child is moved into its own process group before the program
/// starts, so signals sent to the terminal's foreground group (Ctrl-C) never
/// reach it.
pub fn spawn_process<S: AsRef<str>>(argv: &[S], detach: bool) -> Result<Pid> {
    let program: &str = match argv.first() {
        Some(program) => program.as_ref(),
        None => return Err(ErrorKind::IncorrectCommand(String::new()).into()),
    };

    // Built before forking; the child only makes async-signal-safe calls.
    let mut args = Vec::with_capacity(argv.len());
    for word in argv {
        let word: &str = word.as_ref();
        match CString::new(word) {
            Ok(arg) => args.push(arg),
            Err(_) => return Err(ErrorKind::IncorrectCommand(program.to_string()).into()),
        }
    }

    match unsafe { unistd::fork() }? {
        ForkResult::Parent { child } => {
            if detach {
                // Also done by the child; whichever runs first wins.
                if let Err(e) = unistd::setpgid(child, child) {
                    debug!("setpgid({}) from the shell: {}", child, e);
                }
            }
            debug!("launched {} ({}, detached: {})", program, child, detach);
            Ok(child)
        }
        ForkResult::Child => exec_child(&args, detach),
    }
}

/// Replaces the forked child with the program in `args`. Never returns.
fn exec_child(args: &[CString], detach: bool) -> ! {
    if detach {
        let _ = unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0));
    }

    let _ = unistd::execvp(&args[0], args);
    let _ = unistd::write(libc::STDOUT_FILENO, INCORRECT_COMMAND_LINE);
    unsafe { libc::_exit(1) }
}

/// Runs every sub-command of `group` according to its run mode.
pub fn run_command_group(shell: &mut Shell, group: &CommandGroup) -> Result<()> {
    debug!("running {} job with {} commands", group.mode, group.commands.len());
    match group.mode {
        RunMode::Foreground => {
            for argv in &group.commands {
                run_foreground(shell, argv)?;
            }
        }
        RunMode::Background => {
            for argv in &group.commands {
                run_background(shell, argv)?;
            }
        }
        RunMode::Sequential => run_sequential(shell, &group.commands)?,
        RunMode::Parallel => run_parallel(shell, &group.commands)?,
    }

    Ok(())
}

/// Launches `argv` and waits for it.
fn run_foreground(shell: &mut Shell, argv: &SubCommand) -> Result<()> {
    if builtins::is_builtin(argv) {
        return report(builtins::run(shell, argv));
    }

    if let Some(pid) = launch(argv, false)? {
        let status = job_control::wait_for_process(pid, &shell.interrupt)?;
        debug!("foreground job {} finished: {:?}", pid, status);
    }

    Ok(())
}

/// Launches `argv` detached and hands it to the job manager.
fn run_background(shell: &mut Shell, argv: &SubCommand) -> Result<()> {
    if builtins::is_builtin(argv) {
        return report(builtins::run(shell, argv));
    }

    if let Some(pid) = launch(argv, true)? {
        shell.job_manager.add_background_job(pid);
    }

    Ok(())
}

/// Runs each command to completion before starting the next one.
///
/// Exit statuses never stop the chain; an interrupt does.
fn run_sequential(shell: &mut Shell, commands: &[SubCommand]) -> Result<()> {
    for argv in commands {
        if shell.interrupt.is_requested() {
            debug!("sequential chain interrupted");
            break;
        }
        run_foreground(shell, argv)?;
    }

    Ok(())
}

/// Starts every command, then waits for all of them.
fn run_parallel(shell: &mut Shell, commands: &[SubCommand]) -> Result<()> {
    let mut foreground = JobSlotTable::new(shell.config.job_capacity);
    for argv in commands {
        if shell.interrupt.is_requested() {
            debug!("parallel launch interrupted");
            break;
        }

        if builtins::is_builtin(argv) {
            report(builtins::run(shell, argv))?;
        } else if let Some(pid) = launch(argv, false)? {
            job_control::track(&mut foreground, pid);
        }
    }

    if shell.interrupt.is_requested() {
        debug!("terminating {} parallel jobs", foreground.len());
        job_control::terminate_all(&foreground);
    }

    job_control::reap_all(&mut foreground, &shell.interrupt)
}

/// Launches `argv`, telling the user if the program cannot be started.
fn launch(argv: &SubCommand, detach: bool) -> Result<Option<Pid>> {
    match spawn_process(argv, detach) {
        Ok(pid) => Ok(Some(pid)),
        Err(e) => report(Err(e)).map(|()| None),
    }
}

/// Reports command errors the user can recover from and passes the rest on.
fn report(result: Result<()>) -> Result<()> {
    match result {
        Err(Error(ErrorKind::IncorrectCommand(ref command), _)) => {
            debug!("incorrect command: {:?}", command);
            println!("{}", INCORRECT_COMMAND_MESSAGE);
            Ok(())
        }
        Err(Error(ErrorKind::ChangeDirectory(ref path, errno), _)) => {
            debug!("cd {} failed: {}", path, errno);
            eprintln!("cd: {}", errno.desc());
            Ok(())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use nix::sys::wait::{self, WaitStatus};

    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_spawn_process() {
        let pid = spawn_process(&argv(&["true"]), false).unwrap();
        assert_eq!(wait::waitpid(pid, None).unwrap(), WaitStatus::Exited(pid, 0));
    }

    #[test]
    fn test_spawn_process_passes_arguments() {
        let pid = spawn_process(&argv(&["test", "a", "=", "a"]), false).unwrap();
        assert_eq!(wait::waitpid(pid, None).unwrap(), WaitStatus::Exited(pid, 0));

        let pid = spawn_process(&argv(&["test", "a", "=", "b"]), false).unwrap();
        assert_eq!(wait::waitpid(pid, None).unwrap(), WaitStatus::Exited(pid, 1));
    }

    #[test]
    fn test_spawn_process_command_not_found_exits_with_failure() {
        let pid = spawn_process(&argv(&["ampsh-no-such-program"]), false).unwrap();
        assert_eq!(wait::waitpid(pid, None).unwrap(), WaitStatus::Exited(pid, 1));
    }

    #[test]
    fn test_spawn_process_detached_command_not_found_is_a_process() {
        let pid = spawn_process(&argv(&["ampsh-no-such-program"]), true).unwrap();
        assert_eq!(wait::waitpid(pid, None).unwrap(), WaitStatus::Exited(pid, 1));
    }

    #[test]
    fn test_spawn_process_nul_byte_is_incorrect() {
        let err = spawn_process(&argv(&["ec\0ho", "test"]), false).unwrap_err();
        match *err.kind() {
            ErrorKind::IncorrectCommand(ref command) => assert_eq!(command, "ec\0ho"),
            ref kind => panic!("unexpected error: {}", kind),
        }
    }

    #[test]
    fn test_spawn_process_empty_argv() {
        let empty: Vec<String> = vec![];
        assert!(spawn_process(&empty, false).is_err());
    }

    #[test]
    fn test_spawn_process_detached_has_own_process_group() {
        let pid = spawn_process(&argv(&["sleep", "5"]), true).unwrap();
        assert_eq!(unistd::getpgid(Some(pid)).unwrap(), pid);
        crate::util::unix::terminate(pid).unwrap();
        wait::waitpid(pid, None).unwrap();
    }

    #[test]
    fn test_spawn_process_attached_shares_process_group() {
        let pid = spawn_process(&argv(&["sleep", "5"]), false).unwrap();
        assert_eq!(unistd::getpgid(Some(pid)).unwrap(), unistd::getpgrp());
        crate::util::unix::terminate(pid).unwrap();
        wait::waitpid(pid, None).unwrap();
    }

    #[test]
    fn test_report_recovers_user_errors() {
        let incorrect: Result<()> = Err(ErrorKind::IncorrectCommand("cd".into()).into());
        assert!(report(incorrect).is_ok());

        let io_error: Result<()> = Err(io::Error::new(io::ErrorKind::Other, "boom").into());
        assert!(report(io_error).is_err());
    }
}
