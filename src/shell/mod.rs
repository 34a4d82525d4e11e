//! Ampsh - Shell Module
//!
//! The Shell reads command lines, runs them in the mode their control words
//! ask for and reclaims background jobs once every command cycle.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::{debug, error, info};

use crate::core::job::DEFAULT_JOB_CAPACITY;
use crate::core::lexer;
use crate::core::parser::CommandGroup;
use crate::editor::Editor;
use crate::errors::{Result, ResultExt};

use self::execute_command::run_command_group;
use self::interrupt::Interrupt;
use self::job_control::JobManager;

mod builtins;
pub mod execute_command;
pub mod interrupt;
pub mod job_control;

const PROMPT: &str = "$ ";

/// Ampsh Shell
pub struct Shell {
    /// Present when commands come from the terminal.
    editor: Option<Editor>,
    job_manager: JobManager,
    interrupt: Interrupt,
    config: ShellConfig,
    /// Set by `exit`; no further commands are run.
    has_exited: bool,
}

impl Shell {
    /// Constructs a new Shell and installs its Ctrl-C handler.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        let editor = if config.display_prompt {
            Some(Editor::with_capacity(config.command_history_capacity))
        } else {
            None
        };

        let shell = Shell {
            editor,
            job_manager: JobManager::new(config.job_capacity),
            interrupt: Interrupt::install()?,
            config,
            has_exited: false,
        };

        info!("ampsh started up with {:?}", config);
        Ok(shell)
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// `true` once `exit` has run.
    pub fn has_exited(&self) -> bool {
        self.has_exited
    }

    /// Returns `true` if the shell has background jobs.
    pub fn has_background_jobs(&self) -> bool {
        self.job_manager.has_jobs()
    }

    /// Runs one command cycle for `input`.
    ///
    /// The interrupt flag is cleared first; finished background jobs are
    /// reclaimed last, even when the line was blank or failed.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        if self.has_exited {
            return Ok(());
        }

        self.interrupt.reset();
        let result = self.execute_line(input);
        if !self.has_exited {
            self.job_manager.do_job_notification();
        }

        result
    }

    fn execute_line(&mut self, input: &str) -> Result<()> {
        let argv = lexer::tokenize(input);
        // skip if empty
        if argv.is_empty() {
            return Ok(());
        }

        if builtins::is_exit(&argv) {
            return builtins::run(self, &argv);
        }

        let command_group = CommandGroup::parse(argv);
        run_command_group(self, &command_group)
    }

    /// Runs commands from a script, one per line, until `exit` or the end
    /// of the file.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let f = File::open(path).chain_err(|| format!("cannot open {}", path.display()))?;
        self.execute_lines(BufReader::new(f))
    }

    /// Runs every line of `reader` as its own command cycle.
    pub fn execute_lines<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line.chain_err(|| "failed to read command")?;
            let temp_result = self.execute_command_string(&line);
            log_if_err!(temp_result, "execute_command_string");
            if self.has_exited {
                break;
            }
        }

        Ok(())
    }

    /// Runs commands read from the terminal until `exit` or end of input.
    pub fn execute_from_stdin(&mut self) -> Result<()> {
        if self.editor.is_none() {
            let stdin = io::stdin();
            return self.execute_lines(stdin.lock());
        }

        while !self.has_exited {
            let input = match self.prompt() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("prompt: {}", e);
                    return Err(e);
                }
            };

            let temp_result = self.execute_command_string(&input);
            log_if_err!(temp_result, "execute_command_string");
        }

        Ok(())
    }

    /// Prints the prompt and reads a line, adding it to the history.
    /// Returns `None` when end of file is reached.
    fn prompt(&mut self) -> Result<Option<String>> {
        let editor = match self.editor {
            Some(ref mut editor) => editor,
            None => return Ok(None),
        };

        let line = editor.readline(PROMPT)?;
        if let Some(ref line) = line {
            if !line.trim().is_empty() {
                editor.add_history_entry(line);
            }
        }

        Ok(line)
    }

    /// Terminates and reclaims every background job. No more commands run
    /// afterwards.
    pub fn exit(&mut self) {
        if self.has_exited {
            return;
        }

        debug!("exiting with {} background jobs", self.job_manager.background_jobs().len());
        self.job_manager.shutdown();
        self.has_exited = true;
        info!("ampsh has shut down");
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}\n{:?} jobs\n{:?}", self.config, self.job_manager, self.editor)
    }
}

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Number of slots in each job table. Jobs beyond it run untracked.
    job_capacity: usize,

    /// Determines if commands are read through the line editor with a prompt.
    display_prompt: bool,

    /// Number of entries to keep in the in-memory command history
    command_history_capacity: usize,
}

impl ShellConfig {
    /// Creates an interactive shell, e.g. prompt, line editing
    ///
    /// # Complete List
    /// - The `$ ` prompt is displayed
    /// - Lines are read through the line editor with an in-memory history
    pub fn interactive(command_history_capacity: usize) -> ShellConfig {
        ShellConfig {
            display_prompt: true,
            command_history_capacity,
            ..Default::default()
        }
    }

    /// Creates a noninteractive shell, e.g. running a script
    ///
    /// # Complete List
    /// - No prompt is displayed
    /// - Lines are read as they are, without history
    pub fn noninteractive() -> ShellConfig {
        Default::default()
    }

    /// Sets the number of slots in the background and parallel job tables.
    pub fn with_job_capacity(self, job_capacity: usize) -> ShellConfig {
        ShellConfig {
            job_capacity,
            ..self
        }
    }

    pub fn job_capacity(&self) -> usize {
        self.job_capacity
    }
}

impl Default for ShellConfig {
    fn default() -> ShellConfig {
        ShellConfig {
            job_capacity: DEFAULT_JOB_CAPACITY,
            display_prompt: false,
            command_history_capacity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::{Duration, Instant};

    use super::*;

    fn noninteractive_shell() -> Shell {
        Shell::new(ShellConfig::noninteractive()).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = ShellConfig::noninteractive();
        assert_eq!(config.job_capacity(), DEFAULT_JOB_CAPACITY);
        assert!(!config.display_prompt);

        let config = ShellConfig::interactive(10).with_job_capacity(3);
        assert_eq!(config.job_capacity(), 3);
        assert!(config.display_prompt);
        assert_eq!(config.command_history_capacity, 10);
    }

    #[test]
    fn test_blank_line_is_skipped() {
        let mut shell = noninteractive_shell();
        assert!(shell.execute_command_string("").is_ok());
        assert!(shell.execute_command_string(" \t ").is_ok());
        assert!(!shell.has_exited());
    }

    #[test]
    fn test_incorrect_command_is_recovered() {
        let mut shell = noninteractive_shell();
        assert!(shell.execute_command_string("ampsh-no-such-program -x").is_ok());
        assert!(shell.execute_command_string("cd").is_ok());
        assert!(shell.execute_command_string("cd a b").is_ok());
        assert!(shell.execute_command_string("cd /ampsh/no/such/dir").is_ok());
        assert!(!shell.has_exited());
    }

    #[test]
    fn test_background_job_does_not_block() {
        let mut shell = noninteractive_shell();
        let start = Instant::now();
        shell.execute_command_string("sleep 30 &").unwrap();
        assert!(shell.has_background_jobs());
        assert!(start.elapsed() < Duration::from_secs(10));

        shell.execute_command_string("exit").unwrap();
        assert!(shell.has_exited());
        assert!(!shell.has_background_jobs());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_exit_ignores_arguments_and_stops_the_shell() {
        let mut shell = noninteractive_shell();
        shell.execute_command_string("exit 3 &&& junk").unwrap();
        assert!(shell.has_exited());

        shell.execute_command_string("sleep 30 &").unwrap();
        assert!(!shell.has_background_jobs());
    }

    #[test]
    fn test_exit_inside_chain_is_not_a_builtin() {
        let mut shell = noninteractive_shell();
        shell.execute_command_string("true && exit").unwrap();
        assert!(!shell.has_exited());
    }

    #[test]
    fn test_background_capacity_is_configurable() {
        let config = ShellConfig::noninteractive().with_job_capacity(1);
        let mut shell = Shell::new(config).unwrap();
        shell.execute_command_string("sleep 30 &").unwrap();
        shell.execute_command_string("true &").unwrap();
        assert_eq!(shell.job_manager.background_jobs().len(), 1);
        shell.exit();
    }

    #[test]
    fn test_execute_lines_stops_at_exit() {
        let mut shell = noninteractive_shell();
        let script = "true\n\nexit\nsleep 30 &\n";
        shell.execute_lines(script.as_bytes()).unwrap();
        assert!(shell.has_exited());
        assert!(!shell.has_background_jobs());
    }

    #[test]
    fn test_missing_script_is_an_error() {
        let mut shell = noninteractive_shell();
        let path = env::temp_dir().join("ampsh-no-such-script");
        assert!(shell.execute_commands_from_file(path).is_err());
    }
}
