use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use log::{debug, error};
use nix::unistd::Pid;
use serde_derive::Deserialize;

use ampsh::errors::Result;
use ampsh::{Shell, ShellConfig};

const COMMAND_HISTORY_CAPACITY: usize = 100;
const LOG_FILE_NAME: &str = ".ampsh_log";

const USAGE: &str = "
ampsh.

Usage:
    ampsh [options]
    ampsh [options] -c <command>
    ampsh [options] <file>
    ampsh (-h | --help)
    ampsh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then commands are read from the first non-option
                        argument command_string.
    --jobs=<n>      Capacity of each job table [default: 64].
    --log=<path>    File to write log to, defaults to ~/.ampsh_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_jobs: usize,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log);
    debug!("{:?}", args);

    if args.flag_version {
        println!("ampsh version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args)
    } else {
        execute_from_stdin(&args)
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("ampsh: {}", e);
        process::exit(1);
    }
}

fn init_logger(path: &Option<String>) {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(log_path) => log_path,
        None => return,
    };

    let pid = Pid::this();
    let log_file = match fern::log_file(&log_path) {
        Ok(log_file) => log_file,
        Err(e) => {
            eprintln!("ampsh: cannot open log file {}: {}", log_path.display(), e);
            return;
        }
    };

    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(log_file)
        .apply();
    if let Err(e) = result {
        eprintln!("ampsh: failed to initialize logging: {}", e);
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn execute_from_command_string_or_file(args: &Args) -> Result<()> {
    let shell_config = ShellConfig::noninteractive().with_job_capacity(args.flag_jobs);
    let mut shell = Shell::new(shell_config)?;

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_lines(command.as_bytes())
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(file_path)
    } else {
        unreachable!();
    };

    shell.exit();
    result
}

fn execute_from_stdin(args: &Args) -> Result<()> {
    let shell_config = if ampsh::isatty() {
        ShellConfig::interactive(COMMAND_HISTORY_CAPACITY)
    } else {
        ShellConfig::noninteractive()
    };
    let mut shell = Shell::new(shell_config.with_job_capacity(args.flag_jobs))?;

    let result = shell.execute_from_stdin();
    shell.exit();
    result
}
