//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

use error_chain::error_chain;
use nix::errno::Errno;

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Nix(::nix::Error);
        Readline(::rustyline::error::ReadlineError);
    }

    errors {
        IncorrectCommand(command: String) {
            description("incorrect command")
            display("{}: incorrect command", command)
        }
        ChangeDirectory(path: String, errno: Errno) {
            description("failed to change directory")
            display("cd: {}", errno.desc())
        }
        JobTableFull(capacity: usize) {
            description("job table is full")
            display("job table is full ({} slots)", capacity)
        }
    }
}
