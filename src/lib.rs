//! Ampsh - Ampersand Shell
//!
//! A small job executor: every input line runs in the foreground, in the
//! background (`cmd &`), as a sequential chain (`a && b`) or as a parallel
//! fan-out (`a &&& b`).

#![recursion_limit = "1024"]
#![warn(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces
)]

#[macro_use]
mod util;

pub mod core;
mod editor;
pub mod errors;
pub mod shell;

pub use crate::shell::{Shell, ShellConfig};
pub use crate::util::unix::isatty;
