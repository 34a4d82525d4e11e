//! Parsing and bookkeeping that does not touch the operating system.

pub mod job;
pub mod lexer;
pub mod parser;
