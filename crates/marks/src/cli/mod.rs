//! # CLI Layer
//!
//! The only place in marks that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs a tracing subscriber
//! - Handles argument parsing
//! - Formats output for human consumption

mod commands;
mod render;
mod setup;

pub use commands::run;
