//! # marks CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/marks/src/cli/)                          │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - logging + context wiring + dispatch (commands.rs)        │
//! │  - terminal rendering (render.rs)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/marksapp/src/commands/*)             │
//! │  - Business logic, returns structured `CmdResult` values    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in `marksapp` is UI agnostic. The CLI layer is responsible for
//! argument parsing, logging setup, context initialization, dispatch and
//! rendering. Errors bubble up as `anyhow::Error` and are printed here.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
