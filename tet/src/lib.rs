//! # Tet - a tiny, embeddable test assertion and reporting engine
//!
//! Tet lets a program check itself: declare nested, labeled groups of checks,
//! evaluate assertions inside them, and get a compact failure report when the
//! run ends. There is no discovery, no test attribute and no parallel runner.
//! A suite is a closure taking a [`Session`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//! use tet::{eyre, Expect};
//!
//! fn main() -> eyre::Result<ExitCode> {
//!     let summary = tet::App::new().run(|s| {
//!         s.group("parse", |s| {
//!             s.assert("port", |_| "8080".parse::<u16>().map(|port| port == 8080));
//!             s.err("garbage", Expect::of::<std::num::ParseIntError>(), |_| {
//!                 "garbage".parse::<u16>()
//!             });
//!         });
//!     })?;
//!     Ok(tet::exit_code(&summary))
//! }
//! ```
//!
//! While the suite runs, every check prints one mark: `.` for a pass, `F` for a
//! failure, `?` for an error of the wrong type and `!` for an unexpected error.
//! At the end the counts are printed, followed by every failure under its label
//! path:
//!
//! ```text
//! ..F!
//! 4 tests, 2 fails, 1 error
//! Failed tests:
//!   - parse > port
//!   - parse > config
//!       ERROR: (panic) config file is missing
//!           at src/main.rs:14:13
//! ```
//!
//! ## Key Features
//!
//! - **Nested Groups**: every event is attributed to the labels of its enclosing groups
//! - **Errors Are Contained**: a panic or `Err` in a group is recorded, not propagated
//! - **Typed Error Checks**: `err` matches the raised error or anything in its source chain
//! - **Misuse Is Reported**: nested assertions and empty groups show up as failures
//! - **Trimmed Backtraces**: frames of tet and the standard library are left out
//!
//! ## Error Types
//!
//! Assertion bodies may return `bool`, `Option<T>` or `Result<T, E>` for any
//! `E: std::error::Error + Send + Sync + 'static`. An `Err` counts as raised, so
//! bodies can use `?`.

mod app;

// Re-export error handling crates for user convenience
pub use eyre;

pub use app::{App, LOG_ENV};

// Re-export core functionality
pub use tet_core::{
    assertion::{Raises, Truthy},
    config::{get_tet_config, BacktraceMode, ColorSetting, Config},
    error::{Error, Result},
    event::{Counters, Event, EventKind, Failure, Summary},
    label::{Label, LabelPath},
    raised::{Expect, Message, Raised},
    reporter::{write_report, DotReporter, NullReporter, Reporter},
    session::{Session, GROUP_ERROR},
    tree::{Node, NodeId, NodeKind, ResultTree},
};

/// Process exit code for a finished run: success only if nothing failed.
pub fn exit_code(summary: &Summary) -> std::process::ExitCode {
    if summary.passed() {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    }
}
