//! # Tet Core
//!
//! Core functionality for the tet test-assertion engine.
//!
//! This crate provides the building blocks of tet:
//! - The [`Session`] run context with `group`, `assert`, `deny` and `err`
//! - Errors and panics caught at check boundaries ([`Raised`], [`Expect`])
//! - The counters and the result tree of failures
//! - Configuration management
//! - Progress and report rendering
//!
//! ## Architecture (block diagram)
//!
//! ```text
//! +---------------------+      +---------------------+      +---------------------+
//! | group / assert /    | ---> | nesting guard +     | ---> | event recorder      |
//! | deny / err          |      | panic capture       |      | counters            |
//! +---------------------+      +---------------------+      +---------------------+
//!            |                                                  |          |
//!            v                                                  v          v
//! +---------------------+                       +-------------------+  +-------------------+
//! | label stack         | --------------------> | result tree       |  | reporter          |
//! | (scoped frames)     |    lazy label nodes   | failures, errors  |  | marks + report    |
//! +---------------------+                       +-------------------+  +-------------------+
//! ```
//!
//! Most users should use the main `tet` crate rather than importing `tet-core` directly.

pub mod assertion;
mod capture;
pub mod config;
pub mod error;
pub mod event;
mod guard;
pub mod label;
pub mod raised;
pub mod reporter;
pub mod session;
pub mod tree;

pub use assertion::{Raises, Truthy};
pub use config::{get_tet_config, BacktraceMode, ColorSetting, Config};
pub use error::{Error, Result};
pub use event::{Counters, Event, EventKind, Failure, Summary};
pub use label::{Label, LabelPath};
pub use raised::{Expect, Message, Raised};
pub use reporter::{write_report, DotReporter, NullReporter, Reporter};
pub use session::Session;
pub use tree::{Node, NodeId, NodeKind, ResultTree};
