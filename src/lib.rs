//! Symbol navigation for Makefiles.
//!
//! A line-oriented scanner finds targets and variables, a resolver maps a
//! cursor position to a name, and a reference scanner finds every usage of
//! that name. Hover text, completion, lint checks and workspace-wide search
//! are built on those three pieces.

pub mod commands;
pub mod completion;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hover;
pub mod lint;
pub mod logger;
pub mod parser;
pub mod references;
pub mod resolver;
pub mod types;
pub mod watch;
pub mod workspace;
