//! minish-kernel: the execution core of minish.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes a command line using logos
//! - **Parser**: Builds a `Pipeline` of command stages from tokens
//! - **Jobs**: The job table tracking every launched process group
//! - **Pipeline**: Fork/exec launcher that wires pipes, redirections, and
//!   process groups
//! - **Terminal**: Controlling-terminal ownership handoff around foreground
//!   jobs
//! - **Signals**: Asynchronous reconciliation of child state changes and
//!   forwarding of keyboard signals to the foreground group
//! - **Builtins**: `cd`, `exit`, `jobs`, `fg`, `bg`
//!
//! The [`Shell`] type ties these together behind a single `execute` entry
//! point; the REPL crate is a thin front end over it.

pub mod ast;
pub mod builtins;
pub mod error;
pub mod jobs;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod result;
pub mod shell;
pub mod signals;
pub mod terminal;

pub use ast::{CommandStage, OutputRedirect, Pipeline};
pub use error::ShellError;
pub use jobs::{JobId, JobInfo, JobState, JobTable};
pub use result::ExecResult;
pub use shell::Shell;
pub use terminal::Terminal;
