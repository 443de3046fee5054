// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessExecutor` trait the stage runner talks
//!   to, and the production `RealProcessExecutor`. Tests swap in a fake that
//!   records command lines and returns scripted exit codes.
//! - [`process`] spawns one editor process with `tokio::process::Command`,
//!   drains its output into the log and enforces the optional timeout.

pub mod backend;
pub mod process;

pub use backend::{ProcessExecutor, RealProcessExecutor};
pub use process::ProcessExit;
