//! Core library for the Crucible code execution engine.
//!
//! Crucible runs untrusted, language-tagged source code by spawning it as
//! an isolated operating-system process and reporting a structured outcome
//! back to the requester. Each request either runs to completion, times
//! out, or fails in one of a small set of classifiable ways.
//!
//! # Architecture Overview
//!
//! One execution flows through a fixed pipeline:
//!
//! - **Working directory management**: a fresh, uniquely named directory is
//!   created per execution under a configured base
//! - **Process launching**: the per-language command runs in that directory
//!   with a fixed environment-variable contract, and the request's stdin
//!   lines are streamed to it
//! - **Timeout supervision**: the engine waits for completion bounded by
//!   the effective timeout plus a grace margin, never blocking forever
//! - **Result classification**: a single-line sentinel file written by the
//!   child is mapped to the matching result variant, together with the exit
//!   code and captured stdout/stderr
//!
//! The [`CodeExecutionEngine`] facade orchestrates the pipeline and
//! implements the [`CodeExecutor`] inbound port. Transport adapters, JSON
//! plumbing and configuration sources live outside this crate.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod errors;
pub mod launcher;
pub mod models;
pub mod supervisor;
pub mod workdir;

pub use config::ExecutorConfig;
pub use engine::{CodeExecutionEngine, CodeExecutor};
pub use errors::ExecutorError;
pub use models::{ExecutionOutcome, ExecutionRequest, ExecutionResult, Language};
