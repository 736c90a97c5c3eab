//! Protonion Jira CLI Library
//!
//! Command-line interface definitions, logging setup and the `doctor` and
//! `env` commands. The binary in `main.rs` wires them together.

/// Command-line interface definitions and argument parsing
pub mod cli;
/// Health report command
pub mod doctor;
/// Environment display command
pub mod env;
/// Exit codes used by the CLI application
pub mod exit_codes;
/// Subscriber setup for stderr and the MCP log file
pub mod logging;
