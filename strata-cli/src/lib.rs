//! Strata CLI - command-line interface for the Strata migration runner.
//!
//! This crate provides the `strata` binary: applying manifest-declared
//! migrations in order, verifying the resulting schema, and inspecting the
//! declared migration list.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
