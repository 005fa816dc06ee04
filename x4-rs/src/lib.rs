//! x4-rs library
//!
//! Command implementations and helpers behind the `x4-rs` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod utils;
