//! glb-anim-rs library
//!
//! Command definitions and output helpers for the glb-anim-rs CLI.

pub mod cli;
pub mod commands;
pub mod utils;
