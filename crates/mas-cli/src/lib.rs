//! Command-line front end for multiple association studies.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
pub mod signal;
pub mod summary;
pub mod types;
