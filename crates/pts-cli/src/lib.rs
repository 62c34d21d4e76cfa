//! Shared pieces of the `pts` command-line tool.

pub mod logging;
pub mod render;
