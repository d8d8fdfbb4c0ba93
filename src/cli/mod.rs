//! Command-line entry points.

pub mod commands;
pub mod ui;
