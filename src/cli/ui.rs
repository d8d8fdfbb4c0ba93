//! Terminal output helpers.

use console::style;
use std::fmt::Display;

pub fn success(message: impl Display) {
    println!("{} {}", style("✓").green(), message);
}

pub fn warning(message: impl Display) {
    println!("{} {}", style("⚠").yellow(), message);
}

pub fn error(message: impl Display) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Indented `label: value` line under a heading.
pub fn detail(label: &str, value: impl Display) {
    println!("  {:<9} {}", format!("{}:", label), style(value).dim());
}
