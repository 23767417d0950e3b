//! Diagnostic channel helpers. Warnings and status notes go to stderr so the
//! rendered event stream on stdout stays clean and diffable.

use colored::Colorize;

/// Print a warning to stderr
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.yellow());
}

/// Print a non-fatal error to stderr
pub fn error_message(message: &str) {
    eprintln!("{} {}", "Error:".bold().red(), message.red());
}

/// Print an informational note to stderr
pub fn note(message: &str) {
    eprintln!("{}", message.dimmed());
}
