//! Console messages for chart commands.
//!
//! Diagnostics go to stderr, chart data and confirmations to stdout, so
//! `orgchart export --stdout` and `node list` stay pipeable. Colors follow
//! NO_COLOR / CLICOLOR via `colored`.

use std::fmt::Display;
use std::io::Write;

use colored::Colorize;

pub fn error(msg: impl Display) {
    eprintln!("{} {msg}", "error:".red().bold());
}

/// Non-fatal problem, e.g. an edit that named an unknown node.
pub fn warning(msg: impl Display) {
    eprintln!("{} {msg}", "warning:".yellow().bold());
}

pub fn success(msg: impl Display) {
    println!("{} {msg}", "✓".green());
}

/// `Label: value` line, label in green.
pub fn action(label: &str, msg: impl Display) {
    println!("{}: {msg}", label.green());
}

/// Chart or node title above detail lines.
pub fn header(msg: impl Display) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn detail(msg: impl Display) {
    println!("  {msg}");
}

/// Uncolored, for rendered trees, JSON and tab-separated rows.
pub fn info(msg: impl Display) {
    println!("{msg}");
}

/// Question on stdout without a trailing newline; the answer is read by the caller.
pub fn prompt(msg: impl Display) {
    let mut stdout = std::io::stdout().lock();
    // a failed flush only delays the prompt text
    let _ = write!(stdout, "{} ", msg.to_string().cyan());
    let _ = stdout.flush();
}
