//! Output formatting utilities for CLI

use console::style;

const TRUNCATE_AT: usize = 50;

/// Print a section banner.
pub fn banner(title: &str) {
    println!();
    println!("{}", style(format!("=== {} ===", title)).bold().cyan());
}

/// Print a numbered pipeline step.
pub fn step(n: usize, msg: &str) {
    println!("{} {}", style(format!("[{}]", n)).bold().blue(), msg);
}

/// Print a success line.
pub fn success(msg: &str) {
    println!("{} {}", style("✅").green(), msg);
}

/// Print a warning line.
pub fn warn_line(msg: &str) {
    println!("{} {}", style("⚠️").yellow(), style(msg).yellow());
}

/// Print an indented list item.
pub fn item(msg: &str) {
    println!("   - {}", msg);
}

/// Shorten a value for display, keeping credentials off the screen.
pub fn truncate(value: &str) -> String {
    if value.chars().count() <= TRUNCATE_AT {
        value.to_string()
    } else {
        let prefix: String = value.chars().take(TRUNCATE_AT).collect();
        format!("{}...", prefix)
    }
}
