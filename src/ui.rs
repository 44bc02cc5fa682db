//! Terminal messages for the CLI subcommands
//!
//! Everything goes to stderr: in `serve` mode stdout carries the protocol.

use colored::*;

pub fn print_header(title: &str) {
    let name = "gdocs-mcp".yellow().bold();
    let version = format!("v{}", env!("CARGO_PKG_VERSION")).dimmed();
    eprintln!("{} {}  {}", name, version, title.cyan());
}

pub fn print_step(msg: &str) {
    eprintln!("  {} {}", "•".green(), msg);
}

pub fn print_success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg.green());
}

pub fn print_warning(msg: &str) {
    eprintln!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "❌".red().bold(), msg.red());
}
