use changelog::HandlerStatus;
use colored::Colorize;
use std::io::{self, Write};

/// Print a status message with a spinner-like indicator
pub fn status_message(message: &str) {
    println!("{} {} ... ", "⏳".yellow(), message.bright_white());
    let _ = io::stdout().flush();
}

/// Print a success message
pub fn success_message(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

/// Print a warning message
pub fn warning_message(message: &str) {
    println!("{} {}", "⚠️ ".yellow(), message.yellow());
}

/// Print an error message
pub fn error_message(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red().bold());
}

/// Print a section header to separate logical sections of output
pub fn section_header(title: &str) {
    println!("\n{}", format!("==== {title} ====").cyan().bold());
}

/// Print a simple informational message
pub fn info_message(message: &str) {
    println!("{} {}", "ℹ️ ".blue(), message.blue());
}

/// Print a block of Markdown verbatim, indented under the previous message
pub fn markdown_block(markdown: &str) {
    for line in markdown.lines() {
        println!("    {}", line.dimmed());
    }
}

/// Print the final result of a command. Hidden results only show when
/// verbose.
pub fn handler_status(status: &HandlerStatus, verbose: bool) {
    if !status.is_success() {
        error_message(&status.reason);
    } else if !status.is_hidden() {
        success_message(&status.reason);
    } else if verbose {
        info_message(&status.reason);
    }
}
