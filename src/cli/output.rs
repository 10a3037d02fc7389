//! Styled terminal output
//!
//! Status lines go to stdout and are silenced by `--quiet`; errors always go
//! to stderr.

use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are shown even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Only printed with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn step(&self, step: &str) {
        if !self.quiet {
            println!("{} {}", style("❯").cyan(), step);
        }
    }

    /// Requested data, printed regardless of `--quiet`
    pub fn table_row(&self, key: &str, value: &str) {
        println!("  {:<12} {}", style(key).dim(), value);
    }

    pub fn list_item(&self, item: &str) {
        println!("  • {}", item);
    }

    /// Print a count line such as `Copied  3`
    pub fn summary_stats(&self, label: &str, value: impl ToString) {
        if !self.quiet {
            println!("  {:<12} {}", style(label).dim(), style(value.to_string()).bold());
        }
    }
}
