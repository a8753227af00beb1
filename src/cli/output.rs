//! Terminal output for the `fitbuddy-server` CLI.
//!
//! Colored by default; `--no-color` switches every line to a bracketed tag.

use owo_colors::OwoColorize;

pub struct Output {
    pub colored: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let version = concat!("v", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}  {}\n",
                "FitBuddy".bright_green().bold(),
                version.dimmed(),
                "fitness answers from your documents".italic()
            );
        } else {
            println!("\n   FitBuddy {}\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".cyan(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Written to stderr.
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bold().underline());
        } else {
            println!("\n  [{}]", title.to_lowercase());
        }
    }

    /// One `key = value` line, aligned under a [`header`](Self::header).
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {:<18} {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {:<18} {}", key, value);
        }
    }
}
