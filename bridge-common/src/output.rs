//! Console helpers for consistent CLI output.
//!
//! Status lines carry a colored prefix; payloads (JSON from the homeserver or
//! the bridge) are printed by callers with plain `println!` so they stay
//! machine-readable.

use owo_colors::OwoColorize;

/// Standard output helper for consistent CLI formatting.
pub struct Output;

impl Output {
    /// Print a success message with a green checkmark.
    ///
    /// Example: `✓ Granted.`
    pub fn success(msg: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), msg.as_ref());
    }

    /// Print an error message with a red X to stderr.
    ///
    /// Example: `✗ error: cannot read as_token from registration file ...`
    pub fn error(msg: impl AsRef<str>) {
        eprintln!("{} {}", "✗".red().bold(), msg.as_ref().red());
    }

    /// Print a warning message with a yellow warning symbol.
    ///
    /// Example: `⚠ Aborted; power levels unchanged.`
    pub fn warning(msg: impl AsRef<str>) {
        println!("{} {}", "⚠".yellow(), msg.as_ref());
    }

    /// Print an info/status message with a cyan arrow.
    ///
    /// Example: `→ Linking #chan:x to irc.example.org:#foo`
    pub fn info(msg: impl AsRef<str>) {
        println!("{} {}", "→".cyan(), msg.as_ref());
    }
}
