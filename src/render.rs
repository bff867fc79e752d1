//! Terminal output for the command-line front end.
//!
//! Results go to stdout so they can be piped; everything else goes to stderr.

use crossterm::style::{Color, Stylize};

const LABEL_ERROR: &str = "error:";
const LABEL_WARNING: &str = "warning:";

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Print an error (to stderr).
    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("{LABEL_ERROR} {msg}");
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("{LABEL_WARNING} {msg}");
        }
    }

    /// Hook notification, already prefixed by the dispatcher.
    pub fn notification(&self, msg: &str) {
        if self.color {
            eprintln!("{}", msg.with(Color::Red));
        } else {
            eprintln!("{msg}");
        }
    }

    pub fn detail(&self, key: &str, value: &str) {
        if self.color {
            eprintln!("  {}: {value}", key.with(Color::DarkGrey));
        } else {
            eprintln!("  {key}: {value}");
        }
    }
}
