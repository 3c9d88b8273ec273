//! Message formatting and display.
//!
//! Every user-facing line goes through [`OutputFormatter`], which decides
//! whether the line is shown at the current [`Verbosity`] and how it is
//! decorated. Errors and warnings go to stderr, everything else to stdout.
//!
//! # Examples
//!
//! ```
//! use sheetpdf::output::formatter::{OutputFormatter, Verbosity};
//!
//! let formatter = OutputFormatter::new(Verbosity::Normal);
//! formatter.info("Loading timesheet.csv");
//! formatter.success("Saved timesheet.pdf");
//! formatter.error("Please upload a valid CSV file");
//! ```

use std::io::{self, IsTerminal};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn decoration(self) -> (&'static str, &'static str) {
        match self {
            Self::Info => ("", ""),
            Self::Success => ("✓ ", "\x1b[32m"),
            Self::Warning => ("⚠ ", "\x1b[33m"),
            Self::Error => ("✗ ", "\x1b[31m"),
            Self::Debug => ("→ ", "\x1b[36m"),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// How much the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Progress and results.
    #[default]
    Normal,
    /// Everything, including per-file details.
    Verbose,
}

impl Verbosity {
    /// Map the `-q`/`-v` flags. Quiet wins when both are set.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    fn shows(self, level: MessageLevel) -> bool {
        match level {
            MessageLevel::Warning | MessageLevel::Error => true,
            MessageLevel::Info | MessageLevel::Success => self >= Self::Normal,
            MessageLevel::Debug => self == Self::Verbose,
        }
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    verbosity: Verbosity,
    colored: bool,
}

impl OutputFormatter {
    /// Formatter that colours output when stdout is a terminal.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            colored: Self::should_use_color(),
        }
    }

    /// Formatter that never colours.
    pub fn plain(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            colored: false,
        }
    }

    /// Returns true if stdout is a TTY and TERM is set.
    fn should_use_color() -> bool {
        io::stdout().is_terminal() && std::env::var_os("TERM").is_some()
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Print an informational message.
    pub fn info(&self, message: &str) {
        self.print_message(MessageLevel::Info, message);
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        self.print_message(MessageLevel::Success, message);
    }

    /// Print a warning message. Shown even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message. Always shown.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a message only in verbose mode.
    pub fn debug(&self, message: &str) {
        self.print_message(MessageLevel::Debug, message);
    }

    /// Print a `label: value` line in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbosity == Verbosity::Verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a section header.
    pub fn section(&self, title: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("\n{title}");
        }
    }

    /// Print a numbered list item.
    pub fn list_item(&self, index: usize, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("  {index}. {message}");
        }
    }

    /// The line `message` would print as at `level`, or `None` when the
    /// current verbosity hides it.
    pub fn format_line(&self, level: MessageLevel, message: &str) -> Option<String> {
        if !self.verbosity.shows(level) {
            return None;
        }

        let (prefix, color_code) = level.decoration();
        if self.colored && !color_code.is_empty() {
            Some(format!("{color_code}{prefix}{message}\x1b[0m"))
        } else {
            Some(format!("{prefix}{message}"))
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let Some(line) = self.format_line(level, message) else {
            return;
        };
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}
