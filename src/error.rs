//! Error types for sheetpdf.
//!
//! Every fallible operation in the library returns [`SheetPdfError`]. The
//! variants follow the way a conversion or merge can go wrong from the
//! user's point of view:
//!
//! - **Input errors**: wrong file type, empty or unparsable source
//! - **Data errors**: nothing left to export after filtering
//! - **Merge errors**: too few documents, undecodable input
//! - **Output errors**: existing output, failed writes, render failures

use std::io;
use std::path::PathBuf;

/// Result type alias for sheetpdf operations.
pub type Result<T> = std::result::Result<T, SheetPdfError>;

/// Main error type for sheetpdf operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetPdfError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input file cannot be read.
    #[error("Cannot read file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// File type does not match what the operation accepts.
    #[error("{message}: {}", path.display())]
    InvalidInputFormat {
        /// Offending file.
        path: PathBuf,
        /// User-facing description of what was expected.
        message: String,
    },

    /// Source parsed but holds no rows.
    #[error("{message}")]
    EmptySource {
        /// User-facing description.
        message: String,
    },

    /// The parser rejected the source.
    #[error("Error reading {}: {reason}", path.display())]
    ParseFailed {
        /// Source file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Every row was blank after filtering.
    #[error("No valid data to export")]
    NoValidData,

    /// A signature image could not be decoded.
    #[error("Failed to decode signature image: {reason}")]
    ImageDecode {
        /// Decoder message.
        reason: String,
    },

    /// Fewer than two documents were queued for merging.
    #[error("Please add at least 2 PDF files to merge (queued: {queued})")]
    NotEnoughDocuments {
        /// Number of queued documents.
        queued: usize,
    },

    /// Merge operation failed.
    #[error("Error merging PDFs: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Building the output PDF failed.
    #[error("Failed to render PDF: {reason}")]
    RenderFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for SheetPdfError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<serde_json::Error> for SheetPdfError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl SheetPdfError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create an InvalidInputFormat error.
    pub fn invalid_input_format(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidInputFormat {
            path,
            message: message.into(),
        }
    }

    /// Create an EmptySource error.
    pub fn empty_source(message: impl Into<String>) -> Self {
        Self::EmptySource {
            message: message.into(),
        }
    }

    /// Create a ParseFailed error.
    pub fn parse_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if the user can retry after this error without restarting.
    ///
    /// Input and data errors leave session state usable; output errors
    /// end the current operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInputFormat { .. }
                | Self::EmptySource { .. }
                | Self::ParseFailed { .. }
                | Self::NoValidData
                | Self::ImageDecode { .. }
                | Self::NotEnoughDocuments { .. }
                | Self::MergeFailed { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::InvalidInputFormat { .. } => 2,
            Self::EmptySource { .. } => 3,
            Self::ParseFailed { .. } => 3,
            Self::NoValidData => 3,
            Self::ImageDecode { .. } => 3,
            Self::NotEnoughDocuments { .. } => 1,
            Self::MergeFailed { .. } => 6,
            Self::RenderFailed { .. } => 6,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
