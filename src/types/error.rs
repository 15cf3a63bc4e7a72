//! Error types for the balance sync analyzer
//!
//! # Error Categories
//!
//! - **Extraction Errors**: unreadable or corrupt containers and archive members.
//!   Recovered locally; the member is skipped and processing continues.
//! - **Entry Errors**: missing timestamps and malformed amounts. Recovered per
//!   entry and tallied in `ParseStats`.
//! - **Fatal Errors**: missing input, no usable records at all, runtime or
//!   output failures. These are the only errors that reach the caller.

use thiserror::Error;

/// Main error type for the analyzer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzerError {
    /// Input path does not exist
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading input or writing output
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// A container or archive member could not be read
    ///
    /// Recoverable: the member is skipped.
    #[error("Failed to extract {source_name}: {message}")]
    ExtractionFailure {
        /// File or archive member that failed
        source_name: String,
        /// Description of the failure
        message: String,
    },

    /// A decompressed stream exceeded the per-member read limit
    ///
    /// Recoverable: the member is skipped.
    #[error("{source_name} exceeds the {limit} byte read limit")]
    MemberTooLarge {
        /// File or archive member that was too large
        source_name: String,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Log entry has no parseable timestamp
    ///
    /// Recoverable: the entry is dropped and counted.
    #[error("Log entry has no parseable timestamp")]
    MissingTimestamp,

    /// Dollar amount matched but could not be parsed
    ///
    /// Recoverable: the amount defaults to zero.
    #[error("Malformed amount '{raw}'")]
    MalformedAmount {
        /// The matched text
        raw: String,
    },

    /// Nothing usable was produced from the input
    ///
    /// Raised only when neither parsed nor synthetic records exist.
    #[error("No valid log entries found in {path} ({entries} entries, {skip_messages} skip messages)")]
    EmptyResult {
        /// Input path
        path: String,
        /// Number of entries the splitter produced
        entries: usize,
        /// Number of intentionally skipped balance sync entries
        skip_messages: usize,
    },

    /// Async runtime could not be created or a task failed
    #[error("Runtime error: {message}")]
    RuntimeError {
        /// Description of the runtime failure
        message: String,
    },

    /// Output could not be written
    #[error("Output error: {message}")]
    OutputError {
        /// Description of the output failure
        message: String,
    },
}

// Conversion from io::Error to AnalyzerError
impl From<std::io::Error> for AnalyzerError {
    fn from(error: std::io::Error) -> Self {
        AnalyzerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from zip::result::ZipError to AnalyzerError
impl From<zip::result::ZipError> for AnalyzerError {
    fn from(error: zip::result::ZipError) -> Self {
        AnalyzerError::ExtractionFailure {
            source_name: "archive".to_string(),
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to AnalyzerError
impl From<csv::Error> for AnalyzerError {
    fn from(error: csv::Error) -> Self {
        AnalyzerError::OutputError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl AnalyzerError {
    /// Create a FileNotFound error
    pub fn file_not_found(path: &str) -> Self {
        AnalyzerError::FileNotFound {
            path: path.to_string(),
        }
    }

    /// Create an ExtractionFailure error
    pub fn extraction_failure(source_name: &str, message: impl ToString) -> Self {
        AnalyzerError::ExtractionFailure {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a MemberTooLarge error
    pub fn member_too_large(source_name: &str, limit: u64) -> Self {
        AnalyzerError::MemberTooLarge {
            source_name: source_name.to_string(),
            limit,
        }
    }

    /// Create a MalformedAmount error
    pub fn malformed_amount(raw: &str) -> Self {
        AnalyzerError::MalformedAmount {
            raw: raw.to_string(),
        }
    }

    /// Create an EmptyResult error
    pub fn empty_result(path: &str, entries: usize, skip_messages: usize) -> Self {
        AnalyzerError::EmptyResult {
            path: path.to_string(),
            entries,
            skip_messages,
        }
    }

    /// Create a RuntimeError error
    pub fn runtime(message: impl ToString) -> Self {
        AnalyzerError::RuntimeError {
            message: message.to_string(),
        }
    }

    /// Create an OutputError error
    pub fn output(message: impl ToString) -> Self {
        AnalyzerError::OutputError {
            message: message.to_string(),
        }
    }

    /// Whether this error is recovered locally rather than surfaced
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalyzerError::ExtractionFailure { .. }
                | AnalyzerError::MemberTooLarge { .. }
                | AnalyzerError::MissingTimestamp
                | AnalyzerError::MalformedAmount { .. }
        )
    }
}
