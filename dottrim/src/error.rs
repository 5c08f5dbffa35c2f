use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The error type covering everything this library can return.
///
/// The distinction that matters for the trim engine is fatal versus locally
/// recoverable: a [`Error::Malformed`] raised while locating the CLI header or
/// metadata root aborts the run before any byte is touched, whereas the same
/// condition inside a per-method or per-row walk is caught by the walker,
/// logged, and skipped.
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be parsed.
    ///
    /// Carries the source location at which the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// Description of what was malformed
        message: String,
        /// Source file in which this error was raised
        file: &'static str,
        /// Source line in which this error was raised
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This file type is not supported.
    ///
    /// The input is not a PE image carrying a CLI header (data directory 14).
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// Recursion limit reached.
    ///
    /// Signature type trees are recursive; a depth cap keeps crafted blobs
    /// from overflowing the stack. The associated value is the cap.
    #[error("Reached the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
