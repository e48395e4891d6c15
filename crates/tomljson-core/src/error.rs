//! Error type for TOML parsing failures.

use thiserror::Error;

/// A parse failure, tagged with the position of the offending character.
///
/// There is exactly one error shape: every lexical, structural, semantic,
/// or range failure aborts the stream and reports the 1-based line and the
/// column (reset to 0 at each newline) where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at {line}:{column}: {message}")]
pub struct ParseError {
    /// 1-based line of the offending character.
    pub line: usize,
    /// Column of the offending character, reset at each newline.
    pub column: usize,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Convenience alias used throughout tomljson-core.
pub type Result<T> = std::result::Result<T, ParseError>;
