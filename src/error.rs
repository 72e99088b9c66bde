//! Error types for the BT-B36 emulator library.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result type alias using EmulatorError.
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Top-level error type for the host-facing session layer.
///
/// The decoder core itself never fails; malformed input becomes an
/// "unknown" command record instead.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// IO error while delivering reply bytes to the sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer identity rejected.
    #[error("identity error")]
    Identity(#[from] IdentityError),
}

/// Identity string validation error with source span for miette
/// diagnostics.
///
/// Identity strings travel in status replies as raw bytes with no
/// terminator, so anything outside printable ASCII is rejected.
#[derive(Debug, Error, Diagnostic)]
#[error("identity string contains a character that cannot be sent")]
#[diagnostic(code(btb36::identity))]
pub struct IdentityError {
    /// The identity string being validated.
    #[source_code]
    pub src: String,

    /// Span pointing to the offending character.
    #[label("this character is not printable ASCII")]
    pub span: SourceSpan,

    /// Optional help message.
    #[help]
    pub help: Option<String>,
}
