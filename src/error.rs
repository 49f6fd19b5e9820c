use thiserror::Error;

/// Errors raised by the analysis operations themselves.
///
/// I/O failures are reported through the underlying [`std::io::Error`]
/// and malformed rows never become errors (see [`crate::reader::RowDiagnostic`]).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// The caller passed a value the operation cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A step was requested before the step it depends on.
    #[error("precondition failed: {0}")]
    Precondition(String),
}
