//! Crate error type.

/// All recoverable errors the writer can return.
///
/// Programmer misuse (writing to a closed sheet writer, a zero colspan)
/// is a panic, not a variant here: it indicates a bug in the caller, not
/// an environmental failure.
#[derive(Debug, thiserror::Error)]
pub enum XlsxError {
    /// Row length does not match the sheet's column schema.
    #[error("row has {actual} cells but the sheet has {expected} columns")]
    Arity { expected: usize, actual: usize },

    /// A datetime cell value was not valid RFC 3339.
    #[error("invalid datetime value: {0}")]
    DatetimeParse(#[from] chrono::ParseError),

    /// A datetime cell predates the OLE Automation epoch (1899-12-30).
    #[error("datetime {0} predates the 1899-12-30 spreadsheet epoch")]
    PreEpochDatetime(String),

    /// I/O error from the sink or the per-sheet spool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}
