/// Errors that can occur while reading index records.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A record does not have the expected fields.
    #[error("malformed index record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// An I/O error occurred while reading the index.
    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
