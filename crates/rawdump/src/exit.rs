use std::fmt;
use std::io;

use rawdump_frame::FrameError;
use rawdump_index::IndexError;
use rawdump_scan::ScanError;

// Process exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn index_error(context: &str, err: IndexError) -> CliError {
    match err {
        IndexError::Io(source) => io_error(context, source),
        IndexError::Malformed { .. } => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn scan_error(context: &str, err: ScanError) -> CliError {
    match err {
        ScanError::SourceUnavailable { ref source, .. } => {
            let code = if source.kind() == io::ErrorKind::PermissionDenied {
                PERMISSION_DENIED
            } else {
                FAILURE
            };
            CliError::new(code, format!("{context}: {err}"))
        }
        ScanError::Index(err) => index_error(context, err),
        ScanError::Frame {
            source: FrameError::Io(_),
            ..
        } => CliError::new(INTERNAL, format!("{context}: {err}")),
        ScanError::Frame { .. } | ScanError::NonMonotonicFrameId { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ScanError::Output(source) => io_error("write failed", source),
    }
}
