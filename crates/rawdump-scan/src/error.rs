use std::path::PathBuf;

use rawdump_frame::FrameError;
use rawdump_index::IndexError;

/// Errors that end a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The index or data file could not be opened.
    #[error("could not open '{}' for reading: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The index could not be read.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// A frame of a window could not be read or decoded.
    #[error("window at index line {window}, offset {offset}: {source}")]
    Frame {
        window: usize,
        offset: u64,
        source: FrameError,
    },

    /// A frame ID did not increase within a window.
    #[error(
        "window at index line {window}, offset {offset}: frame ID {current} does not follow frame ID {previous}"
    )]
    NonMonotonicFrameId {
        window: usize,
        offset: u64,
        previous: u64,
        current: u64,
    },

    /// The visitor failed to accept output.
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
