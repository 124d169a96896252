/// Errors that can occur while decoding or walking data frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes are available than the frame requires.
    #[error("frame truncated (needed {needed} bytes, {available} available)")]
    Truncated { needed: u64, available: u64 },

    /// The header declares a frame smaller than its own two header words.
    #[error("invalid frame size ({size} words, minimum 2)")]
    InvalidFrameSize { size: u32 },

    /// The header declares a frame larger than the configured maximum.
    #[error("frame too large ({size} words, max {max})")]
    FrameTooLarge { size: u32, max: u32 },

    /// The event count does not fit in the declared frame size.
    #[error("event count {n_events} exceeds frame capacity of {capacity} words")]
    EventCountExceedsFrame { n_events: u32, capacity: u32 },

    /// A value does not fit in its bit field when encoding.
    #[error("{field} value {value} does not fit in {bits} bits")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        bits: u32,
    },

    /// An I/O error occurred while reading the frame source.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
