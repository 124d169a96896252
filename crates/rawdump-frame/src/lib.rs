//! Decoder for the packed 64-bit data frames written by the readout system.
//!
//! A data frame is a run of little-endian 64-bit words:
//! - Word 0 carries the frame ID and the frame size in words
//! - Word 1 carries the event count and the frame-lost flag
//! - Each following word holds one event (channel, TAC, time and energy codes)
//!
//! Frames are decoded whole or not at all. [`WindowReader`] walks the frames of
//! one byte range of a seekable source and never reads past its end.

pub mod address;
pub mod codec;
pub mod error;
pub mod layout;
pub mod reader;

pub use address::ChannelAddress;
pub use codec::{
    decode_frame, decode_header, encode_frame, DecodeConfig, FrameHeader, RawEvent, RawFrame,
    DEFAULT_MAX_FRAME_WORDS, HEADER_SIZE, HEADER_WORDS, WORD_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{FrameSource, WindowReader};
