use std::io::{ErrorKind, Read, Seek, SeekFrom};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, decode_header, DecodeConfig, FrameHeader, RawFrame, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// A seekable, read-only byte store of packed frames.
pub trait FrameSource: Read + Seek {}

impl<T: Read + Seek + ?Sized> FrameSource for T {}

/// Walks the frames stored in the byte range `[start, end)` of a source.
///
/// The cursor advances by exactly each frame's declared size and the walk
/// ends when it lands on `end`. A frame that would cross `end`, or a source
/// that runs dry first, is a [`FrameError::Truncated`] error. After any error
/// the reader yields nothing more.
pub struct WindowReader<'a, S: ?Sized> {
    source: &'a mut S,
    cursor: u64,
    frame_offset: u64,
    end: u64,
    buf: BytesMut,
    config: DecodeConfig,
    done: bool,
}

impl<'a, S: FrameSource + ?Sized> WindowReader<'a, S> {
    /// Create a reader with default configuration, positioned at `start`.
    pub fn new(source: &'a mut S, start: u64, end: u64) -> Result<Self> {
        Self::with_config(source, start, end, DecodeConfig::default())
    }

    /// Create a reader with explicit configuration, positioned at `start`.
    pub fn with_config(
        source: &'a mut S,
        start: u64,
        end: u64,
        config: DecodeConfig,
    ) -> Result<Self> {
        source.seek(SeekFrom::Start(start))?;
        Ok(Self {
            source,
            cursor: start,
            frame_offset: start,
            end,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            done: start >= end,
        })
    }

    /// Read the next frame's header, consuming the whole frame.
    ///
    /// Event words are read but never decoded.
    pub fn read_header(&mut self) -> Result<Option<FrameHeader>> {
        self.advance()
    }

    /// Read and fully decode the next frame.
    pub fn read_frame(&mut self) -> Result<Option<RawFrame>> {
        if self.advance()?.is_none() {
            return Ok(None);
        }
        match decode_frame(&self.buf, &self.config) {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    /// Byte offset of the frame most recently started.
    pub fn frame_offset(&self) -> u64 {
        self.frame_offset
    }

    /// Byte offset of the next frame.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Exclusive end of the window.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Current reader configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    fn advance(&mut self) -> Result<Option<FrameHeader>> {
        if self.done {
            return Ok(None);
        }
        if self.cursor >= self.end {
            self.done = true;
            return Ok(None);
        }

        self.frame_offset = self.cursor;
        match self.fill_frame() {
            Ok(header) => Ok(Some(header)),
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    fn fill_frame(&mut self) -> Result<FrameHeader> {
        let remaining = self.end - self.cursor;
        if remaining < HEADER_SIZE as u64 {
            return Err(FrameError::Truncated {
                needed: HEADER_SIZE as u64,
                available: remaining,
            });
        }

        self.buf.clear();
        self.buf.resize(HEADER_SIZE, 0);
        self.fill_from(0)?;

        let header = decode_header(&self.buf, &self.config)?;
        let total = header.frame_bytes();
        if total > remaining {
            return Err(FrameError::Truncated {
                needed: total,
                available: remaining,
            });
        }

        self.buf.resize(total as usize, 0);
        self.fill_from(HEADER_SIZE)?;
        self.cursor += total;

        trace!(
            offset = self.frame_offset,
            frame_id = header.frame_id(),
            size = header.frame_size_words(),
            n_events = header.n_events(),
            lost = header.frame_lost(),
            "read frame"
        );
        Ok(header)
    }

    fn fill_from(&mut self, mut filled: usize) -> Result<()> {
        while filled < self.buf.len() {
            match self.source.read(&mut self.buf[filled..]) {
                Ok(0) => {
                    return Err(FrameError::Truncated {
                        needed: self.buf.len() as u64,
                        available: filled as u64,
                    });
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }
}

impl<S: FrameSource + ?Sized> Iterator for WindowReader<'_, S> {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}
