use bytes::{Buf, BufMut, BytesMut};

use crate::address::ChannelAddress;
use crate::error::{FrameError, Result};
use crate::layout::{
    Field, CHANNEL_ID, E_COARSE, E_FINE, FRAME_ID, FRAME_LOST, FRAME_SIZE, N_EVENTS, TAC_ID,
    T_COARSE, T_FINE,
};

/// Size of one frame word in bytes.
pub const WORD_SIZE: usize = 8;

/// Fixed header words at the start of every frame.
pub const HEADER_WORDS: usize = 2;

/// Frame header: frame ID/size word + event count/lost word = 16 bytes.
pub const HEADER_SIZE: usize = HEADER_WORDS * WORD_SIZE;

/// Default maximum frame size in words, matching the producer's frame buffer.
pub const DEFAULT_MAX_FRAME_WORDS: u32 = 2048;

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Largest accepted frame, in words. Default: 2048.
    pub max_frame_words: u32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_frame_words: DEFAULT_MAX_FRAME_WORDS,
        }
    }
}

/// The two header words of a frame, read through named accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    words: [u64; HEADER_WORDS],
}

impl FrameHeader {
    /// Wrap two raw header words without checking them.
    pub fn from_words(word0: u64, word1: u64) -> Self {
        Self {
            words: [word0, word1],
        }
    }

    /// Build a header from field values, rejecting values wider than their fields.
    pub fn new(
        frame_size_words: u32,
        frame_id: u64,
        frame_lost: bool,
        n_events: u32,
    ) -> Result<Self> {
        let word0 = FRAME_ID.set(0, checked(FRAME_ID, frame_id)?);
        let word0 = FRAME_SIZE.set(word0, checked(FRAME_SIZE, u64::from(frame_size_words))?);
        let word1 = N_EVENTS.set(0, checked(N_EVENTS, u64::from(n_events))?);
        let word1 = FRAME_LOST.set(word1, u64::from(frame_lost));
        Ok(Self::from_words(word0, word1))
    }

    /// The raw header words.
    pub fn words(&self) -> [u64; HEADER_WORDS] {
        self.words
    }

    /// Total frame size in words, header included.
    pub fn frame_size_words(&self) -> u32 {
        FRAME_SIZE.get(self.words[0]) as u32
    }

    pub fn frame_id(&self) -> u64 {
        FRAME_ID.get(self.words[0])
    }

    pub fn frame_lost(&self) -> bool {
        FRAME_LOST.get(self.words[1]) != 0
    }

    pub fn n_events(&self) -> u32 {
        N_EVENTS.get(self.words[1]) as u32
    }

    /// Words following the header, whether or not they hold events.
    pub fn payload_words(&self) -> u32 {
        self.frame_size_words().saturating_sub(HEADER_WORDS as u32)
    }

    /// Total frame size in bytes.
    pub fn frame_bytes(&self) -> u64 {
        u64::from(self.frame_size_words()) * WORD_SIZE as u64
    }

    /// Check the declared size and event count against each other and `config`.
    pub fn validate(&self, config: &DecodeConfig) -> Result<()> {
        let size = self.frame_size_words();
        if (size as usize) < HEADER_WORDS {
            return Err(FrameError::InvalidFrameSize { size });
        }
        if size > config.max_frame_words {
            return Err(FrameError::FrameTooLarge {
                size,
                max: config.max_frame_words,
            });
        }
        let capacity = self.payload_words();
        if self.n_events() > capacity {
            return Err(FrameError::EventCountExceedsFrame {
                n_events: self.n_events(),
                capacity,
            });
        }
        Ok(())
    }
}

/// One detection, backed by its raw event word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    word: u64,
}

impl RawEvent {
    pub fn from_word(word: u64) -> Self {
        Self { word }
    }

    /// Build an event from field values, rejecting values wider than their fields.
    pub fn new(
        channel_id: u32,
        tac_id: u32,
        t_coarse: u32,
        t_fine: u32,
        e_coarse: u32,
        e_fine: u32,
    ) -> Result<Self> {
        let fields = [
            (CHANNEL_ID, channel_id),
            (TAC_ID, tac_id),
            (T_COARSE, t_coarse),
            (T_FINE, t_fine),
            (E_COARSE, e_coarse),
            (E_FINE, e_fine),
        ];
        let mut word = 0;
        for (field, value) in fields {
            word = field.set(word, checked(field, u64::from(value))?);
        }
        Ok(Self { word })
    }

    pub fn word(&self) -> u64 {
        self.word
    }

    pub fn channel_id(&self) -> u32 {
        CHANNEL_ID.get(self.word) as u32
    }

    /// The channel ID split into port, slave, chip and channel.
    pub fn address(&self) -> ChannelAddress {
        ChannelAddress::from_channel_id(self.channel_id())
    }

    pub fn tac_id(&self) -> u32 {
        TAC_ID.get(self.word) as u32
    }

    pub fn t_coarse(&self) -> u32 {
        T_COARSE.get(self.word) as u32
    }

    pub fn t_fine(&self) -> u32 {
        T_FINE.get(self.word) as u32
    }

    pub fn e_coarse(&self) -> u32 {
        E_COARSE.get(self.word) as u32
    }

    pub fn e_fine(&self) -> u32 {
        E_FINE.get(self.word) as u32
    }
}

/// A fully decoded data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    header: FrameHeader,
    events: Vec<RawEvent>,
}

impl RawFrame {
    /// Create a frame sized exactly for its events.
    pub fn new(frame_id: u64, frame_lost: bool, events: Vec<RawEvent>) -> Result<Self> {
        let size = HEADER_WORDS + events.len();
        Self::with_size(size_to_u32(size), frame_id, frame_lost, events)
    }

    /// Create a frame declaring `frame_size_words`, which may leave slack after the events.
    pub fn with_size(
        frame_size_words: u32,
        frame_id: u64,
        frame_lost: bool,
        events: Vec<RawEvent>,
    ) -> Result<Self> {
        let n_events = size_to_u32(events.len());
        let header = FrameHeader::new(frame_size_words, frame_id, frame_lost, n_events)?;
        header.validate(&DecodeConfig {
            max_frame_words: FRAME_SIZE.max() as u32,
        })?;
        Ok(Self { header, events })
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    pub fn frame_id(&self) -> u64 {
        self.header.frame_id()
    }

    pub fn frame_lost(&self) -> bool {
        self.header.frame_lost()
    }

    pub fn n_events(&self) -> u32 {
        self.header.n_events()
    }

    /// The total wire size of this frame in bytes.
    pub fn wire_size(&self) -> usize {
        self.header.frame_bytes() as usize
    }
}

/// Decode and validate the header at the start of `src`.
///
/// Only the two header words are read; the payload does not need to be present.
pub fn decode_header(src: &[u8], config: &DecodeConfig) -> Result<FrameHeader> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::Truncated {
            needed: HEADER_SIZE as u64,
            available: src.len() as u64,
        });
    }

    let mut buf = &src[..HEADER_SIZE];
    let header = FrameHeader::from_words(buf.get_u64_le(), buf.get_u64_le());
    header.validate(config)?;
    Ok(header)
}

/// Decode one complete frame from the start of `src`.
///
/// `src` must hold at least the declared frame size. Slack words after the
/// last event are skipped. Bytes after the frame are ignored.
pub fn decode_frame(src: &[u8], config: &DecodeConfig) -> Result<RawFrame> {
    let header = decode_header(src, config)?;

    let total = header.frame_bytes();
    if (src.len() as u64) < total {
        return Err(FrameError::Truncated {
            needed: total,
            available: src.len() as u64,
        });
    }

    let n_events = header.n_events() as usize;
    let mut payload = &src[HEADER_SIZE..HEADER_SIZE + n_events * WORD_SIZE];
    let mut events = Vec::with_capacity(n_events);
    while payload.has_remaining() {
        events.push(RawEvent::from_word(payload.get_u64_le()));
    }

    Ok(RawFrame { header, events })
}

/// Encode a frame into the wire format.
///
/// Wire format (little-endian words):
/// ```text
/// ┌────────────────┬────────────────┬───────────────┬──────────────┐
/// │ Word 0         │ Word 1         │ Event words   │ Slack words  │
/// │ size | ID      │ lost | nEvents │ (nEvents)     │ (zeroed)     │
/// └────────────────┴────────────────┴───────────────┴──────────────┘
/// ```
pub fn encode_frame(frame: &RawFrame, dst: &mut BytesMut) -> Result<()> {
    let header = frame.header;
    dst.reserve(frame.wire_size());
    for word in header.words {
        dst.put_u64_le(word);
    }
    for event in &frame.events {
        dst.put_u64_le(event.word);
    }
    let slack = header.payload_words() as usize - frame.events.len();
    dst.put_bytes(0, slack * WORD_SIZE);
    Ok(())
}

fn checked(field: Field, value: u64) -> Result<u64> {
    if value > field.max() {
        return Err(FrameError::FieldOverflow {
            field: field.name,
            value,
            bits: field.bits,
        });
    }
    Ok(value)
}

fn size_to_u32(size: usize) -> u32 {
    u32::try_from(size).unwrap_or(u32::MAX)
}
