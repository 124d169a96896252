//! Bit layout of frame header and event words.
//!
//! ```text
//! word 0   │ 63..51 unused │ 50..36 frame size (words) │ 35..0 frame ID │
//! word 1   │ 63..17 unused │ 16 lost │ 15..0 event count │
//! event    │ 63..42 channel ID │ 41..40 TAC │ 39..30 tCoarse │ 29..20 eCoarse │
//!          │ 19..10 tFine │ 9..0 eFine │
//! ```
//!
//! Every shift and mask used by the codec lives here.

/// A bit field inside a 64-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub shift: u32,
    pub bits: u32,
}

impl Field {
    const fn new(name: &'static str, shift: u32, bits: u32) -> Self {
        Self { name, shift, bits }
    }

    /// Mask of the field after shifting down.
    pub const fn mask(self) -> u64 {
        if self.bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Largest value the field can hold.
    pub const fn max(self) -> u64 {
        self.mask()
    }

    /// Extract the field from `word`.
    pub const fn get(self, word: u64) -> u64 {
        (word >> self.shift) & self.mask()
    }

    /// Return `word` with the field replaced by `value`.
    ///
    /// Bits of `value` above the field width are dropped; callers check
    /// [`Field::max`] first.
    pub const fn set(self, word: u64, value: u64) -> u64 {
        let cleared = word & !(self.mask() << self.shift);
        cleared | ((value & self.mask()) << self.shift)
    }
}

// Header word 0
pub const FRAME_ID: Field = Field::new("frame_id", 0, 36);
pub const FRAME_SIZE: Field = Field::new("frame_size", 36, 15);

// Header word 1
pub const N_EVENTS: Field = Field::new("n_events", 0, 16);
pub const FRAME_LOST: Field = Field::new("frame_lost", 16, 1);

// Event word
pub const E_FINE: Field = Field::new("e_fine", 0, 10);
pub const T_FINE: Field = Field::new("t_fine", 10, 10);
pub const E_COARSE: Field = Field::new("e_coarse", 20, 10);
pub const T_COARSE: Field = Field::new("t_coarse", 30, 10);
pub const TAC_ID: Field = Field::new("tac_id", 40, 2);
pub const CHANNEL_ID: Field = Field::new("channel_id", 42, 22);

// Channel ID sub-fields, most significant first
pub const PORT: Field = Field::new("port", 17, 5);
pub const SLAVE: Field = Field::new("slave", 12, 5);
pub const CHIP: Field = Field::new("chip", 6, 6);
pub const CHANNEL: Field = Field::new("channel", 0, 6);
