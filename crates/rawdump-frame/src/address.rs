//! Hierarchical decomposition of event channel IDs.
//!
//! A channel ID packs four addresses, most significant first:
//! port (5 bits), slave (5 bits), chip (6 bits) and channel (6 bits).

use std::fmt;

use crate::layout::{CHANNEL, CHIP, PORT, SLAVE};

/// The four components of a channel ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelAddress {
    pub port: u8,
    pub slave: u8,
    pub chip: u8,
    pub channel: u8,
}

impl ChannelAddress {
    /// Split a channel ID into its components. Bits above bit 21 are ignored.
    pub fn from_channel_id(channel_id: u32) -> Self {
        let id = u64::from(channel_id);
        Self {
            port: PORT.get(id) as u8,
            slave: SLAVE.get(id) as u8,
            chip: CHIP.get(id) as u8,
            channel: CHANNEL.get(id) as u8,
        }
    }

    /// Pack the components back into a channel ID.
    pub fn channel_id(&self) -> u32 {
        let mut id = 0;
        id = PORT.set(id, u64::from(self.port));
        id = SLAVE.set(id, u64::from(self.slave));
        id = CHIP.set(id, u64::from(self.chip));
        id = CHANNEL.set(id, u64::from(self.channel));
        id as u32
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02} {:02} {:02} {:02}",
            self.port, self.slave, self.chip, self.channel
        )
    }
}
