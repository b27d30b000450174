//! Register definitions for the JadePix3 front-end FPGA
//!
//! Registers are addressed by name, relative to the base of the block that
//! owns them (see [`RegisterLink`](crate::RegisterLink)). Every register value
//! travels on the bus as one 32-bit word; typed registers convert to and from
//! that word through [`ToByteArray`](regiface::ToByteArray) and
//! [`FromByteArray`](regiface::FromByteArray) with a big-endian `[u8; 4]`.

mod cee;
mod dac;
mod global;
mod spi;

pub use cee::*;
pub use dac::*;
pub use global::*;
pub use spi::*;

/// A register with a fixed name inside its block
pub trait Register {
    /// Name of the register, appended to the block base
    const NAME: &'static str;
}

/// Bus word of a typed register
pub type Word = [u8; 4];

/// Error type for channel index conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidChannel(pub usize);

/// One of the eight channels of a banked register (SPI data slots, DAC outputs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Ch0 = 0,
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
    Ch4 = 4,
    Ch5 = 5,
    Ch6 = 6,
    Ch7 = 7,
}

impl Channel {
    /// All channels in bank order
    pub const ALL: [Channel; 8] = [
        Channel::Ch0,
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
        Channel::Ch5,
        Channel::Ch6,
        Channel::Ch7,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Channel {
    type Error = InvalidChannel;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Channel::ALL.get(value).copied().ok_or(InvalidChannel(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_conversion() {
        assert_eq!(Channel::try_from(0), Ok(Channel::Ch0));
        assert_eq!(Channel::try_from(7), Ok(Channel::Ch7));
        assert_eq!(Channel::try_from(8), Err(InvalidChannel(8)));
        for (i, ch) in Channel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
    }
}
