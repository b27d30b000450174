//! SPI master registers
//!
//! The FPGA hosts a wishbone SPI master core exposed under `spi_dev.`:
//! - `ctrl`: transfer control word
//! - `divider`: serial clock divider
//! - `ss`: slave select mask
//! - `d0` .. `d7`: transfer data bank
//!
//! The control register is written as a whole word only; the bus has no
//! bit-level access.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{FromByteArray, ToByteArray};

use super::{Channel, Register, Word};

/// Base of the SPI master block
pub const SPI_BASE: &str = "spi_dev.";

const CONTROL_MASK: u32 = 0x3FFF;

bitflags! {
    /// Single-bit fields of the control word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlFlags: u16 {
        /// Write 1 to start a transfer; reads 1 while the transfer runs
        const GO_BUSY = 1 << 8;
        /// MISO sampled on the falling SCLK edge (rising when clear)
        const RX_NEG = 1 << 9;
        /// MOSI driven on the falling SCLK edge (rising when clear)
        const TX_NEG = 1 << 10;
        /// LSB shifted first in both directions (MSB when clear)
        const LSB = 1 << 11;
        /// Interrupt raised when a transfer completes
        const IE = 1 << 12;
        /// Slave select driven automatically around each transfer
        const ASS = 1 << 13;
    }
}

/// Control register (name: `ctrl`)
///
/// 14-bit word:
/// - Bits 13: ASS
/// - Bits 12: IE
/// - Bits 11: LSB
/// - Bits 10: Tx_NEG
/// - Bits 9: Rx_NEG
/// - Bits 8: GO_BSY
/// - Bits 7:0: CHAR_LEN
///
/// The word is always derived from the fields, so every field change is
/// visible in the next [`bits`](ControlWord::bits) call as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlWord {
    /// Number of bits shifted per transfer
    pub data_len: u8,
    /// Single-bit fields
    pub flags: ControlFlags,
}

impl ControlWord {
    /// Packs the fields into the register word.
    pub const fn bits(&self) -> u16 {
        self.flags.bits() | self.data_len as u16
    }

    /// Unpacks a raw register word. Bits above 13 are ignored.
    pub const fn from_bits(raw: u16) -> Self {
        Self {
            data_len: (raw & 0xFF) as u8,
            flags: ControlFlags::from_bits_truncate(raw),
        }
    }
}

impl Register for ControlWord {
    const NAME: &'static str = "ctrl";
}

impl FromByteArray for ControlWord {
    type Error = Infallible;
    type Array = Word;

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let raw = u32::from_be_bytes(bytes) & CONTROL_MASK;
        Ok(Self::from_bits(raw as u16))
    }
}

impl ToByteArray for ControlWord {
    type Error = Infallible;
    type Array = Word;

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok((self.bits() as u32).to_be_bytes())
    }
}

/// Clock divider register (name: `divider`)
///
/// SCLK = f(wishbone) / ((divider + 1) * 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDivider {
    pub value: u32,
}

impl Register for ClockDivider {
    const NAME: &'static str = "divider";
}

impl FromByteArray for ClockDivider {
    type Error = Infallible;
    type Array = Word;

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u32::from_be_bytes(bytes),
        })
    }
}

impl ToByteArray for ClockDivider {
    type Error = Infallible;
    type Array = Word;

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.value.to_be_bytes())
    }
}

/// Slave select register (name: `ss`)
///
/// One bit per slave select line. Only drives the lines while
/// [`ControlFlags::ASS`] is clear; with ASS set the core asserts the
/// selected lines by itself for the duration of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlaveSelect {
    pub mask: u8,
}

impl Register for SlaveSelect {
    const NAME: &'static str = "ss";
}

impl FromByteArray for SlaveSelect {
    type Error = Infallible;
    type Array = Word;

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { mask: bytes[3] })
    }
}

impl ToByteArray for SlaveSelect {
    type Error = Infallible;
    type Array = Word;

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok((self.mask as u32).to_be_bytes())
    }
}

/// Name of the data register behind `channel` (`d0` .. `d7`)
pub const fn data_register_name(channel: Channel) -> &'static str {
    match channel {
        Channel::Ch0 => "d0",
        Channel::Ch1 => "d1",
        Channel::Ch2 => "d2",
        Channel::Ch3 => "d3",
        Channel::Ch4 => "d4",
        Channel::Ch5 => "d5",
        Channel::Ch6 => "d6",
        Channel::Ch7 => "d7",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(ass: u16, ie: u16, lsb: u16, tx: u16, rx: u16, go: u16, len: u16) -> u16 {
        (ass << 13) | (ie << 12) | (lsb << 11) | (tx << 10) | (rx << 9) | (go << 8) | len
    }

    #[test]
    fn packing_matches_field_layout() {
        let flags = [
            ControlFlags::ASS,
            ControlFlags::IE,
            ControlFlags::LSB,
            ControlFlags::TX_NEG,
            ControlFlags::RX_NEG,
            ControlFlags::GO_BUSY,
        ];
        for combo in 0u16..64 {
            for len in [0u8, 1, 16, 0x7F, 0xFF] {
                let mut word = ControlWord {
                    data_len: len,
                    flags: ControlFlags::empty(),
                };
                for (i, flag) in flags.iter().enumerate() {
                    word.flags.set(*flag, combo & (1 << i) != 0);
                }
                let bit = |i: usize| (combo >> i) & 1;
                assert_eq!(
                    word.bits(),
                    pack(bit(0), bit(1), bit(2), bit(3), bit(4), bit(5), len as u16)
                );
            }
        }
    }

    #[test]
    fn decode_ignores_upper_bits() {
        let word = ControlWord::from_bytes(0xFFFF_2010u32.to_be_bytes()).unwrap();
        assert_eq!(word.data_len, 0x10);
        assert_eq!(word.flags, ControlFlags::ASS);
        assert_eq!(word.bits(), 0x2010);
    }

    #[test]
    fn control_word_is_one_bus_word() {
        let word = ControlWord {
            data_len: 16,
            flags: ControlFlags::ASS | ControlFlags::GO_BUSY,
        };
        assert_eq!(word.to_bytes().unwrap(), [0x00, 0x00, 0x21, 0x10]);
    }

    #[test]
    fn data_register_names() {
        assert_eq!(data_register_name(Channel::Ch0), "d0");
        assert_eq!(data_register_name(Channel::Ch7), "d7");
    }
}
