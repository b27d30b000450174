//! CEE configuration transactions
//!
//! The CEE pixel chip is configured through 16-bit SPI words:
//!
//! ```text
//!  15 | 14 .. 8 | 7 .. 0
//!  RW | address | payload
//! ```
//!
//! RW is 0 for a write. A transaction is encoded, placed in data slot 0 of the
//! SPI master, and shifted out by starting a transfer. Transfers are
//! fire-and-forget: [`transmit`] returns as soon as the start has been
//! dispatched, without polling the busy status.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, ToByteArray, WritableRegister};

use crate::registers::Channel;
use crate::{Error, RegisterLink, SpiController};

const ADDRESS_MASK: u8 = 0x7F;

/// Transfer direction, bit 15 of the word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write = 0,
    Read = 1,
}

impl Direction {
    /// 0 is a write, any other value a read.
    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Direction::Write
        } else {
            Direction::Read
        }
    }
}

/// Encodes one transaction word.
///
/// `address` is truncated to 7 bits.
pub const fn encode(direction: Direction, address: u8, payload: u8) -> u16 {
    ((direction as u16) << 15) | (((address & ADDRESS_MASK) as u16) << 8) | payload as u16
}

/// One CEE register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transaction {
    pub direction: Direction,
    /// 7-bit register address
    pub address: u8,
    pub payload: u8,
}

impl Transaction {
    pub const fn write(address: u8, payload: u8) -> Self {
        Self {
            direction: Direction::Write,
            address,
            payload,
        }
    }

    pub const fn read(address: u8) -> Self {
        Self {
            direction: Direction::Read,
            address,
            payload: 0,
        }
    }

    /// The 16-bit word shifted to the chip
    pub const fn word(&self) -> u16 {
        encode(self.direction, self.address, self.payload)
    }
}

impl Transaction {
    /// Write transaction carrying a typed CEE register value.
    ///
    /// The register id is the 7-bit address and the single byte from
    /// [`ToByteArray`] is the payload.
    pub fn from_register<R>(register: R) -> Self
    where
        R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
    {
        let [payload] = register.to_bytes().unwrap_or_else(|never| match never {});
        Transaction::write(R::writeable_id(), payload)
    }
}

/// Pixel address register (address: 0x20)
///
/// Selects the pixel the following DAC and control writes apply to. Only the
/// low 8 bits of the pixel address fit.
#[register(0x20u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct PixelAddress {
    pub address: u8,
}

impl ToByteArray for PixelAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address])
    }
}

/// Low 8 bits of the pixel trim DAC (address: 0x21)
#[register(0x21u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
pub struct PixelDacLow {
    pub value: u8,
}

impl ToByteArray for PixelDacLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

bitflags! {
    /// Pixel enable bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PixelFlags: u8 {
        /// Latch this configuration into the pixel
        const WRITE_ENABLE = 1 << 7;
        /// Route the test pulse to the pixel
        const PULSE_ENABLE = 1 << 6;
    }
}

/// Pixel control register (address: 0x22)
///
/// Payload:
/// - Bits 7: write enable
/// - Bits 6: pulse enable
/// - Bits 5:4: mask
/// - Bits 3:0: high 4 bits of the trim DAC
///
/// `mask` and `dac_high` are not range checked: a `dac_high` above 0xF or a
/// `mask` above 0x3 spills into the neighbouring fields.
#[register(0x22u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, WritableRegister)]
pub struct PixelControl {
    pub flags: PixelFlags,
    pub mask: u8,
    pub dac_high: u8,
}

impl ToByteArray for PixelControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits() | (self.mask << 4) | self.dac_high])
    }
}

/// Shifts one transaction word out through the SPI master.
///
/// Places `word` in data slot 0, writes the whole data bank (slots 1 to 7
/// keep whatever they last held), writes the control word and starts the
/// transfer. Does not wait for the transfer to finish.
pub fn transmit<LINK>(spi: &mut SpiController<LINK>, word: u16) -> Result<(), Error<LINK::Error>>
where
    LINK: RegisterLink,
{
    spi.set_data_slot(Channel::Ch0, word);
    spi.flush_data_bank()?;
    spi.write_control(true)?;
    spi.start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::mock::MockLink;

    #[test]
    fn encodes_reference_words() {
        assert_eq!(encode(Direction::Write, 0x20, 0x01), 0x2001);
        assert_eq!(encode(Direction::Write, 0x01, 0x00), 0x0100);
        assert_eq!(encode(Direction::Read, 0x22, 0xC0), 0xA2C0);
    }

    #[test]
    fn address_is_truncated_to_seven_bits() {
        assert_eq!(encode(Direction::Write, 0xA0, 0x01), 0x2001);
        assert_eq!(Transaction::write(0xFF, 0xFF).word(), 0x7FFF);
    }

    #[test]
    fn direction_from_bit() {
        assert_eq!(Direction::from_bit(0), Direction::Write);
        assert_eq!(Direction::from_bit(1), Direction::Read);
        assert_eq!(Direction::from_bit(7), Direction::Read);
        assert_eq!(Transaction::read(0x21).word(), 0xA100);
    }

    #[test]
    fn register_ids_are_cee_addresses() {
        use regiface::Register;

        assert_eq!(PixelAddress::id(), 0x20);
        assert_eq!(PixelDacLow::id(), 0x21);
        assert_eq!(PixelControl::id(), 0x22);
        assert_eq!(PixelControl::writeable_id(), 0x22);
    }

    #[test]
    fn typed_registers_build_transactions() {
        let address = Transaction::from_register(PixelAddress { address: 1 });
        assert_eq!(address, Transaction::write(0x20, 0x01));
        assert_eq!(address.word(), 0x2001);
        assert_eq!(Transaction::from_register(PixelDacLow { value: 0x0F }).word(), 0x210F);
        let control = PixelControl {
            flags: PixelFlags::WRITE_ENABLE | PixelFlags::PULSE_ENABLE,
            mask: 0,
            dac_high: 0,
        };
        assert_eq!(Transaction::from_register(control).word(), 0x22C0);
    }

    #[test]
    fn control_fields_pack() {
        let control = PixelControl {
            flags: PixelFlags::PULSE_ENABLE,
            mask: 0x2,
            dac_high: 0xA,
        };
        assert_eq!(control.to_bytes().unwrap(), [0x6A]);
    }

    #[test]
    fn oversized_dac_high_spills_into_flags() {
        let control = PixelControl {
            flags: PixelFlags::empty(),
            mask: 0,
            dac_high: 0x8F,
        };
        assert_eq!(control.to_bytes().unwrap(), [0x8F]);
    }

    #[test]
    fn transmit_writes_bank_then_starts() {
        let mut spi = SpiController::new(MockLink::new());
        spi.set_data_slot(Channel::Ch5, 0x5555);
        transmit(&mut spi, 0x2001).unwrap();

        let link = spi.release();
        let expected = [
            "spi_dev.d0",
            "spi_dev.d1",
            "spi_dev.d2",
            "spi_dev.d3",
            "spi_dev.d4",
            "spi_dev.d5",
            "spi_dev.d6",
            "spi_dev.d7",
            "spi_dev.ctrl",
            "spi_dev.ctrl",
        ];
        assert_eq!(link.write_sequence(), expected);
        assert_eq!(link.writes_to("spi_dev.d0"), [0x2001]);
        assert_eq!(link.writes_to("spi_dev.d5"), [0x5555]);
        assert_eq!(link.writes_to("spi_dev.ctrl"), [0x2010, 0x2110]);
        assert!(link.writes_to("BUSY").is_empty());
    }
}
