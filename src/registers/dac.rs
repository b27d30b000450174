//! DAC8568 interface registers
//!
//! Two DAC8568 octal 16-bit DACs bias the sensor. Each one sits behind its
//! own FPGA block (`dac8568_dev0.`, `dac8568_dev1.`) that serializes the
//! channel words to the DAC when a conversion is started.

use core::convert::Infallible;

use regiface::{FromByteArray, ToByteArray};

use super::{Channel, Register, Word};

/// Internal reference voltage of the DAC8568, in volts
pub const DAC8568_REF_VOLT: f64 = 2.5;

/// Reset of the DAC interface (name: `rst_n`), pulse only
#[derive(Debug, Clone, Copy)]
pub struct DacReset;

impl Register for DacReset {
    const NAME: &'static str = "rst_n";
}

/// Starts shifting the channel words to the DAC (name: `start`), pulse only
#[derive(Debug, Clone, Copy)]
pub struct DacStart;

impl Register for DacStart {
    const NAME: &'static str = "start";
}

/// Channel map of the next conversion (name: `sel_ch`)
///
/// Bit `n` selects output `n`; `0xFF` updates all eight outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSelect {
    pub mask: u8,
}

impl Register for ChannelSelect {
    const NAME: &'static str = "sel_ch";
}

impl ToByteArray for ChannelSelect {
    type Error = Infallible;
    type Array = Word;

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok((self.mask as u32).to_be_bytes())
    }
}

/// Conversion in progress (name: `busy`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DacBusy {
    pub raw: u32,
}

impl DacBusy {
    pub const fn is_busy(&self) -> bool {
        self.raw == 1
    }
}

impl Register for DacBusy {
    const NAME: &'static str = "busy";
}

impl FromByteArray for DacBusy {
    type Error = Infallible;
    type Array = Word;

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            raw: u32::from_be_bytes(bytes),
        })
    }
}

/// Name of the 16-bit code register of output `channel` (`data_ch0` .. `data_ch7`)
pub const fn dac_data_register_name(channel: Channel) -> &'static str {
    match channel {
        Channel::Ch0 => "data_ch0",
        Channel::Ch1 => "data_ch1",
        Channel::Ch2 => "data_ch2",
        Channel::Ch3 => "data_ch3",
        Channel::Ch4 => "data_ch4",
        Channel::Ch5 => "data_ch5",
        Channel::Ch6 => "data_ch6",
        Channel::Ch7 => "data_ch7",
    }
}
