//! CEE configuration status registers
//!
//! The CEE pixel configurator exposes the busy status and the reset of its
//! SPI master at the top level of the address table, without a block prefix.

use core::convert::Infallible;

use regiface::FromByteArray;

use super::{Register, Word};

/// Base of the CEE status registers
pub const CEE_BASE: &str = "";

/// SPI busy status (name: `BUSY`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CeeBusy {
    /// Raw register content
    pub raw: u32,
}

impl CeeBusy {
    /// The transfer is running only when the register reads exactly 1.
    /// Any other value, including other non-zero values, is idle.
    pub const fn is_busy(&self) -> bool {
        self.raw == 1
    }
}

impl Register for CeeBusy {
    const NAME: &'static str = "BUSY";
}

impl FromByteArray for CeeBusy {
    type Error = Infallible;
    type Array = Word;

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            raw: u32::from_be_bytes(bytes),
        })
    }
}

/// SPI master reset (name: `RST`), pulse only
#[derive(Debug, Clone, Copy)]
pub struct CeeReset;

impl Register for CeeReset {
    const NAME: &'static str = "RST";
}
