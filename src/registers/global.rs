//! Global FPGA control registers (`global_dev.`)

use core::convert::Infallible;

use regiface::ToByteArray;

use super::{Register, Word};

/// Base of the global control block
pub const GLOBAL_BASE: &str = "global_dev.";

/// Synchronous reset of every clock domain (name: `nuke`), pulse only
#[derive(Debug, Clone, Copy)]
pub struct Nuke;

impl Register for Nuke {
    const NAME: &'static str = "nuke";
}

/// Synchronous reset of the IPbus clock domain, 31.25 MHz (name: `soft_rst`), pulse only
#[derive(Debug, Clone, Copy)]
pub struct SoftReset;

impl Register for SoftReset {
    const NAME: &'static str = "soft_rst";
}

/// Index of the DAC8568 routed to the shared serial lines (name: `dac_nr`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DacNumber {
    pub value: u32,
}

impl Register for DacNumber {
    const NAME: &'static str = "dac_nr";
}

impl ToByteArray for DacNumber {
    type Error = Infallible;
    type Array = Word;

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.value.to_be_bytes())
    }
}
