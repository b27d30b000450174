//! Typed register access over a register link
//!
//! `Device<LINK>` wraps a [`RegisterLink`] and converts typed register values
//! to and from bus words. It provides methods for:
//! - Writing and reading typed registers
//! - Pulsing edge-triggered registers
//! - Writing and reading raw words of registers named at runtime
//!
//! # Example
//! ```no_run
//! use jadepix_frontend::{registers::{ClockDivider, SPI_BASE}, Device, RegisterLink};
//!
//! fn divider<L: RegisterLink>(link: L) -> Result<u32, jadepix_frontend::Error<L::Error>> {
//!     let mut device = Device::new(link);
//!     device.write_register(SPI_BASE, ClockDivider { value: 4 }, true)?;
//!     Ok(device.read_register::<ClockDivider>(SPI_BASE)?.value)
//! }
//! ```

use core::convert::Infallible;

use regiface::{FromByteArray, ToByteArray};

use crate::registers::{Register, Word};
use crate::{Error, RegisterLink};

/// Register-level interface to one FPGA.
///
/// The register base is passed on every access, so a single device can reach
/// every block of the address table.
pub struct Device<LINK> {
    link: LINK,
}

impl<LINK> Device<LINK> {
    /// Creates a new Device instance wrapping the provided register link.
    pub fn new(link: LINK) -> Self {
        Self { link }
    }

    /// Releases the underlying register link.
    pub fn release(self) -> LINK {
        self.link
    }

    /// Direct access to the underlying register link.
    pub fn link_mut(&mut self) -> &mut LINK {
        &mut self.link
    }
}

impl<LINK> Device<LINK>
where
    LINK: RegisterLink,
{
    /// Writes a typed register.
    ///
    /// # Errors
    /// * `Error::Transport` - the link rejected or failed the write
    pub fn write_register<R>(
        &mut self,
        base: &str,
        register: R,
        dispatch: bool,
    ) -> Result<(), Error<LINK::Error>>
    where
        R: Register + ToByteArray<Array = Word, Error = Infallible>,
    {
        let raw = register.to_bytes().unwrap_or_else(|never| match never {});
        self.write_word(base, R::NAME, u32::from_be_bytes(raw), dispatch)
    }

    /// Reads a typed register.
    ///
    /// # Errors
    /// * `Error::Transport` - the link rejected or failed the read
    pub fn read_register<R>(&mut self, base: &str) -> Result<R, Error<LINK::Error>>
    where
        R: Register + FromByteArray<Array = Word, Error = Infallible>,
    {
        let raw = self.read_word(base, R::NAME)?;
        Ok(R::from_bytes(raw.to_be_bytes()).unwrap_or_else(|never| match never {}))
    }

    /// Sends a 0, 1, 0 pulse to an edge-triggered register.
    pub fn pulse<R>(&mut self, base: &str, dispatch: bool) -> Result<(), Error<LINK::Error>>
    where
        R: Register,
    {
        log::trace!("pulse {}{}", base, R::NAME);
        self.link
            .write(base, R::NAME, 0, true, dispatch)
            .map_err(Error::Transport)
    }

    /// Writes a raw word to a register named at runtime.
    pub fn write_word(
        &mut self,
        base: &str,
        name: &str,
        value: u32,
        dispatch: bool,
    ) -> Result<(), Error<LINK::Error>> {
        log::trace!("write {}{} <- {:#010x}", base, name, value);
        self.link
            .write(base, name, value, false, dispatch)
            .map_err(Error::Transport)
    }

    /// Reads a raw word from a register named at runtime.
    pub fn read_word(&mut self, base: &str, name: &str) -> Result<u32, Error<LINK::Error>> {
        let value = self.link.read(base, name).map_err(Error::Transport)?;
        log::trace!("read {}{} -> {:#010x}", base, name, value);
        Ok(value)
    }
}
