//! CEE pixel configurator
//!
//! Programs the CEE pixel chip through the FPGA SPI master. One pixel is
//! configured with three write transactions, issued back to back:
//!
//! 1. [`PixelAddress`] (0x20): which pixel
//! 2. [`PixelDacLow`] (0x21): low 8 bits of its trim DAC
//! 3. [`PixelControl`] (0x22): enables, mask and high 4 bits of the trim DAC
//!
//! # Important Notes
//! - The configurator never waits for a transfer to finish before starting
//!   the next one. Whether the bus round trip of the start write is always
//!   longer than a transfer has not been established; callers that need a
//!   guarantee can call [`wait_idle`](CeeConfigurator::wait_idle) between
//!   operations.
//! - A failure part way through [`configure_pixel`](CeeConfigurator::configure_pixel)
//!   leaves the transactions already sent applied; nothing is rolled back.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use regiface::WritableRegister;

use crate::transaction::{self, Direction, PixelControl, PixelFlags, Transaction};
use crate::transaction::{PixelAddress, PixelDacLow};
use crate::{Error, RegisterLink, SpiConfig, SpiController};

/// Configuration of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelConfig {
    /// Pixel address; only the low 8 bits are sent
    pub address: u16,
    /// High 4 bits of the trim DAC
    pub dac_high: u8,
    /// Low 8 bits of the trim DAC
    pub dac_low: u8,
    pub write_enable: bool,
    pub pulse_enable: bool,
    pub mask: u8,
}

/// Device facade over the SPI master wired to the CEE chip
pub struct CeeConfigurator<LINK> {
    spi: SpiController<LINK>,
    target: &'static str,
}

impl<LINK> CeeConfigurator<LINK>
where
    LINK: RegisterLink,
{
    /// Creates the configurator and applies the default SPI configuration
    /// (16-bit transfers, automatic slave select, divider 4).
    pub fn new(link: LINK) -> Result<Self, Error<LINK::Error>> {
        Self::with_config(link, &SpiConfig::default())
    }

    /// Creates the configurator with an explicit SPI configuration.
    pub fn with_config(link: LINK, config: &SpiConfig) -> Result<Self, Error<LINK::Error>> {
        Self::with_log_target(link, config, module_path!())
    }

    /// Like [`with_config`](CeeConfigurator::with_config), logging under `target`.
    pub fn with_log_target(
        link: LINK,
        config: &SpiConfig,
        target: &'static str,
    ) -> Result<Self, Error<LINK::Error>> {
        let mut spi = SpiController::new(link).with_log_target(target);
        spi.configure(config)?;
        log::info!(target: target, "CEE SPI initial.");
        Ok(Self { spi, target })
    }

    /// Encodes and sends one transaction (`cee_spi_trans`).
    pub fn transaction(
        &mut self,
        direction: Direction,
        address: u8,
        payload: u8,
    ) -> Result<(), Error<LINK::Error>> {
        self.send(Transaction {
            direction,
            address,
            payload,
        })
    }

    /// Sends a write of a typed CEE register.
    pub fn execute<R>(&mut self, register: R) -> Result<(), Error<LINK::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
    {
        self.send(Transaction::from_register(register))
    }

    /// Sends one transaction without waiting for it to finish.
    pub fn send(&mut self, transaction: Transaction) -> Result<(), Error<LINK::Error>> {
        let word = transaction.word();
        log::debug!(
            target: self.target,
            "CEE transaction {:?} {:#04x} <- {:#04x} ({:#06x})",
            transaction.direction,
            transaction.address,
            transaction.payload,
            word
        );
        transaction::transmit(&mut self.spi, word)
    }

    /// Configures one pixel with three transactions.
    ///
    /// `address` is truncated to its low 8 bits. `dac_high4` must fit in 4
    /// bits and `mask` in 2 bits, otherwise they corrupt the enable bits.
    pub fn configure_pixel(
        &mut self,
        address: u16,
        dac_high4: u8,
        dac_low8: u8,
        write_enable: bool,
        pulse_enable: bool,
        mask: u8,
    ) -> Result<(), Error<LINK::Error>> {
        let mut flags = PixelFlags::empty();
        flags.set(PixelFlags::WRITE_ENABLE, write_enable);
        flags.set(PixelFlags::PULSE_ENABLE, pulse_enable);

        self.execute(PixelAddress {
            address: address as u8,
        })?;
        self.execute(PixelDacLow { value: dac_low8 })?;
        self.execute(PixelControl {
            flags,
            mask,
            dac_high: dac_high4,
        })
    }

    /// Configures one pixel from a [`PixelConfig`].
    pub fn configure(&mut self, pixel: &PixelConfig) -> Result<(), Error<LINK::Error>> {
        self.configure_pixel(
            pixel.address,
            pixel.dac_high,
            pixel.dac_low,
            pixel.write_enable,
            pixel.pulse_enable,
            pixel.mask,
        )
    }

    /// Whether the SPI master is shifting a transaction.
    pub fn is_busy(&mut self) -> Result<bool, Error<LINK::Error>> {
        self.spi.is_busy()
    }

    /// Polls until the SPI master is idle. See [`SpiController::wait_idle`].
    pub fn wait_idle<D: DelayNs>(
        &mut self,
        delay: &mut D,
        poll_interval_us: u32,
        max_polls: u32,
    ) -> Result<(), Error<LINK::Error>> {
        self.spi.wait_idle(delay, poll_interval_us, max_polls)
    }

    /// Pulses the SPI master reset. The held configuration is not rewritten;
    /// follow with [`resync`](CeeConfigurator::resync).
    pub fn reset(&mut self) -> Result<(), Error<LINK::Error>> {
        self.spi.reset()
    }

    /// Rewrites the held SPI configuration to the hardware.
    pub fn resync(&mut self) -> Result<(), Error<LINK::Error>> {
        self.spi.resync()
    }
}

impl<LINK> CeeConfigurator<LINK> {
    pub fn controller(&self) -> &SpiController<LINK> {
        &self.spi
    }

    pub fn controller_mut(&mut self) -> &mut SpiController<LINK> {
        &mut self.spi
    }

    /// Releases the underlying register link.
    pub fn release(self) -> LINK {
        self.spi.release()
    }
}
