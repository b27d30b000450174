//! SPI master controller
//!
//! Drives the wishbone SPI master core in the FPGA. The controller keeps a
//! copy of every field of the control word in memory; field setters only
//! update that copy, and the whole word reaches the hardware when
//! [`write_control`](SpiController::write_control) or
//! [`start`](SpiController::start) is called. The bus cannot write single
//! bits of the control register, so the word is always recomputed as a whole.
//!
//! # Transfer protocol
//! 1. Fill the data bank (`d0` .. `d7`)
//! 2. Write the control word
//! 3. [`start`](SpiController::start): write the control word with GO_BSY set
//!
//! The core clears GO_BSY when `data_len` bits have been shifted. Nothing in
//! the controller waits for that by default; callers that need to serialize
//! transfers can poll [`is_busy`](SpiController::is_busy) or use
//! [`wait_idle`](SpiController::wait_idle).
//!
//! # Reset
//! [`reset`](SpiController::reset) only pulses the hardware reset. The copy
//! held in memory is left untouched and no longer matches the hardware
//! afterwards; call [`resync`](SpiController::resync) or
//! [`configure`](SpiController::configure) to bring them back in line.

use embedded_hal::delay::DelayNs;

use crate::registers::{
    data_register_name, CeeBusy, CeeReset, Channel, ClockDivider, ControlFlags, ControlWord,
    SlaveSelect, CEE_BASE, SPI_BASE,
};
use crate::{Device, Error, RegisterLink};

/// Number of data registers in the bank
pub const DATA_BANK_LEN: usize = 8;

/// Full SPI master configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Bits shifted per transfer
    pub data_len: u8,
    /// Raise the interrupt output when a transfer completes
    pub interrupt_enable: bool,
    /// Drive slave select automatically
    pub auto_slave_select: bool,
    /// Shift LSB first
    pub lsb_first: bool,
    /// Sample MISO on the falling edge
    pub rx_negedge: bool,
    /// Drive MOSI on the falling edge
    pub tx_negedge: bool,
    /// Clock divider
    pub divider: u32,
    /// Slave select mask
    pub slave_select: u8,
}

impl Default for SpiConfig {
    /// 16-bit MSB-first transfers on rising edges, automatic slave select,
    /// divider 4.
    fn default() -> Self {
        Self {
            data_len: 16,
            interrupt_enable: false,
            auto_slave_select: true,
            lsb_first: false,
            rx_negedge: false,
            tx_negedge: false,
            divider: 4,
            slave_select: 0x00,
        }
    }
}

/// Stateful driver of one SPI master core.
pub struct SpiController<LINK> {
    device: Device<LINK>,
    control: ControlWord,
    divider: u32,
    slave_select: u8,
    data: [u16; DATA_BANK_LEN],
    target: &'static str,
}

impl<LINK> SpiController<LINK> {
    /// Creates a controller holding the default configuration in memory.
    ///
    /// Nothing is written to the hardware; use
    /// [`configure`](SpiController::configure) to apply a configuration.
    pub fn new(link: LINK) -> Self {
        let config = SpiConfig::default();
        let mut flags = ControlFlags::empty();
        flags.set(ControlFlags::ASS, config.auto_slave_select);
        Self {
            device: Device::new(link),
            control: ControlWord {
                data_len: config.data_len,
                flags,
            },
            divider: config.divider,
            slave_select: config.slave_select,
            data: [0; DATA_BANK_LEN],
            target: module_path!(),
        }
    }

    /// Sets the `log` target used for this controller's diagnostics.
    pub fn with_log_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// The control word as currently held in memory
    pub fn control_word(&self) -> ControlWord {
        self.control
    }

    /// The data bank as currently held in memory
    pub fn data_bank(&self) -> &[u16; DATA_BANK_LEN] {
        &self.data
    }

    /// Stores `value` in one slot of the in-memory data bank.
    pub fn set_data_slot(&mut self, channel: Channel, value: u16) {
        self.data[channel.index()] = value;
    }

    /// Releases the underlying register link.
    pub fn release(self) -> LINK {
        self.device.release()
    }

    /// Latch MISO on the falling (`true`) or rising (`false`) SCLK edge.
    pub fn set_rx_negedge(&mut self, falling: bool) {
        self.control.flags.set(ControlFlags::RX_NEG, falling);
        log::debug!(
            target: self.target,
            "MISO is latched on the {} edge of SCLK",
            edge_name(falling)
        );
        self.update_control();
    }

    /// Change MOSI on the falling (`true`) or rising (`false`) SCLK edge.
    pub fn set_tx_negedge(&mut self, falling: bool) {
        self.control.flags.set(ControlFlags::TX_NEG, falling);
        log::debug!(
            target: self.target,
            "MOSI is changed on the {} edge of SCLK",
            edge_name(falling)
        );
        self.update_control();
    }

    /// Shift LSB (`true`) or MSB (`false`) first, in both directions.
    pub fn set_lsb_first(&mut self, lsb_first: bool) {
        self.control.flags.set(ControlFlags::LSB, lsb_first);
        log::debug!(
            target: self.target,
            "The {} is sent first on the line",
            if lsb_first { "LSB" } else { "MSB" }
        );
        self.update_control();
    }

    /// Raise the interrupt output after each transfer.
    pub fn set_interrupt_enable(&mut self, enabled: bool) {
        self.control.flags.set(ControlFlags::IE, enabled);
        if enabled {
            log::debug!(
                target: self.target,
                "The interrupt output is set active after a transfer is finished"
            );
        } else {
            log::warn!(target: self.target, "Interrupt output disabled");
        }
        self.update_control();
    }

    /// Generate slave select automatically (`true`), or leave it to the `ss`
    /// register (`false`).
    pub fn set_auto_slave_select(&mut self, enabled: bool) {
        self.control.flags.set(ControlFlags::ASS, enabled);
        if enabled {
            log::debug!(target: self.target, "Slave select is generated automatically");
        } else {
            log::warn!(
                target: self.target,
                "Slave select is asserted and de-asserted by writing the ss register"
            );
        }
        self.update_control();
    }

    /// Sets the GO_BSY field in memory. Writing 0 to this bit has no effect on
    /// the hardware.
    pub fn set_go_busy(&mut self, go: bool) {
        self.control.flags.set(ControlFlags::GO_BUSY, go);
        if go {
            log::debug!(target: self.target, "Starts the transfer");
        } else {
            log::warn!(target: self.target, "Writing 0 to GO_BSY has no effect");
        }
        self.update_control();
    }

    fn update_control(&self) {
        log::debug!(
            target: self.target,
            "Control register is updated to: {:#010x}",
            self.control.bits()
        );
    }
}

impl<LINK> SpiController<LINK>
where
    LINK: RegisterLink,
{
    /// Sets how many bits are transmitted in one transfer.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - `data_len` above 255
    pub fn set_data_length(&mut self, data_len: u32) -> Result<(), Error<LINK::Error>> {
        Error::<LINK::Error>::check_range("data_len", data_len, u8::MAX as u32)?;
        self.control.data_len = data_len as u8;
        log::debug!(
            target: self.target,
            "Set how many bits are transmitted in one transfer: {}",
            data_len
        );
        self.update_control();
        Ok(())
    }

    /// Applies a full configuration to the hardware.
    ///
    /// Sets every control field, writes and reads back the clock divider,
    /// writes the control word, then the slave select mask.
    pub fn configure(&mut self, config: &SpiConfig) -> Result<(), Error<LINK::Error>> {
        self.set_data_length(config.data_len as u32)?;
        self.set_interrupt_enable(config.interrupt_enable);
        self.set_auto_slave_select(config.auto_slave_select);
        self.set_lsb_first(config.lsb_first);
        self.set_rx_negedge(config.rx_negedge);
        self.set_tx_negedge(config.tx_negedge);
        self.set_clock_divider(config.divider)?;
        self.clock_divider()?;
        self.write_control(true)?;
        self.set_slave_select(config.slave_select)
    }

    /// Writes the in-memory control word to the hardware.
    pub fn write_control(&mut self, dispatch: bool) -> Result<(), Error<LINK::Error>> {
        self.device.write_register(SPI_BASE, self.control, dispatch)
    }

    /// Reads the control register back from the hardware.
    pub fn read_control(&mut self) -> Result<ControlWord, Error<LINK::Error>> {
        let word: ControlWord = self.device.read_register(SPI_BASE)?;
        log::debug!(
            target: self.target,
            "SPI control register is: {:#010x}",
            word.bits()
        );
        Ok(word)
    }

    /// Writes the clock divider register.
    pub fn set_clock_divider(&mut self, divider: u32) -> Result<(), Error<LINK::Error>> {
        let register = ClockDivider { value: divider };
        self.device.write_register(SPI_BASE, register, true)?;
        self.divider = divider;
        Ok(())
    }

    /// Reads the clock divider register.
    pub fn clock_divider(&mut self) -> Result<u32, Error<LINK::Error>> {
        let divider: ClockDivider = self.device.read_register(SPI_BASE)?;
        log::debug!(target: self.target, "SPI clock divider val: {}", divider.value);
        Ok(divider.value)
    }

    /// Writes the slave select register.
    pub fn set_slave_select(&mut self, mask: u8) -> Result<(), Error<LINK::Error>> {
        let register = SlaveSelect { mask };
        self.device.write_register(SPI_BASE, register, true)?;
        self.slave_select = mask;
        Ok(())
    }

    /// Reads the slave select register.
    pub fn slave_select(&mut self) -> Result<u8, Error<LINK::Error>> {
        let ss: SlaveSelect = self.device.read_register(SPI_BASE)?;
        log::debug!(target: self.target, "SPI ss val: {}", ss.mask);
        Ok(ss.mask)
    }

    /// Writes one data register, dispatched.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - `channel` above 7
    pub fn write_data(&mut self, channel: usize, value: u16) -> Result<(), Error<LINK::Error>> {
        let channel = checked_channel::<LINK::Error>(channel)?;
        self.data[channel.index()] = value;
        self.device
            .write_word(SPI_BASE, data_register_name(channel), value as u32, true)
    }

    /// Reads one data register.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - `channel` above 7
    pub fn read_data(&mut self, channel: usize) -> Result<u32, Error<LINK::Error>> {
        let channel = checked_channel::<LINK::Error>(channel)?;
        let value = self
            .device
            .read_word(SPI_BASE, data_register_name(channel))?;
        log::debug!(
            target: self.target,
            "SPI data register channel {} val: {:#010x}",
            channel.index(),
            value
        );
        Ok(value)
    }

    /// Replaces the data bank and writes all of it, `d0` first.
    ///
    /// Each register is dispatched on its own so slot order is kept on the bus.
    pub fn write_data_bank(
        &mut self,
        words: [u16; DATA_BANK_LEN],
    ) -> Result<(), Error<LINK::Error>> {
        self.data = words;
        self.flush_data_bank()
    }

    /// Writes the in-memory data bank, `d0` first.
    pub fn flush_data_bank(&mut self) -> Result<(), Error<LINK::Error>> {
        for channel in Channel::ALL {
            let value = self.data[channel.index()];
            self.device
                .write_word(SPI_BASE, data_register_name(channel), value as u32, true)?;
            log::debug!(
                target: self.target,
                "Write d{} : {:#010x}",
                channel.index(),
                value
            );
        }
        Ok(())
    }

    /// Starts a transfer: sets GO_BSY and writes the control word, dispatched.
    pub fn start(&mut self) -> Result<(), Error<LINK::Error>> {
        self.set_go_busy(true);
        self.write_control(true)
    }

    /// Whether a transfer is in progress.
    ///
    /// Only a raw status of exactly 1 counts as busy.
    pub fn is_busy(&mut self) -> Result<bool, Error<LINK::Error>> {
        let status: CeeBusy = self.device.read_register(CEE_BASE)?;
        Ok(status.is_busy())
    }

    /// Polls the busy status until it clears.
    ///
    /// Checks up to `max_polls` times, sleeping `poll_interval_us` between
    /// checks.
    ///
    /// # Errors
    /// * `Error::Timeout` - still busy after `max_polls` checks
    pub fn wait_idle<D: DelayNs>(
        &mut self,
        delay: &mut D,
        poll_interval_us: u32,
        max_polls: u32,
    ) -> Result<(), Error<LINK::Error>> {
        for _ in 0..max_polls {
            if !self.is_busy()? {
                return Ok(());
            }
            delay.delay_us(poll_interval_us);
        }
        log::warn!(target: self.target, "SPI still busy after {} polls", max_polls);
        Err(Error::Timeout)
    }

    /// Pulses the SPI master reset.
    ///
    /// The in-memory configuration is kept as is; see
    /// [`resync`](SpiController::resync).
    pub fn reset(&mut self) -> Result<(), Error<LINK::Error>> {
        log::debug!(target: self.target, "SPI reset");
        self.device.pulse::<CeeReset>(CEE_BASE, true)
    }

    /// Rewrites the in-memory configuration to the hardware, typically after
    /// [`reset`](SpiController::reset).
    ///
    /// GO_BSY is cleared first so no transfer is started.
    pub fn resync(&mut self) -> Result<(), Error<LINK::Error>> {
        self.control.flags.remove(ControlFlags::GO_BUSY);
        self.update_control();
        self.set_clock_divider(self.divider)?;
        self.write_control(true)?;
        self.set_slave_select(self.slave_select)
    }
}

fn checked_channel<E>(channel: usize) -> Result<Channel, Error<E>> {
    Channel::try_from(channel).map_err(|_| Error::OutOfRange {
        field: "chn",
        value: channel as u32,
        max: (DATA_BANK_LEN - 1) as u32,
    })
}

fn edge_name(falling: bool) -> &'static str {
    if falling {
        "falling"
    } else {
        "rising"
    }
}
