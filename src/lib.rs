#![cfg_attr(not(test), no_std)]
//! JadePix3 Front-end Configuration
//!
//! This crate configures the front-end of the JadePix3 pixel detector DAQ
//! through the registers of its FPGA. The FPGA hosts:
//! - A wishbone SPI master wired to the CEE pixel configuration chip
//! - Two DAC8568 octal 16-bit DAC interfaces for the sensor biases
//! - Global reset and routing control
//!
//! # Architecture
//! The crate is organized into several modules:
//!
//! - [`link`]: The [`RegisterLink`] transport trait
//!   - Named register reads and writes, pulses and dispatch
//!   - Implemented outside this crate (IPbus in the DAQ)
//!
//! - [`device`]: Typed register access on top of a link
//!
//! - [`registers`]: Register definitions per FPGA block
//!   - SPI master control word, clock divider, slave select, data bank
//!   - CEE status, DAC8568 and global control registers
//!
//! - [`spi`]: The SPI master controller
//! - [`transaction`]: CEE transaction encoding and transmission
//! - [`cee`]: The pixel configurator built on the two above
//! - [`dac`] and [`global`]: DAC8568 and global control devices
//!
//! # Usage
//! Data only flows towards the hardware: pixel configurator, transaction,
//! SPI controller, register link. The only values read back are status and
//! register readbacks.
//!
//! Bring-up follows a specific sequence:
//!
//! 1. Soft reset the FPGA
//! 2. Route and program each DAC8568
//! 3. Create the [`CeeConfigurator`], which applies the SPI configuration
//! 4. Configure pixels
//!
//! # Important Notes
//! - Nothing is persisted; every process start must configure from defaults
//! - SPI transfers are fire-and-forget; see [`cee`] for the busy handling
//! - An SPI reset does not reset the configuration held in memory
//!
//! # Example
//! ```no_run
//! use jadepix_frontend::{CeeConfigurator, Dac8568, DacIndex, Error, GlobalDevice, RegisterLink};
//!
//! fn bring_up<L: RegisterLink>(link: &mut L) -> Result<(), Error<L::Error>> {
//!     GlobalDevice::new(&mut *link).soft_reset()?;
//!
//!     GlobalDevice::new(&mut *link).set_dac_nr(0)?;
//!     let mut dac = Dac8568::new(&mut *link, DacIndex::Dev0);
//!     dac.reset()?;
//!     dac.select_channels(0xFF)?;
//!     dac.set_voltage(0, 1.0)?;
//!     dac.start_conversion()?;
//!
//!     let mut cee = CeeConfigurator::new(&mut *link)?;
//!     cee.configure_pixel(1, 0x0, 0x0f, true, true, 0)?;
//!     Ok(())
//! }
//! ```

pub mod cee;
pub mod dac;
pub mod device;
pub mod error;
pub mod global;
pub mod link;
pub mod registers;
pub mod spi;
pub mod transaction;

pub use cee::{CeeConfigurator, PixelConfig};
pub use dac::{Dac8568, DacIndex};
pub use device::Device;
pub use error::Error;
pub use global::GlobalDevice;
pub use link::RegisterLink;
pub use spi::{SpiConfig, SpiController};
pub use transaction::{encode, Direction, Transaction};
