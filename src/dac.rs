//! DAC8568 bias DAC interface
//!
//! Each DAC8568 provides eight 16-bit outputs referenced to an internal 2.5 V.
//! Output codes are written to the FPGA block first, then a conversion is
//! started to shift the selected channels to the DAC.
//!
//! Both DACs share one set of serial lines; route the one being programmed
//! with [`GlobalDevice::set_dac_nr`](crate::GlobalDevice::set_dac_nr) first.

use crate::registers::{
    dac_data_register_name, Channel, ChannelSelect, DacBusy, DacReset, DacStart, DAC8568_REF_VOLT,
};
use crate::{Device, Error, RegisterLink};

/// Error type for voltages the DAC cannot produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageOutOfRange(pub f64);

/// Which of the two DAC8568 blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacIndex {
    Dev0 = 0,
    Dev1 = 1,
}

impl DacIndex {
    /// Register base of the block
    pub const fn base(self) -> &'static str {
        match self {
            DacIndex::Dev0 => "dac8568_dev0.",
            DacIndex::Dev1 => "dac8568_dev1.",
        }
    }
}

/// Converts an output voltage to a DAC code.
///
/// `code = 65536 * volts / 2.5` computed in double precision and truncated,
/// saturated to `0xFFFF` at the reference.
pub fn voltage_to_code(volts: f64) -> Result<u16, VoltageOutOfRange> {
    if !(0.0..=DAC8568_REF_VOLT).contains(&volts) {
        return Err(VoltageOutOfRange(volts));
    }
    let code = (65536.0 * volts / DAC8568_REF_VOLT) as u32;
    Ok(code.min(u16::MAX as u32) as u16)
}

/// One DAC8568 behind its FPGA block
pub struct Dac8568<LINK> {
    device: Device<LINK>,
    index: DacIndex,
    target: &'static str,
}

impl<LINK> Dac8568<LINK> {
    pub fn new(link: LINK, index: DacIndex) -> Self {
        Self {
            device: Device::new(link),
            index,
            target: module_path!(),
        }
    }

    /// Sets the `log` target used for this DAC's diagnostics.
    pub fn with_log_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    pub fn index(&self) -> DacIndex {
        self.index
    }

    /// Releases the underlying register link.
    pub fn release(self) -> LINK {
        self.device.release()
    }
}

impl<LINK> Dac8568<LINK>
where
    LINK: RegisterLink,
{
    /// Pulses the interface reset.
    pub fn reset(&mut self) -> Result<(), Error<LINK::Error>> {
        self.device.pulse::<DacReset>(self.index.base(), true)
    }

    /// Pulses the conversion start.
    pub fn start_conversion(&mut self) -> Result<(), Error<LINK::Error>> {
        self.device.pulse::<DacStart>(self.index.base(), true)
    }

    /// Selects which outputs the next conversion updates, one bit per channel.
    pub fn select_channels(&mut self, mask: u8) -> Result<(), Error<LINK::Error>> {
        self.device
            .write_register(self.index.base(), ChannelSelect { mask }, true)
    }

    /// Writes the raw 16-bit code of one output.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - `channel` above 7
    pub fn set_data(&mut self, channel: usize, code: u16) -> Result<(), Error<LINK::Error>> {
        let channel = Channel::try_from(channel).map_err(|_| Error::<LINK::Error>::OutOfRange {
            field: "ch",
            value: channel as u32,
            max: 7,
        })?;
        self.device.write_word(
            self.index.base(),
            dac_data_register_name(channel),
            code as u32,
            true,
        )
    }

    /// Writes the code producing `volts` on one output.
    ///
    /// # Errors
    /// * `Error::VoltageOutOfRange` - `volts` negative or above 2.5 V
    /// * `Error::OutOfRange` - `channel` above 7
    pub fn set_voltage(&mut self, channel: usize, volts: f64) -> Result<(), Error<LINK::Error>> {
        let code = voltage_to_code(volts).map_err(|VoltageOutOfRange(volts)| {
            Error::<LINK::Error>::VoltageOutOfRange { volts }
        })?;
        log::debug!(
            target: self.target,
            "Convert analog to digital: {} {}",
            volts,
            code
        );
        self.set_data(channel, code)
    }

    /// Whether a conversion is in progress (raw status exactly 1).
    pub fn is_busy(&mut self) -> Result<bool, Error<LINK::Error>> {
        let status: DacBusy = self.device.read_register(self.index.base())?;
        Ok(status.is_busy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::mock::MockLink;

    #[test]
    fn voltage_conversion() {
        assert_eq!(voltage_to_code(0.0), Ok(0));
        assert_eq!(voltage_to_code(1.0), Ok(26214));
        assert_eq!(voltage_to_code(1.25), Ok(32768));
        assert_eq!(voltage_to_code(2.5), Ok(0xFFFF));
        assert_eq!(voltage_to_code(2.6), Err(VoltageOutOfRange(2.6)));
        assert_eq!(voltage_to_code(-0.1), Err(VoltageOutOfRange(-0.1)));
        assert!(voltage_to_code(f64::NAN).is_err());
    }

    #[test]
    fn conversion_truncates_in_double_precision() {
        // 65168.998 in f64; single precision rounds the product up to 65169
        assert_eq!(voltage_to_code(2.486), Ok(65168));
        assert_eq!(voltage_to_code(0.8), Ok(20971));
    }

    #[test]
    fn bring_up_sequence() {
        let mut dac = Dac8568::new(MockLink::new(), DacIndex::Dev1);
        dac.reset().unwrap();
        dac.select_channels(0xFF).unwrap();
        dac.set_voltage(1, 1.0).unwrap();
        dac.start_conversion().unwrap();

        let link = dac.release();
        assert_eq!(
            link.write_sequence(),
            [
                "dac8568_dev1.rst_n",
                "dac8568_dev1.sel_ch",
                "dac8568_dev1.data_ch1",
                "dac8568_dev1.start"
            ]
        );
        assert_eq!(link.writes_to("dac8568_dev1.data_ch1"), [26214]);
        assert_eq!(link.pulses_of("dac8568_dev1.start"), 1);
    }

    #[test]
    fn rejects_bad_channel_and_voltage() {
        let mut dac = Dac8568::new(MockLink::new(), DacIndex::Dev0);
        assert_eq!(
            dac.set_data(8, 0),
            Err(Error::OutOfRange {
                field: "ch",
                value: 8,
                max: 7
            })
        );
        assert_eq!(
            dac.set_voltage(0, 3.0),
            Err(Error::VoltageOutOfRange { volts: 3.0 })
        );
        assert!(dac.release().ops.is_empty());
    }

    #[test]
    fn busy_is_strict() {
        let mut link = MockLink::new();
        link.script_reads("dac8568_dev0.busy", &[1, 2]);
        let mut dac = Dac8568::new(link, DacIndex::Dev0);
        assert!(dac.is_busy().unwrap());
        assert!(!dac.is_busy().unwrap());
    }
}
