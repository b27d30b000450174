//! Global FPGA control
//!
//! Resets and routing that affect the whole front-end rather than one
//! peripheral.

use crate::registers::{DacNumber, Nuke, SoftReset, GLOBAL_BASE};
use crate::{Device, Error, RegisterLink};

/// The `global_dev.` block
pub struct GlobalDevice<LINK> {
    device: Device<LINK>,
    target: &'static str,
}

impl<LINK> GlobalDevice<LINK> {
    pub fn new(link: LINK) -> Self {
        Self {
            device: Device::new(link),
            target: module_path!(),
        }
    }

    /// Sets the `log` target used for the reset diagnostics.
    pub fn with_log_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// Releases the underlying register link.
    pub fn release(self) -> LINK {
        self.device.release()
    }
}

impl<LINK> GlobalDevice<LINK>
where
    LINK: RegisterLink,
{
    /// Synchronous reset of every clock domain in the FPGA.
    pub fn nuke(&mut self) -> Result<(), Error<LINK::Error>> {
        log::debug!(target: self.target, "global nuke");
        self.device.pulse::<Nuke>(GLOBAL_BASE, true)
    }

    /// Synchronous reset of the IPbus clock domain (31.25 MHz).
    pub fn soft_reset(&mut self) -> Result<(), Error<LINK::Error>> {
        log::debug!(target: self.target, "global soft reset");
        self.device.pulse::<SoftReset>(GLOBAL_BASE, true)
    }

    /// Routes the shared DAC serial lines to DAC8568 number `nr`.
    pub fn set_dac_nr(&mut self, nr: u32) -> Result<(), Error<LINK::Error>> {
        let register = DacNumber { value: nr };
        self.device.write_register(GLOBAL_BASE, register, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::mock::{MockLink, Op};
    use crate::{CeeConfigurator, Dac8568, DacIndex};

    #[test]
    fn resets_are_pulses() {
        let mut global = GlobalDevice::new(MockLink::new());
        global.soft_reset().unwrap();
        global.nuke().unwrap();
        let link = global.release();
        assert_eq!(
            link.ops,
            [
                Op::Pulse {
                    reg: "global_dev.soft_rst".into()
                },
                Op::Pulse {
                    reg: "global_dev.nuke".into()
                },
            ]
        );
    }

    #[test]
    fn log_target_is_per_instance() {
        let global = GlobalDevice::new(MockLink::new());
        assert_eq!(global.target, "jadepix_frontend::global");

        let mut global = global.with_log_target("frontend::reset");
        assert_eq!(global.target, "frontend::reset");
        global.nuke().unwrap();
        assert_eq!(global.release().pulses_of("global_dev.nuke"), 1);
    }

    #[test]
    fn dac_routing() {
        let mut global = GlobalDevice::new(MockLink::new());
        global.set_dac_nr(1).unwrap();
        assert_eq!(global.release().value("global_dev.dac_nr"), Some(1));
    }

    #[test]
    fn devices_share_one_link() {
        let mut link = MockLink::new();

        GlobalDevice::new(&mut link).soft_reset().unwrap();

        GlobalDevice::new(&mut link).set_dac_nr(0).unwrap();
        let mut dac = Dac8568::new(&mut link, DacIndex::Dev0);
        dac.reset().unwrap();
        dac.select_channels(0xFF).unwrap();
        dac.set_voltage(0, 1.0).unwrap();
        dac.start_conversion().unwrap();

        let mut cee = CeeConfigurator::new(&mut link).unwrap();
        cee.configure_pixel(1, 0x0, 0x0f, true, true, 0).unwrap();
        cee.transaction(crate::Direction::Write, 0x01, 0x00).unwrap();

        assert_eq!(link.pulses_of("global_dev.soft_rst"), 1);
        assert_eq!(link.value("dac8568_dev0.data_ch0"), Some(26214));
        assert_eq!(link.writes_to("spi_dev.d0"), [0x2001, 0x210f, 0x22c0, 0x0100]);
    }
}
