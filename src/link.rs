//! Register link interface
//!
//! The link is the transport that turns a named register into bus reads and
//! writes on the FPGA (IPbus over UDP in the JadePix3 DAQ). Register names are
//! resolved against the device's address table as `base + name`, for example
//! `"spi_dev." + "ctrl"`. Writes may be queued and flushed later; a `dispatch`
//! flushes everything queued so far to hardware as one batch.
//!
//! This crate never implements a link itself. Any bus driver that can honour
//! the contract below can drive every device in the crate.

/// Named-register transport to the FPGA.
pub trait RegisterLink {
    /// Transport failure: unknown register name, dispatch failure or bus timeout
    type Error;

    /// Writes `value` to the register `base + name`.
    ///
    /// When `pulse` is set the register receives the sequence 0, 1, 0 and
    /// `value` is ignored. When `dispatch` is set the queued operations are
    /// flushed before returning.
    fn write(
        &mut self,
        base: &str,
        name: &str,
        value: u32,
        pulse: bool,
        dispatch: bool,
    ) -> Result<(), Self::Error>;

    /// Reads the register `base + name`. Always dispatches before returning.
    fn read(&mut self, base: &str, name: &str) -> Result<u32, Self::Error>;
}

impl<L> RegisterLink for &mut L
where
    L: RegisterLink + ?Sized,
{
    type Error = L::Error;

    fn write(
        &mut self,
        base: &str,
        name: &str,
        value: u32,
        pulse: bool,
        dispatch: bool,
    ) -> Result<(), Self::Error> {
        L::write(self, base, name, value, pulse, dispatch)
    }

    fn read(&mut self, base: &str, name: &str) -> Result<u32, Self::Error> {
        L::read(self, base, name)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{MockLink, Op, UnknownRegister};
    use super::*;

    fn poke<L: RegisterLink>(mut link: L) -> Result<u32, L::Error> {
        link.write("spi_dev.", "divider", 4, false, true)?;
        link.read("spi_dev.", "divider")
    }

    #[test]
    fn mutable_reference_is_a_link() {
        let mut link = MockLink::new();
        assert_eq!(poke(&mut link), Ok(4));
        assert_eq!(poke(&mut link), Ok(4));
        assert_eq!(link.writes_to("spi_dev.divider"), [4, 4]);
    }

    #[test]
    fn pulse_ignores_value() {
        let mut link = MockLink::new();
        link.write("", "RST", 0xdead, true, true).unwrap();
        assert_eq!(
            link.ops,
            [Op::Pulse {
                reg: "RST".into()
            }]
        );
        assert_eq!(link.value("RST"), Some(0));
    }

    #[test]
    fn unknown_register_fails() {
        let mut link = MockLink::with_registers(&["spi_dev.ctrl"]);
        assert_eq!(
            link.read("spi_dev.", "ctl"),
            Err(UnknownRegister("spi_dev.ctl".into()))
        );
    }
}
