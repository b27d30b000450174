//! Error taxonomy shared by every device in the crate
//!
//! Validation failures are detected locally, before anything is written to
//! the bus. Link failures are wrapped without inspection and handed back to
//! the caller; nothing in this crate retries or rolls back.

use core::fmt;

/// Errors returned by the front-end devices.
///
/// `E` is the error type of the [`RegisterLink`](crate::RegisterLink) in use.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A field received a value outside its bit-width
    OutOfRange {
        /// Name of the field being set
        field: &'static str,
        /// Value that was rejected
        value: u32,
        /// Largest accepted value
        max: u32,
    },
    /// Requested DAC output voltage is negative or above the reference
    VoltageOutOfRange {
        /// Voltage that was rejected
        volts: f64,
    },
    /// The busy flag did not clear within the polling budget
    Timeout,
    /// The register link failed (unknown register, dispatch failure, bus timeout)
    Transport(E),
}

impl<E> Error<E> {
    pub(crate) fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), Self> {
        if value > max {
            return Err(Error::OutOfRange { field, value, max });
        }
        Ok(())
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange { field, value, max } => {
                write!(f, "unexpected {field}: {value}, should be at most {max}")
            }
            Error::VoltageOutOfRange { volts } => {
                write!(f, "voltage {volts} V outside the DAC reference range")
            }
            Error::Timeout => f.write_str("timed out waiting for busy flag to clear"),
            Error::Transport(e) => write!(f, "register link error: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_accepts_max() {
        assert_eq!(Error::<()>::check_range("data_len", 255, 255), Ok(()));
    }

    #[test]
    fn range_check_reports_field() {
        assert_eq!(
            Error::<()>::check_range("chn", 8, 7),
            Err(Error::OutOfRange {
                field: "chn",
                value: 8,
                max: 7
            })
        );
    }

    #[test]
    fn display_mentions_limit() {
        let err: Error<()> = Error::OutOfRange {
            field: "data_len",
            value: 256,
            max: 255,
        };
        assert_eq!(
            std::format!("{err}"),
            "unexpected data_len: 256, should be at most 255"
        );
    }

    #[test]
    fn display_mentions_rejected_voltage() {
        let err: Error<()> = Error::VoltageOutOfRange { volts: 3.0 };
        assert_eq!(std::format!("{err}"), "voltage 3 V outside the DAC reference range");
    }
}
