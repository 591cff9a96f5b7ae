use core::fmt;

/// Pins requested for a bus, reported back when no route exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinTriple {
    pub clock: u8,
    pub mosi: Option<u8>,
    pub miso: Option<u8>,
}

/// Negative status code returned by the low-level SERCOM driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverError(pub i32);

/// Errors that can occur while constructing or operating an SPI bus.
#[derive(derive_more::From, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No free SERCOM can carry the requested pins.
    #[from(ignore)]
    InvalidPins(PinTriple),
    /// Half-duplex operation was requested. This is a special case of an
    /// invalid pin configuration: no route is ever searched for it.
    HalfDuplexUnsupported,
    /// The driver refused to initialize the SERCOM or set its baud rate.
    PeripheralUnavailable(DriverError),
    /// A pin is already claimed by another owner.
    #[from(ignore)]
    PinInUse(u8),
    /// The SERCOM a board override names belongs to another bus.
    #[from(ignore)]
    SercomInUse(u8),
    /// A transfer reported a negative status.
    Io,
    /// The bus has been deinitialized (or was never constructed).
    Deinitialized,
}

impl Error {
    /// Returns `true` for the errors that mean "these pins cannot form a bus".
    pub fn is_invalid_pins(&self) -> bool {
        matches!(self, Error::InvalidPins(_) | Error::HalfDuplexUnsupported)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPins(pins) => {
                write!(f, "Invalid pins: clock {}", pins.clock)?;
                if let Some(mosi) = pins.mosi {
                    write!(f, ", MOSI {}", mosi)?;
                }
                if let Some(miso) = pins.miso {
                    write!(f, ", MISO {}", miso)?;
                }
                Ok(())
            }
            Error::HalfDuplexUnsupported => {
                write!(f, "half_duplex is not implemented")
            }
            Error::PeripheralUnavailable(DriverError(code)) => {
                write!(f, "SERCOM unavailable (driver status {})", code)
            }
            Error::PinInUse(pin) => write!(f, "Pin {} in use", pin),
            Error::SercomInUse(index) => {
                write!(f, "SERCOM{} in use", index)
            }
            Error::Io => write!(f, "SPI transfer failed"),
            Error::Deinitialized => write!(f, "SPI bus is deinitialized"),
        }
    }
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}
