#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bits;
pub mod codec;
pub mod devices;
pub mod interface;
pub mod registers;
pub mod units;

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// Re-export main types
pub use devices::ds442x::{CurrentDirection, Ds442x, OutputCode};
pub use devices::ina219::{Adc, BusRange, Ina219, Ina219Config, OperatingMode, ShuntGain};
pub use devices::lm75::{FaultQueue, Lm75, Lm75Config, OsMode, OsPolarity, Temperature};
pub use devices::pca95xx::{Direction, Level, Pca95xx, Polarity, RegisterType};
pub use interface::I2cInterface;
pub use registers::{Access, Register, RegisterMap, Width};
pub use units::{BusVoltage, Calibration};

/// Raw register contents, right-aligned (`width * 8` significant bits)
pub type RegisterValue = u16;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The underlying bus transaction failed (NACK, bus error, arbitration loss, ...)
    Transport(E),
    /// Register identifier is not part of the device's register map
    InvalidRegister(u8),
    /// Register exists but does not allow the requested access
    AccessDenied(u8),
    /// Value does not fit the register or the physical range of the field
    ValueOutOfRange,
    /// Pin or port number outside the expander's layout
    InvalidPin {
        /// Port number that was requested
        port: u8,
        /// Pin number that was requested
        pin: u8,
    },
    /// Channel number outside the DAC's channel count
    InvalidChannel(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// A configuration write did not read back as written
    ConfigurationMismatch {
        /// Register that was written
        register: u8,
    },
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Transport(error)
    }
}

impl<E: embedded_hal::i2c::Error> Error<E> {
    /// Classify a transport failure
    ///
    /// Returns `None` for validation errors, which never reach the bus.
    pub fn transport_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Transport(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl<E: embedded_hal::i2c::Error> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport failure: {} ({e:?})", e.kind()),
            Self::InvalidRegister(r) => write!(f, "invalid register: 0x{r:02X}"),
            Self::AccessDenied(r) => write!(f, "access denied on register 0x{r:02X}"),
            Self::ValueOutOfRange => f.write_str("value out of range"),
            Self::InvalidPin { port, pin } => write!(f, "invalid pin {port}.{pin}"),
            Self::InvalidChannel(c) => write!(f, "invalid channel: {c}"),
            Self::InvalidConfig => f.write_str("invalid configuration"),
            Self::ConfigurationMismatch { register } => {
                write!(f, "register 0x{register:02X} did not read back as written")
            }
        }
    }
}

impl<E: embedded_hal::i2c::Error> core::error::Error for Error<E> {}
