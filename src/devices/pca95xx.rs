//! PCA95xx port-banked GPIO expanders
//!
//! All chips of the family expose the same four register types per port:
//! input, output, polarity inversion and configuration (direction). The command
//! byte of a register is `register_offset * register_type + port`, where
//! `register_offset` is the distance between two register types of the same
//! port (1 on single-port parts, 2 on the PCA9555, 8 on the PCA9505).
//!
//! A chip is selected with a static [`Family`] descriptor rather than a
//! dedicated type:
//!
//! ```ignore
//! use bustools::devices::pca95xx::{Pca95xx, PCA9555};
//! use bustools::{Direction, Level};
//!
//! let mut gpio = Pca95xx::new(i2c, 0x20, &PCA9555);
//! gpio.set_direction(1, 3, Direction::Output)?;
//! gpio.set_output(1, 3, Level::High)?;
//! ```

use core::fmt;

use embedded_hal::i2c::I2c;

use crate::bits::{test_bit, toggle_bit, write_bit};
use crate::interface::I2cInterface;
use crate::registers::{self, RegisterMap};
use crate::{Error, RegisterValue};

/// Static description of one expander part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Family {
    /// Part name
    pub name: &'static str,
    /// Command byte distance between register types of the same port
    pub register_offset: u8,
    /// Number of ports
    pub ports: u8,
    /// Pins per port
    pub width: u8,
    /// Command bytes the part answers to
    pub registers: &'static RegisterMap,
}

/// PCA9536: 1 port, 4 pins
pub static PCA9536: Family = Family {
    name: "PCA9536",
    register_offset: 1,
    ports: 1,
    width: 4,
    registers: &registers::PCA9536,
};

/// PCA9554: 1 port, 8 pins
pub static PCA9554: Family = Family {
    name: "PCA9554",
    register_offset: 1,
    ports: 1,
    width: 8,
    registers: &registers::PCA9554,
};

/// PCA9557: 1 port, 8 pins
pub static PCA9557: Family = Family {
    name: "PCA9557",
    register_offset: 1,
    ports: 1,
    width: 8,
    registers: &registers::PCA9557,
};

/// PCA9555: 2 ports, 8 pins each
pub static PCA9555: Family = Family {
    name: "PCA9555",
    register_offset: 2,
    ports: 2,
    width: 8,
    registers: &registers::PCA9555,
};

/// PCA9505: 5 ports, 8 pins each
pub static PCA9505: Family = Family {
    name: "PCA9505",
    register_offset: 8,
    ports: 5,
    width: 8,
    registers: &registers::PCA9505,
};

/// Register type within a port bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterType {
    /// Input port (read-only)
    Input = 0,
    /// Output port
    Output = 1,
    /// Polarity inversion
    Polarity = 2,
    /// Configuration (1 = input, 0 = output)
    Configuration = 3,
}

impl TryFrom<u8> for RegisterType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Input),
            1 => Ok(Self::Output),
            2 => Ok(Self::Polarity),
            3 => Ok(Self::Configuration),
            other => Err(other),
        }
    }
}

/// Command byte for a register type of a port
///
/// Returns `None` if the result does not fit in a byte.
#[must_use]
pub const fn command(register_offset: u8, port: u8, register_type: RegisterType) -> Option<u8> {
    match register_offset.checked_mul(register_type as u8) {
        Some(base) => base.checked_add(port),
        None => None,
    }
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::High => "high",
        })
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Output (configuration bit 0)
    Output,
    /// Input (configuration bit 1, power-on default)
    Input,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Output => "output",
            Self::Input => "input",
        })
    }
}

/// Input polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Input register reflects the pin level
    Normal,
    /// Input register holds the inverted pin level
    Inverted,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Inverted => "inverted",
        })
    }
}

/// PCA95xx driver
pub struct Pca95xx<I2C> {
    interface: I2cInterface<I2C>,
    family: &'static Family,
}

impl<I2C> Pca95xx<I2C> {
    /// Create a driver for the expander at `address`
    pub const fn new(i2c: I2C, address: u8, family: &'static Family) -> Self {
        Self {
            interface: I2cInterface::new(i2c, address, family.registers),
            family,
        }
    }

    /// Part description
    pub const fn family(&self) -> &'static Family {
        self.family
    }

    /// Slave address
    pub const fn address(&self) -> u8 {
        self.interface.address()
    }

    /// Consume the driver and return the I2C bus
    pub fn release(self) -> I2C {
        self.interface.release()
    }
}

impl<I2C, E> Pca95xx<I2C>
where
    I2C: I2c<Error = E>,
{
    fn check_port(&self, port: u8) -> Result<(), Error<E>> {
        if port < self.family.ports {
            Ok(())
        } else {
            Err(Error::InvalidPin { port, pin: 0 })
        }
    }

    fn check_pin(&self, port: u8, pin: u8) -> Result<(), Error<E>> {
        if port < self.family.ports && pin < self.family.width {
            Ok(())
        } else {
            Err(Error::InvalidPin { port, pin })
        }
    }

    /// Command byte for a register type of a port on this part
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPin`] if the port does not exist or its command
    /// byte cannot be represented.
    pub fn command(&self, register_type: RegisterType, port: u8) -> Result<u8, Error<E>> {
        self.check_port(port)?;
        command(self.family.register_offset, port, register_type)
            .ok_or(Error::InvalidPin { port, pin: 0 })
    }

    /// Read one register of a port
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent port, or a transport error.
    pub fn read_port(&mut self, port: u8, register_type: RegisterType) -> Result<u8, Error<E>> {
        let command = self.command(register_type, port)?;
        let value = self.interface.read(command)?;
        u8::try_from(value).map_err(|_| Error::ValueOutOfRange)
    }

    /// Write one register of a port
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent port or the read-only input
    /// register, or a transport error.
    pub fn write_port(
        &mut self,
        port: u8,
        register_type: RegisterType,
        value: u8,
    ) -> Result<(), Error<E>> {
        let command = self.command(register_type, port)?;
        self.interface.write(command, Some(RegisterValue::from(value)))
    }

    /// Read a register by raw register type number (0-3)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for an unknown register type without
    /// touching the bus.
    pub fn read_register(&mut self, port: u8, register_type: u8) -> Result<u8, Error<E>> {
        let register_type =
            RegisterType::try_from(register_type).map_err(Error::InvalidRegister)?;
        self.read_port(port, register_type)
    }

    fn read_bit(
        &mut self,
        port: u8,
        pin: u8,
        register_type: RegisterType,
    ) -> Result<bool, Error<E>> {
        self.check_pin(port, pin)?;
        let value = self.read_port(port, register_type)?;
        Ok(test_bit(RegisterValue::from(value), pin))
    }

    /// Read-modify-write of one pin's bit
    fn modify_bit(
        &mut self,
        port: u8,
        pin: u8,
        register_type: RegisterType,
        verify: bool,
        f: impl FnOnce(RegisterValue, u8) -> RegisterValue,
    ) -> Result<(), Error<E>> {
        self.check_pin(port, pin)?;
        let command = self.command(register_type, port)?;
        let current = self.interface.read(command)?;
        let value = f(current, pin);
        if verify {
            self.interface.write_verified(command, value, 0xFF)
        } else {
            self.interface.write(command, Some(value))
        }
    }

    /// Level seen on an input pin (after polarity inversion)
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, or a transport error.
    pub fn input(&mut self, port: u8, pin: u8) -> Result<Level, Error<E>> {
        Ok(self.read_bit(port, pin, RegisterType::Input)?.into())
    }

    /// Level programmed in the output register for a pin
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, or a transport error.
    pub fn output(&mut self, port: u8, pin: u8) -> Result<Level, Error<E>> {
        Ok(self.read_bit(port, pin, RegisterType::Output)?.into())
    }

    /// Drive an output pin (read-modify-write of the port's output register)
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, or a transport error.
    pub fn set_output(&mut self, port: u8, pin: u8, level: Level) -> Result<(), Error<E>> {
        self.modify_bit(port, pin, RegisterType::Output, false, |v, n| {
            write_bit(v, n, level == Level::High)
        })
    }

    /// Invert an output pin (read-modify-write of the port's output register)
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, or a transport error.
    pub fn toggle(&mut self, port: u8, pin: u8) -> Result<(), Error<E>> {
        self.modify_bit(port, pin, RegisterType::Output, false, toggle_bit)
    }

    /// Input polarity of a pin
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, or a transport error.
    pub fn polarity(&mut self, port: u8, pin: u8) -> Result<Polarity, Error<E>> {
        Ok(if self.read_bit(port, pin, RegisterType::Polarity)? {
            Polarity::Inverted
        } else {
            Polarity::Normal
        })
    }

    /// Set the input polarity of a pin and verify the port's polarity register
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, a transport error, or
    /// [`Error::ConfigurationMismatch`].
    pub fn set_polarity(&mut self, port: u8, pin: u8, polarity: Polarity) -> Result<(), Error<E>> {
        self.modify_bit(port, pin, RegisterType::Polarity, true, |v, n| {
            write_bit(v, n, polarity == Polarity::Inverted)
        })
    }

    /// Direction of a pin
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, or a transport error.
    pub fn direction(&mut self, port: u8, pin: u8) -> Result<Direction, Error<E>> {
        Ok(if self.read_bit(port, pin, RegisterType::Configuration)? {
            Direction::Input
        } else {
            Direction::Output
        })
    }

    /// Set the direction of a pin and verify the port's configuration register
    ///
    /// # Errors
    ///
    /// Returns a validation error for a nonexistent pin, a transport error, or
    /// [`Error::ConfigurationMismatch`].
    pub fn set_direction(
        &mut self,
        port: u8,
        pin: u8,
        direction: Direction,
    ) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("{} pin {}.{} -> {}", self.family.name, port, pin, direction);

        self.modify_bit(port, pin, RegisterType::Configuration, true, |v, n| {
            write_bit(v, n, direction == Direction::Input)
        })
    }
}
