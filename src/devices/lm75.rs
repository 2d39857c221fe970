//! LM75 digital temperature sensor
//!
//! The temperature register holds an 11-bit two's complement value in its top
//! bits (0.125 °C resolution). The T_HYST and T_OS threshold registers drive the
//! OS output and use 9 bits (0.5 °C resolution).

use embedded_hal::i2c::I2c;

use crate::interface::I2cInterface;
use crate::registers::lm75::{
    CONFIGURATION, HYSTERESIS, Lm75Registers, OVERTEMPERATURE_SHUTDOWN, TEMPERATURE,
};
use crate::units::{self, celsius_to_fahrenheit};
use crate::{Error, RegisterValue, registers};

/// Default I2C address (A2..A0 tied to GND)
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// Implemented bits of the threshold registers
const THRESHOLD_MASK: RegisterValue = 0xFF80;

/// OS output operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OsMode {
    /// OS asserted while the temperature is above T_OS
    #[default]
    Comparator,
    /// OS asserted on crossing, cleared by reading any register
    Interrupt,
}

/// OS output polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OsPolarity {
    /// Active low
    #[default]
    ActiveLow,
    /// Active high
    ActiveHigh,
}

/// Number of consecutive faults before OS is asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultQueue {
    /// 1 fault
    #[default]
    One = 0,
    /// 2 faults
    Two = 1,
    /// 4 faults
    Four = 2,
    /// 6 faults
    Six = 3,
}

impl FaultQueue {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::One,
            1 => Self::Two,
            2 => Self::Four,
            _ => Self::Six,
        }
    }
}

/// Contents of the configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lm75Config {
    /// Shutdown mode (conversions stopped)
    pub shutdown: bool,
    /// OS operation mode
    pub mode: OsMode,
    /// OS polarity
    pub polarity: OsPolarity,
    /// Fault queue length
    pub fault_queue: FaultQueue,
}

impl Lm75Config {
    /// Raw configuration register value
    #[must_use]
    pub const fn bits(&self) -> RegisterValue {
        (self.shutdown as RegisterValue)
            | ((matches!(self.mode, OsMode::Interrupt) as RegisterValue) << 1)
            | ((matches!(self.polarity, OsPolarity::ActiveHigh) as RegisterValue) << 2)
            | ((self.fault_queue as RegisterValue) << 3)
    }
}

/// A temperature reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    /// Degrees Celsius
    pub celsius: f32,
}

impl Temperature {
    /// Decode a raw temperature register value
    #[must_use]
    pub fn from_raw(raw: RegisterValue) -> Self {
        Self {
            celsius: units::temperature_celsius(raw),
        }
    }

    /// Degrees Fahrenheit
    #[must_use]
    pub fn fahrenheit(&self) -> f32 {
        celsius_to_fahrenheit(self.celsius)
    }
}

/// LM75 driver
pub struct Lm75<I2C> {
    registers: Lm75Registers<I2cInterface<I2C>>,
}

impl<I2C> Lm75<I2C> {
    /// Create a driver without touching the device
    pub fn new(i2c: I2C, address: u8) -> Self {
        let interface = I2cInterface::new(i2c, address, &registers::LM75);
        Self {
            registers: Lm75Registers::new(interface),
        }
    }

    /// Slave address
    pub fn address(&self) -> u8 {
        self.registers.interface.address()
    }

    /// Consume the driver and return the I2C bus
    pub fn release(self) -> I2C {
        self.registers.interface.release()
    }
}

impl<I2C, E> Lm75<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a driver and write its configuration register
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the configuration does not
    /// read back as written.
    pub fn with_config(i2c: I2C, address: u8, config: Lm75Config) -> Result<Self, Error<E>> {
        let mut driver = Self::new(i2c, address);
        driver.configure(config)?;
        Ok(driver)
    }

    /// Write the configuration register and verify it
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the read-back differs.
    pub fn configure(&mut self, config: Lm75Config) -> Result<(), Error<E>> {
        self.registers.configuration().write(|w| {
            w.set_shutdown(config.shutdown);
            w.set_os_interrupt(config.mode == OsMode::Interrupt);
            w.set_os_active_high(config.polarity == OsPolarity::ActiveHigh);
            w.set_fault_queue(config.fault_queue as u8);
        })?;

        if self.configuration()? != config {
            return Err(Error::ConfigurationMismatch {
                register: CONFIGURATION,
            });
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("LM75 configured: 0x{:02X}", config.bits());

        Ok(())
    }

    /// Read the configuration register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configuration(&mut self) -> Result<Lm75Config, Error<E>> {
        let reg = self.registers.configuration().read()?;
        Ok(Lm75Config {
            shutdown: reg.shutdown(),
            mode: if reg.os_interrupt() {
                OsMode::Interrupt
            } else {
                OsMode::Comparator
            },
            polarity: if reg.os_active_high() {
                OsPolarity::ActiveHigh
            } else {
                OsPolarity::ActiveLow
            },
            fault_queue: FaultQueue::from_bits(reg.fault_queue()),
        })
    }

    /// Enter or leave shutdown mode (read-modify-write of the configuration)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Error<E>> {
        self.registers.configuration().modify(|w| {
            w.set_shutdown(shutdown);
        })?;
        Ok(())
    }

    /// Raw temperature register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn temperature_raw(&mut self) -> Result<RegisterValue, Error<E>> {
        self.registers.interface.read(TEMPERATURE)
    }

    /// Current temperature
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn temperature(&mut self) -> Result<Temperature, Error<E>> {
        Ok(Temperature::from_raw(self.temperature_raw()?))
    }

    /// Hysteresis threshold (T_HYST) in °C
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn hysteresis(&mut self) -> Result<f32, Error<E>> {
        let raw = self.registers.interface.read(HYSTERESIS)?;
        Ok(units::threshold_celsius(raw))
    }

    /// Set the hysteresis threshold (T_HYST), rounded to 0.5 °C
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] outside -55..=125 °C without
    /// touching the bus, otherwise as [`I2cInterface::write_verified`].
    pub fn set_hysteresis(&mut self, celsius: f32) -> Result<(), Error<E>> {
        self.write_threshold(HYSTERESIS, celsius)
    }

    /// Overtemperature shutdown threshold (T_OS) in °C
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn overtemperature_shutdown(&mut self) -> Result<f32, Error<E>> {
        let raw = self.registers.interface.read(OVERTEMPERATURE_SHUTDOWN)?;
        Ok(units::threshold_celsius(raw))
    }

    /// Set the overtemperature shutdown threshold (T_OS), rounded to 0.5 °C
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] outside -55..=125 °C without
    /// touching the bus, otherwise as [`I2cInterface::write_verified`].
    pub fn set_overtemperature_shutdown(&mut self, celsius: f32) -> Result<(), Error<E>> {
        self.write_threshold(OVERTEMPERATURE_SHUTDOWN, celsius)
    }

    fn write_threshold(&mut self, register: u8, celsius: f32) -> Result<(), Error<E>> {
        let raw = units::threshold_raw(celsius).ok_or(Error::ValueOutOfRange)?;
        self.registers
            .interface
            .write_verified(register, raw, THRESHOLD_MASK)
    }

    /// Read any register by pointer address
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for addresses outside 0x00-0x03
    /// without touching the bus, or a transport error.
    pub fn read_register(&mut self, register: u8) -> Result<RegisterValue, Error<E>> {
        self.registers.interface.read(register)
    }

    /// Write any register by pointer address
    ///
    /// # Errors
    ///
    /// Returns a validation error without touching the bus for unknown or
    /// read-only registers, or a transport error.
    pub fn write_register(
        &mut self,
        register: u8,
        value: Option<RegisterValue>,
    ) -> Result<(), Error<E>> {
        self.registers.interface.write(register, value)
    }
}
