//! INA219 current, voltage and power monitor
//!
//! The INA219 measures the voltage across a shunt resistor and the bus
//! voltage, and computes current and power internally once its calibration
//! register has been programmed. The calibration depends on the shunt value
//! and on the largest current the board is expected to carry, see
//! [`Calibration`].
//!
//! # Example
//!
//! ```ignore
//! use bustools::{Ina219, Ina219Config};
//!
//! let mut monitor = Ina219::new(i2c, 0x40, Ina219Config::default(), 3.2, 0.1)?;
//! let volts = monitor.bus_voltage()?;
//! let amps = monitor.current()?;
//! ```

use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::interface::I2cInterface;
use crate::registers::ina219::{
    BUS_VOLTAGE, CALIBRATION, CONFIGURATION, CURRENT, Ina219Registers, POWER, SHUNT_VOLTAGE,
};
use crate::units::{self, BusVoltage, Calibration, SHUNT_VOLTAGE_LSB};
use crate::{Error, RegisterValue, registers};

/// Default I2C address (A0 and A1 tied to GND)
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Bit 0 of the calibration register is not implemented and always reads 0
const CALIBRATION_MASK: RegisterValue = 0xFFFE;

/// Bus voltage full-scale range (BRNG)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusRange {
    /// 16 V full scale
    V16 = 0,
    /// 32 V full scale (power-on default)
    V32 = 1,
}

/// Shunt PGA gain and range (PG)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShuntGain {
    /// Gain 1, ±40 mV
    Div1 = 0,
    /// Gain /2, ±80 mV
    Div2 = 1,
    /// Gain /4, ±160 mV
    Div4 = 2,
    /// Gain /8, ±320 mV (power-on default)
    Div8 = 3,
}

impl ShuntGain {
    /// Shunt voltage full-scale range in volts
    #[must_use]
    pub const fn range_volts(self) -> f32 {
        match self {
            Self::Div1 => 0.04,
            Self::Div2 => 0.08,
            Self::Div4 => 0.16,
            Self::Div8 => 0.32,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Div1,
            1 => Self::Div2,
            2 => Self::Div4,
            _ => Self::Div8,
        }
    }
}

/// ADC resolution or averaging for the bus (BADC) and shunt (SADC) channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Adc {
    /// 9-bit, single sample
    Bits9 = 0b0000,
    /// 10-bit, single sample
    Bits10 = 0b0001,
    /// 11-bit, single sample
    Bits11 = 0b0010,
    /// 12-bit, single sample (power-on default)
    Bits12 = 0b0011,
    /// 12-bit, 2 samples averaged
    Samples2 = 0b1001,
    /// 12-bit, 4 samples averaged
    Samples4 = 0b1010,
    /// 12-bit, 8 samples averaged
    Samples8 = 0b1011,
    /// 12-bit, 16 samples averaged
    Samples16 = 0b1100,
    /// 12-bit, 32 samples averaged
    Samples32 = 0b1101,
    /// 12-bit, 64 samples averaged
    Samples64 = 0b1110,
    /// 12-bit, 128 samples averaged
    Samples128 = 0b1111,
}

impl Adc {
    /// Conversion time in microseconds (datasheet typical)
    #[must_use]
    pub const fn conversion_time_us(self) -> u32 {
        match self {
            Self::Bits9 => 84,
            Self::Bits10 => 148,
            Self::Bits11 => 276,
            Self::Bits12 => 532,
            Self::Samples2 => 1060,
            Self::Samples4 => 2130,
            Self::Samples8 => 4260,
            Self::Samples16 => 8510,
            Self::Samples32 => 17020,
            Self::Samples64 => 34050,
            Self::Samples128 => 68100,
        }
    }

    /// Decode a 4-bit BADC/SADC field
    ///
    /// `0b1000` is an alias of the 12-bit setting, and bit 2 is ignored when
    /// bit 3 is clear.
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b1111 {
            0b1001 => Self::Samples2,
            0b1010 => Self::Samples4,
            0b1011 => Self::Samples8,
            0b1100 => Self::Samples16,
            0b1101 => Self::Samples32,
            0b1110 => Self::Samples64,
            0b1111 => Self::Samples128,
            0b1000 => Self::Bits12,
            b => match b & 0b11 {
                0 => Self::Bits9,
                1 => Self::Bits10,
                2 => Self::Bits11,
                _ => Self::Bits12,
            },
        }
    }
}

/// Operating mode (MODE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Power-down
    PowerDown = 0,
    /// Shunt voltage, triggered
    ShuntTriggered = 1,
    /// Bus voltage, triggered
    BusTriggered = 2,
    /// Shunt and bus, triggered
    ShuntAndBusTriggered = 3,
    /// ADC off (disabled)
    AdcOff = 4,
    /// Shunt voltage, continuous
    ShuntContinuous = 5,
    /// Bus voltage, continuous
    BusContinuous = 6,
    /// Shunt and bus, continuous (power-on default)
    ShuntAndBusContinuous = 7,
}

impl OperatingMode {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::PowerDown,
            1 => Self::ShuntTriggered,
            2 => Self::BusTriggered,
            3 => Self::ShuntAndBusTriggered,
            4 => Self::AdcOff,
            5 => Self::ShuntContinuous,
            6 => Self::BusContinuous,
            _ => Self::ShuntAndBusContinuous,
        }
    }
}

/// Contents of the configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ina219Config {
    /// Bus voltage range
    pub bus_range: BusRange,
    /// Shunt PGA gain
    pub gain: ShuntGain,
    /// Bus ADC setting
    pub bus_adc: Adc,
    /// Shunt ADC setting
    pub shunt_adc: Adc,
    /// Operating mode
    pub mode: OperatingMode,
}

impl Default for Ina219Config {
    /// Power-on configuration (0x399F)
    fn default() -> Self {
        Self {
            bus_range: BusRange::V32,
            gain: ShuntGain::Div8,
            bus_adc: Adc::Bits12,
            shunt_adc: Adc::Bits12,
            mode: OperatingMode::ShuntAndBusContinuous,
        }
    }
}

impl Ina219Config {
    /// Raw configuration register value
    #[must_use]
    pub const fn bits(&self) -> RegisterValue {
        ((self.bus_range as RegisterValue) << 13)
            | ((self.gain as RegisterValue) << 11)
            | ((self.bus_adc as RegisterValue) << 7)
            | ((self.shunt_adc as RegisterValue) << 3)
            | (self.mode as RegisterValue)
    }

    /// Decode a raw configuration register value (RST is ignored)
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(raw: RegisterValue) -> Self {
        Self::from_fields(
            raw & (1 << 13) != 0,
            ((raw >> 11) & 0b11) as u8,
            ((raw >> 7) & 0b1111) as u8,
            ((raw >> 3) & 0b1111) as u8,
            (raw & 0b111) as u8,
        )
    }

    const fn from_fields(brng: bool, pg: u8, badc: u8, sadc: u8, mode: u8) -> Self {
        Self {
            bus_range: if brng { BusRange::V32 } else { BusRange::V16 },
            gain: ShuntGain::from_bits(pg),
            bus_adc: Adc::from_bits(badc),
            shunt_adc: Adc::from_bits(sadc),
            mode: OperatingMode::from_bits(mode),
        }
    }
}

/// INA219 driver
pub struct Ina219<I2C> {
    registers: Ina219Registers<I2cInterface<I2C>>,
    calibration: Calibration,
}

impl<I2C, E> Ina219<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a driver, configure the device and program its calibration
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus
    /// * `address` - Slave address (0x40-0x4F)
    /// * `config` - Configuration register contents
    /// * `max_expected_current` - Largest current through the shunt, in amps
    /// * `shunt_resistance` - Shunt resistor value, in ohms
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] without touching the bus if the
    /// calibration cannot be represented, a transport error if communication
    /// fails, or [`Error::ConfigurationMismatch`] if the device does not accept
    /// the configuration or calibration.
    pub fn new(
        i2c: I2C,
        address: u8,
        config: Ina219Config,
        max_expected_current: f32,
        shunt_resistance: f32,
    ) -> Result<Self, Error<E>> {
        let calibration =
            Calibration::new(max_expected_current, shunt_resistance).ok_or(Error::InvalidConfig)?;
        let interface = I2cInterface::new(i2c, address, &registers::INA219);
        let mut driver = Self {
            registers: Ina219Registers::new(interface),
            calibration,
        };

        driver.configure(config)?;
        driver.calibrate()?;
        Ok(driver)
    }

    /// Write the configuration register and verify it
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the read-back differs.
    pub fn configure(&mut self, config: Ina219Config) -> Result<(), Error<E>> {
        self.registers.configuration().write(|w| {
            w.set_rst(false);
            w.set_brng(config.bus_range == BusRange::V32);
            w.set_pg(config.gain as u8);
            w.set_badc(config.bus_adc as u8);
            w.set_sadc(config.shunt_adc as u8);
            w.set_mode(config.mode as u8);
        })?;

        let actual = self.configuration()?;
        if actual != config {
            #[cfg(feature = "defmt")]
            defmt::warn!("INA219 configuration mismatch: wrote {}, read {}", config, actual);
            return Err(Error::ConfigurationMismatch {
                register: CONFIGURATION,
            });
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("INA219 configured: 0x{:04X}", config.bits());

        Ok(())
    }

    /// Read the configuration register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configuration(&mut self) -> Result<Ina219Config, Error<E>> {
        let reg = self.registers.configuration().read()?;
        Ok(Ina219Config::from_fields(
            reg.brng(),
            reg.pg(),
            reg.badc(),
            reg.sadc(),
            reg.mode(),
        ))
    }

    /// Program the calibration register from the current [`Calibration`]
    ///
    /// Must be repeated after [`reset`](Self::reset); current and power read
    /// as zero while the calibration register is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the read-back differs.
    pub fn calibrate(&mut self) -> Result<(), Error<E>> {
        let value = self.calibration.register;
        self.registers
            .interface
            .write_verified(CALIBRATION, value, CALIBRATION_MASK)?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "INA219 calibrated: cal={} current_lsb={} A",
            value,
            self.calibration.current_lsb
        );

        Ok(())
    }

    /// Replace the calibration for a different shunt or current range and
    /// program it
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for unusable inputs (nothing is
    /// written), otherwise as [`calibrate`](Self::calibrate).
    pub fn recalibrate(
        &mut self,
        max_expected_current: f32,
        shunt_resistance: f32,
    ) -> Result<(), Error<E>> {
        self.calibration =
            Calibration::new(max_expected_current, shunt_resistance).ok_or(Error::InvalidConfig)?;
        self.calibrate()
    }

    /// Calibration in use for current and power conversion
    pub const fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Reset all registers to their power-on values
    ///
    /// This is a read-modify-write of the configuration register setting RST.
    /// The calibration register is cleared by the reset.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.registers.configuration().modify(|w| {
            w.set_rst(true);
        })?;
        Ok(())
    }

    /// Shunt voltage in volts
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn shunt_voltage(&mut self) -> Result<f32, Error<E>> {
        let raw = self.read_register(SHUNT_VOLTAGE)?;
        Ok(units::to_physical(units::signed(raw), SHUNT_VOLTAGE_LSB))
    }

    /// Bus voltage in volts
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn bus_voltage(&mut self) -> Result<f32, Error<E>> {
        Ok(self.bus_voltage_ext()?.volts)
    }

    /// Bus voltage with the OVF and CNVR flags from the same read
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn bus_voltage_ext(&mut self) -> Result<BusVoltage, Error<E>> {
        let raw = self.read_register(BUS_VOLTAGE)?;
        Ok(BusVoltage::from_raw(raw))
    }

    /// Current in amps
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn current(&mut self) -> Result<f32, Error<E>> {
        let raw = self.read_register(CURRENT)?;
        Ok(units::to_physical(units::signed(raw), self.calibration.current_lsb))
    }

    /// Power in watts
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn power(&mut self) -> Result<f32, Error<E>> {
        let raw = self.read_register(POWER)?;
        Ok(units::to_physical(raw, self.calibration.power_lsb))
    }

    /// Read any register by pointer address
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for addresses outside 0x00-0x05
    /// without touching the bus, or a transport error.
    pub fn read_register(&mut self, register: u8) -> Result<RegisterValue, Error<E>> {
        self.registers.interface.read(register)
    }

    /// Write any writable register by pointer address
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

    /// Snapshot of all six registers as `(address, value)` pairs
    ///
    /// # Errors
    ///
    /// Returns an error if any read fails.
    pub fn dump_registers(&mut self) -> Result<Vec<(u8, RegisterValue), 6>, Error<E>> {
        let mut out = Vec::new();
        for reg in registers::INA219.registers {
            let value = self.read_register(reg.address)?;
            out.push((reg.address, value)).map_err(|_| Error::InvalidConfig)?;
        }
        Ok(out)
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
