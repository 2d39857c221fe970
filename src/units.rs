//! Conversion of raw register values to physical units
//!
//! Every measurement register is a plain integer count; the physical value is
//! `raw * lsb`, where the LSB is either a datasheet constant or derived from
//! the board (shunt resistor, full-scale resistor).

use crate::RegisterValue;

/// INA219 shunt voltage LSB in volts (constant for all PGA settings)
///
/// At PGA /8: 320 mV / 2^15, at PGA /1: 40 mV / 2^12, both about 10 µV.
pub const SHUNT_VOLTAGE_LSB: f32 = 0.000_01;

/// INA219 bus voltage LSB in volts (constant for both ranges)
pub const BUS_VOLTAGE_LSB: f32 = 0.004;

/// Fixed INA219 scaling constant used in the calibration equation
pub const CALIBRATION_SCALE: f32 = 0.040_96;

/// Ratio between the INA219 power LSB and current LSB
pub const POWER_LSB_RATIO: f32 = 20.0;

/// Largest positive count of the INA219 current register
const CURRENT_FULL_SCALE_COUNTS: f32 = 32767.0;

/// LM75 temperature resolution of the high 11 bits, in °C
const TEMPERATURE_LSB: f32 = 0.125;

/// LM75 threshold (T_HYST / T_OS) resolution, in °C
const THRESHOLD_LSB: f32 = 0.5;

/// LM75 threshold range in °C
pub const THRESHOLD_RANGE: (f32, f32) = (-55.0, 125.0);

/// DS4424 full-scale reference voltage across R_FS
pub const DS4424_VRFS: f32 = 0.976;

/// Largest DS4424 output magnitude
pub const DS4424_MAX_MAGNITUDE: u8 = 127;

/// Convert a raw count to a physical value
#[must_use]
pub fn to_physical(raw: impl Into<f32>, lsb: f32) -> f32 {
    raw.into() * lsb
}

/// INA219 calibration derived from the shunt and the expected current range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Current register LSB in amps
    pub current_lsb: f32,
    /// Power register LSB in watts
    pub power_lsb: f32,
    /// Value to program into the calibration register
    pub register: RegisterValue,
}

impl Calibration {
    /// Compute the calibration for a given shunt
    ///
    /// `current_lsb = max_expected_current / 32767` and
    /// `register = trunc(0.04096 / (current_lsb * shunt_resistance))`.
    ///
    /// Returns `None` if either input is not strictly positive, or if the
    /// result does not fit the 16-bit calibration register.
    #[must_use]
    pub fn new(max_expected_current: f32, shunt_resistance: f32) -> Option<Self> {
        if !(max_expected_current > 0.0 && shunt_resistance > 0.0) {
            return None;
        }
        let current_lsb = max_expected_current / CURRENT_FULL_SCALE_COUNTS;
        let value = libm::truncf(CALIBRATION_SCALE / (current_lsb * shunt_resistance));
        if !(1.0..=f32::from(u16::MAX)).contains(&value) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let register = value as RegisterValue;
        Some(Self {
            current_lsb,
            power_lsb: POWER_LSB_RATIO * current_lsb,
            register,
        })
    }
}

/// Decoded INA219 bus voltage register
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusVoltage {
    /// Bus voltage in volts
    pub volts: f32,
    /// Math overflow flag (OVF): power or current out of range
    pub overflow: bool,
    /// Conversion ready flag (CNVR)
    pub conversion_ready: bool,
}

impl BusVoltage {
    /// Decode the raw bus voltage register
    #[must_use]
    pub fn from_raw(raw: RegisterValue) -> Self {
        Self {
            volts: to_physical(raw_bus_voltage(raw), BUS_VOLTAGE_LSB),
            overflow: raw & 0x1 != 0,
            conversion_ready: (raw >> 1) & 0x1 != 0,
        }
    }
}

/// Measurement bits of the bus voltage register (status bits stripped)
#[must_use]
pub const fn raw_bus_voltage(raw: RegisterValue) -> RegisterValue {
    (raw >> 3) & 0x0FFF
}

/// Reinterpret a 16-bit register as two's complement
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn signed(raw: RegisterValue) -> i16 {
    raw as i16
}

/// LM75 temperature register to °C
///
/// Integer degrees live in bits 15..8 and eighths of a degree in bits 7..5.
/// The high byte is two's complement, so `0xFF80` is -0.5 °C.
#[must_use]
pub fn temperature_celsius(raw: RegisterValue) -> f32 {
    to_physical(signed(raw) >> 5, TEMPERATURE_LSB)
}

/// °C to °F
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// LM75 threshold register (T_HYST / T_OS) to °C
#[must_use]
pub fn threshold_celsius(raw: RegisterValue) -> f32 {
    to_physical(signed(raw) >> 7, THRESHOLD_LSB)
}

/// °C to an LM75 threshold register value, rounded to the nearest 0.5 °C
///
/// Returns `None` outside of [`THRESHOLD_RANGE`] or for NaN.
#[must_use]
pub fn threshold_raw(celsius: f32) -> Option<RegisterValue> {
    let (min, max) = THRESHOLD_RANGE;
    if !(min..=max).contains(&celsius) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let half_degrees = libm::roundf(celsius / THRESHOLD_LSB) as i16;
    #[allow(clippy::cast_sign_loss)]
    let raw = (half_degrees << 7) as RegisterValue;
    Some(raw)
}

/// DS4424 full-scale output current for an external R_FS, in amps
#[must_use]
pub fn ds4424_full_scale_current(r_fs: f32) -> f32 {
    (DS4424_VRFS / r_fs) * (f32::from(DS4424_MAX_MAGNITUDE) / 16.0)
}
