//! DS4422/DS4424 current DACs
//!
//! Each channel has a one-byte register at `0xF8 + channel`. Bit 7 selects the
//! direction (1 = source, 0 = sink) and bits 0..7 hold the magnitude. The
//! full-scale current of a channel is set by an external resistor R_FS; when it
//! is known, the driver converts between codes and amps.

use embedded_hal::i2c::I2c;

use crate::interface::I2cInterface;
use crate::registers::{self, RegisterMap};
use crate::units::{DS4424_MAX_MAGNITUDE, ds4424_full_scale_current};
use crate::{Error, RegisterValue};

/// Register of channel 0
const OUTPUT_BASE: u8 = 0xF8;

const SOURCE_BIT: u8 = 0x80;

/// Static description of one DAC part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Family {
    /// Part name
    pub name: &'static str,
    /// Number of output channels
    pub channels: u8,
    /// Output registers
    pub registers: &'static RegisterMap,
}

/// DS4422: 2 channels
pub static DS4422: Family = Family {
    name: "DS4422",
    channels: 2,
    registers: &registers::DS4422,
};

/// DS4424: 4 channels
pub static DS4424: Family = Family {
    name: "DS4424",
    channels: 4,
    registers: &registers::DS4424,
};

/// Current direction of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurrentDirection {
    /// Current flows into the output
    #[default]
    Sink,
    /// Current flows out of the output
    Source,
}

/// Contents of an output register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputCode {
    /// Direction bit
    pub direction: CurrentDirection,
    /// Magnitude, 0..=127
    pub magnitude: u8,
}

impl OutputCode {
    /// Zero output
    pub const ZERO: Self = Self {
        direction: CurrentDirection::Sink,
        magnitude: 0,
    };

    /// Build a code, returning `None` if `magnitude` exceeds 127
    #[must_use]
    pub const fn new(direction: CurrentDirection, magnitude: u8) -> Option<Self> {
        if magnitude > DS4424_MAX_MAGNITUDE {
            return None;
        }
        Some(Self {
            direction,
            magnitude,
        })
    }

    /// Decode a register byte
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            direction: if bits & SOURCE_BIT != 0 {
                CurrentDirection::Source
            } else {
                CurrentDirection::Sink
            },
            magnitude: bits & DS4424_MAX_MAGNITUDE,
        }
    }

    /// Register byte
    #[must_use]
    pub const fn bits(&self) -> u8 {
        let sign = match self.direction {
            CurrentDirection::Sink => 0,
            CurrentDirection::Source => SOURCE_BIT,
        };
        sign | (self.magnitude & DS4424_MAX_MAGNITUDE)
    }
}

/// DS442x driver
pub struct Ds442x<I2C> {
    interface: I2cInterface<I2C>,
    family: &'static Family,
    full_scale: [Option<f32>; 4],
}

impl<I2C> Ds442x<I2C> {
    /// Create a driver without touching the device
    ///
    /// `r_fs` holds the external full-scale resistor of each channel in ohms;
    /// channels without one only support raw codes.
    pub fn new(i2c: I2C, address: u8, family: &'static Family, r_fs: [Option<f32>; 4]) -> Self {
        let full_scale = r_fs.map(|r| {
            r.filter(|r| r.is_finite() && *r > 0.0)
                .map(ds4424_full_scale_current)
        });
        Self {
            interface: I2cInterface::new(i2c, address, family.registers),
            family,
            full_scale,
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

impl<I2C, E> Ds442x<I2C>
where
    I2C: I2c<Error = E>,
{
    fn check_channel(&self, channel: u8) -> Result<u8, Error<E>> {
        OUTPUT_BASE
            .checked_add(channel)
            .filter(|&register| {
                channel < self.family.channels && self.family.registers.contains(register)
            })
            .ok_or(Error::InvalidChannel(channel))
    }

    /// Full-scale current of a channel in amps, if its R_FS is known
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] for a channel the part does not have.
    pub fn full_scale_current(&self, channel: u8) -> Result<Option<f32>, Error<E>> {
        self.check_channel(channel)?;
        Ok(self.full_scale.get(usize::from(channel)).copied().flatten())
    }

    fn require_full_scale(&self, channel: u8) -> Result<f32, Error<E>> {
        self.full_scale_current(channel)?.ok_or(Error::InvalidConfig)
    }

    /// Zero every channel of the part
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        for channel in 0..self.family.channels {
            self.set_output(channel, OutputCode::ZERO)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("{} 0x{:02X} initialized", self.family.name, self.address());

        Ok(())
    }

    /// Read the output code of a channel
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] without touching the bus, or a
    /// transport error.
    pub fn output(&mut self, channel: u8) -> Result<OutputCode, Error<E>> {
        let register = self.check_channel(channel)?;
        let value = self.interface.read(register)?;
        let bits = u8::try_from(value).map_err(|_| Error::ValueOutOfRange)?;
        Ok(OutputCode::from_bits(bits))
    }

    /// Write the output code of a channel
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannel`] or [`Error::ValueOutOfRange`] (for a
    /// magnitude above 127) without touching the bus, or a transport error.
    pub fn set_output(&mut self, channel: u8, code: OutputCode) -> Result<(), Error<E>> {
        let register = self.check_channel(channel)?;
        if code.magnitude > DS4424_MAX_MAGNITUDE {
            return Err(Error::ValueOutOfRange);
        }
        self.interface
            .write(register, Some(RegisterValue::from(code.bits())))
    }

    /// Output current of a channel in amps (positive when sourcing)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the channel's R_FS is unknown,
    /// otherwise as [`output`](Self::output).
    pub fn output_current(&mut self, channel: u8) -> Result<f32, Error<E>> {
        let full_scale = self.require_full_scale(channel)?;
        let code = self.output(channel)?;
        let amps = f32::from(code.magnitude) * full_scale / f32::from(DS4424_MAX_MAGNITUDE);
        Ok(match code.direction {
            CurrentDirection::Sink => -amps,
            CurrentDirection::Source => amps,
        })
    }

    /// Set the output current of a channel in amps (positive sources,
    /// negative sinks), rounded to the nearest step
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the channel's R_FS is unknown and
    /// [`Error::ValueOutOfRange`] if `|amps|` exceeds the full-scale current,
    /// both without touching the bus, or a transport error.
    pub fn set_output_current(&mut self, channel: u8, amps: f32) -> Result<(), Error<E>> {
        let full_scale = self.require_full_scale(channel)?;
        let magnitude = libm::fabsf(amps);
        if magnitude.is_nan() || magnitude > full_scale {
            return Err(Error::ValueOutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps =
            libm::roundf(magnitude / full_scale * f32::from(DS4424_MAX_MAGNITUDE)) as u8;
        let direction = if amps > 0.0 {
            CurrentDirection::Source
        } else {
            CurrentDirection::Sink
        };

        self.set_output(
            channel,
            OutputCode {
                direction,
                magnitude: steps,
            },
        )
    }

    /// Read an output register by command byte
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for a command the part does not
    /// answer to, without touching the bus, or a transport error.
    pub fn read_register(&mut self, register: u8) -> Result<RegisterValue, Error<E>> {
        self.interface.read(register)
    }

    /// Write an output register by command byte
    ///
    /// With `None` only the command byte is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error without touching the bus for unknown
    /// registers or values wider than a byte, or a transport error.
    pub fn write_register(
        &mut self,
        register: u8,
        value: Option<RegisterValue>,
    ) -> Result<(), Error<E>> {
        self.interface.write(register, value)
    }
}
