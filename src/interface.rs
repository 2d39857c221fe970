//! Validated register access over an I2C bus
//!
//! [`I2cInterface`] binds an `embedded-hal` I2C bus to one slave address and
//! one [`RegisterMap`]. Every transaction is checked against the map before
//! any byte is put on the bus, so an unknown register, a forbidden access or an
//! oversized value never generates traffic.
//!
//! The interface also implements `device-driver`'s [`RegisterInterface`], which
//! routes the typed register views in [`crate::registers`] through the same
//! checks.

use device_driver::RegisterInterface;
use embedded_hal::i2c::I2c;

use crate::registers::{Register, RegisterMap};
use crate::{Error, RegisterValue, codec};

/// I2C interface to a single device
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
    map: &'static RegisterMap,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new interface for the device at `address`
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus (or a shared-bus device from `embedded-hal-bus`)
    /// * `address` - 7-bit slave address
    /// * `map` - The device's register map
    pub const fn new(i2c: I2C, address: u8, map: &'static RegisterMap) -> Self {
        Self { i2c, address, map }
    }

    /// Slave address
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Register map used for validation
    pub const fn map(&self) -> &'static RegisterMap {
        self.map
    }

    /// Consume the interface and return the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> I2cInterface<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Look up a register, failing with [`Error::InvalidRegister`]
    ///
    /// # Errors
    ///
    /// Returns an error if `register` is not part of the device's map.
    pub fn register(&self, register: u8) -> Result<&'static Register, Error<E>> {
        self.map
            .lookup(register)
            .ok_or(Error::InvalidRegister(register))
    }

    /// Read a register
    ///
    /// Sends the command byte and reads `width` bytes back in one
    /// write-then-read transaction. Multi-byte values are assembled MSB first.
    ///
    /// # Errors
    ///
    /// Returns an error if the register is unknown or not readable, or if the
    /// bus transaction fails.
    pub fn read(&mut self, register: u8) -> Result<RegisterValue, Error<E>> {
        let reg = self.register(register)?;
        if !reg.access.readable() {
            return Err(Error::AccessDenied(register));
        }

        let mut buffer = [0u8; 2];
        let data = &mut buffer[..reg.width.bytes()];
        self.i2c
            .write_read(self.address, &[register], data)
            .map_err(Error::Transport)?;

        let value = codec::decode(reg.width, data);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "{} 0x{:02X} read {} = 0x{:04X}",
            self.map.device,
            self.address,
            reg.name,
            value
        );

        Ok(value)
    }

    /// Write a register
    ///
    /// With `value == None` only the command byte is sent, which moves the
    /// device's register pointer (and is how pulse-style registers are
    /// triggered).
    ///
    /// # Errors
    ///
    /// Returns an error if the register is unknown, if a value is given for a
    /// read-only register, if the value does not fit the register width, or if
    /// the bus transaction fails.
    pub fn write(&mut self, register: u8, value: Option<RegisterValue>) -> Result<(), Error<E>> {
        let reg = self.register(register)?;
        if value.is_some() && !reg.access.writable() {
            return Err(Error::AccessDenied(register));
        }
        let frame =
            codec::command_frame(register, reg.width, value).ok_or(Error::ValueOutOfRange)?;

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "{} 0x{:02X} write {} {:02X}",
            self.map.device,
            self.address,
            reg.name,
            frame.as_slice()
        );

        self.i2c
            .write(self.address, &frame)
            .map_err(Error::Transport)
    }

    /// Write a register and check that it reads back as written
    ///
    /// Only the bits in `mask` are compared, so self-clearing and reserved bits
    /// can be excluded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMismatch`] if the read-back differs, or
    /// any error from [`write`](Self::write) and [`read`](Self::read).
    pub fn write_verified(
        &mut self,
        register: u8,
        value: RegisterValue,
        mask: RegisterValue,
    ) -> Result<(), Error<E>> {
        self.write(register, Some(value))?;
        let actual = self.read(register)?;
        if actual & mask != value & mask {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{} 0x{:02X}: register 0x{:02X} wrote 0x{:04X}, read back 0x{:04X}",
                self.map.device,
                self.address,
                register,
                value,
                actual
            );
            return Err(Error::ConfigurationMismatch { register });
        }
        Ok(())
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = Error<E>;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let reg = self.register(address)?;
        if reg.width.bits() != size_bits || read_data.len() != reg.width.bytes() {
            return Err(Error::InvalidRegister(address));
        }
        let value = self.read(address)?;
        let bytes = value.to_be_bytes();
        read_data.copy_from_slice(&bytes[2 - reg.width.bytes()..]);
        Ok(())
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let reg = self.register(address)?;
        if reg.width.bits() != size_bits || write_data.len() != reg.width.bytes() {
            return Err(Error::InvalidRegister(address));
        }
        self.write(address, Some(codec::decode(reg.width, write_data)))
    }
}
