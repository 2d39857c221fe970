//! Register descriptors for the supported devices
//!
//! Each device family is described by a static [`RegisterMap`]: the set of
//! command bytes the chip answers to, with the width and access mode of each
//! register. The map is what [`I2cInterface`](crate::I2cInterface) validates
//! against before anything is put on the bus.
//!
//! Configuration registers with named bit fields additionally get typed views
//! generated by `device-driver` (see [`ina219`] and [`lm75`]).

/// Register width on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
    /// Single byte register
    Byte = 1,
    /// Two byte register, MSB first
    Word = 2,
}

impl Width {
    /// Number of bytes transferred for this width
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Number of bits held by a register of this width
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self as u32) * 8
    }

    /// Largest raw value a register of this width can hold
    #[must_use]
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
        }
    }
}

/// Register access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Read-only (measurement/status registers)
    ReadOnly,
    /// Write-only
    WriteOnly,
    /// Read-write
    ReadWrite,
}

impl Access {
    /// Whether the register can be read
    #[must_use]
    pub const fn readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    /// Whether a value can be written to the register
    #[must_use]
    pub const fn writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

/// A single addressable register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    /// Command byte selecting the register
    pub address: u8,
    /// Width on the wire
    pub width: Width,
    /// Access mode
    pub access: Access,
    /// Datasheet name
    pub name: &'static str,
}

impl Register {
    const fn new(address: u8, width: Width, access: Access, name: &'static str) -> Self {
        Self {
            address,
            width,
            access,
            name,
        }
    }
}

/// The known register set of a device family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// Device family name
    pub device: &'static str,
    /// Registers, in datasheet order
    pub registers: &'static [Register],
}

impl RegisterMap {
    /// Find a register by command byte
    #[must_use]
    pub fn lookup(&self, address: u8) -> Option<&'static Register> {
        self.registers.iter().find(|r| r.address == address)
    }

    /// Whether the command byte belongs to this device
    #[must_use]
    pub fn contains(&self, address: u8) -> bool {
        self.lookup(address).is_some()
    }
}

use Access::{ReadOnly, ReadWrite};
use Width::{Byte, Word};

/// INA219 register map (pointer addresses 0x00-0x05, all 16-bit)
pub static INA219: RegisterMap = RegisterMap {
    device: "INA219",
    registers: &[
        Register::new(0x00, Word, ReadWrite, "CONFIGURATION"),
        Register::new(0x01, Word, ReadOnly, "SHUNT_VOLTAGE"),
        Register::new(0x02, Word, ReadOnly, "BUS_VOLTAGE"),
        Register::new(0x03, Word, ReadOnly, "POWER"),
        Register::new(0x04, Word, ReadOnly, "CURRENT"),
        Register::new(0x05, Word, ReadWrite, "CALIBRATION"),
    ],
};

/// LM75 register map
pub static LM75: RegisterMap = RegisterMap {
    device: "LM75",
    registers: &[
        Register::new(0x00, Word, ReadOnly, "TEMPERATURE"),
        Register::new(0x01, Byte, ReadWrite, "CONFIGURATION"),
        Register::new(0x02, Word, ReadWrite, "T_HYST"),
        Register::new(0x03, Word, ReadWrite, "T_OS"),
    ],
};

/// DS4424 register map (four current outputs)
pub static DS4424: RegisterMap = RegisterMap {
    device: "DS4424",
    registers: &[
        Register::new(0xF8, Byte, ReadWrite, "OUT0"),
        Register::new(0xF9, Byte, ReadWrite, "OUT1"),
        Register::new(0xFA, Byte, ReadWrite, "OUT2"),
        Register::new(0xFB, Byte, ReadWrite, "OUT3"),
    ],
};

/// DS4422 register map (two current outputs)
pub static DS4422: RegisterMap = RegisterMap {
    device: "DS4422",
    registers: &[
        Register::new(0xF8, Byte, ReadWrite, "OUT0"),
        Register::new(0xF9, Byte, ReadWrite, "OUT1"),
    ],
};

const SINGLE_PORT: &[Register] = &[
    Register::new(0x00, Byte, ReadOnly, "INPUT"),
    Register::new(0x01, Byte, ReadWrite, "OUTPUT"),
    Register::new(0x02, Byte, ReadWrite, "POLARITY"),
    Register::new(0x03, Byte, ReadWrite, "CONFIGURATION"),
];

/// PCA9536 register map (one 4-bit port, register offset 1)
pub static PCA9536: RegisterMap = RegisterMap {
    device: "PCA9536",
    registers: SINGLE_PORT,
};

/// PCA9554 register map (one 8-bit port, register offset 1)
pub static PCA9554: RegisterMap = RegisterMap {
    device: "PCA9554",
    registers: SINGLE_PORT,
};

/// PCA9557 register map (one 8-bit port, register offset 1)
pub static PCA9557: RegisterMap = RegisterMap {
    device: "PCA9557",
    registers: SINGLE_PORT,
};

/// PCA9555 register map (two 8-bit ports, register offset 2)
pub static PCA9555: RegisterMap = RegisterMap {
    device: "PCA9555",
    registers: &[
        Register::new(0x00, Byte, ReadOnly, "INPUT_0"),
        Register::new(0x01, Byte, ReadOnly, "INPUT_1"),
        Register::new(0x02, Byte, ReadWrite, "OUTPUT_0"),
        Register::new(0x03, Byte, ReadWrite, "OUTPUT_1"),
        Register::new(0x04, Byte, ReadWrite, "POLARITY_0"),
        Register::new(0x05, Byte, ReadWrite, "POLARITY_1"),
        Register::new(0x06, Byte, ReadWrite, "CONFIGURATION_0"),
        Register::new(0x07, Byte, ReadWrite, "CONFIGURATION_1"),
    ],
};

/// PCA9505 register map (five 8-bit ports, register offset 8)
///
/// Only the non auto-increment bank registers are listed; the mask interrupt
/// bank at 0x20 is not driven by this crate.
pub static PCA9505: RegisterMap = RegisterMap {
    device: "PCA9505",
    registers: &[
        Register::new(0x00, Byte, ReadOnly, "IP0"),
        Register::new(0x01, Byte, ReadOnly, "IP1"),
        Register::new(0x02, Byte, ReadOnly, "IP2"),
        Register::new(0x03, Byte, ReadOnly, "IP3"),
        Register::new(0x04, Byte, ReadOnly, "IP4"),
        Register::new(0x08, Byte, ReadWrite, "OP0"),
        Register::new(0x09, Byte, ReadWrite, "OP1"),
        Register::new(0x0A, Byte, ReadWrite, "OP2"),
        Register::new(0x0B, Byte, ReadWrite, "OP3"),
        Register::new(0x0C, Byte, ReadWrite, "OP4"),
        Register::new(0x10, Byte, ReadWrite, "PI0"),
        Register::new(0x11, Byte, ReadWrite, "PI1"),
        Register::new(0x12, Byte, ReadWrite, "PI2"),
        Register::new(0x13, Byte, ReadWrite, "PI3"),
        Register::new(0x14, Byte, ReadWrite, "PI4"),
        Register::new(0x18, Byte, ReadWrite, "IOC0"),
        Register::new(0x19, Byte, ReadWrite, "IOC1"),
        Register::new(0x1A, Byte, ReadWrite, "IOC2"),
        Register::new(0x1B, Byte, ReadWrite, "IOC3"),
        Register::new(0x1C, Byte, ReadWrite, "IOC4"),
    ],
};

/// INA219 typed register views
pub mod ina219 {
    /// CONFIGURATION register address
    pub const CONFIGURATION: u8 = 0x00;
    /// SHUNT_VOLTAGE register address
    pub const SHUNT_VOLTAGE: u8 = 0x01;
    /// BUS_VOLTAGE register address
    pub const BUS_VOLTAGE: u8 = 0x02;
    /// POWER register address
    pub const POWER: u8 = 0x03;
    /// CURRENT register address
    pub const CURRENT: u8 = 0x04;
    /// CALIBRATION register address
    pub const CALIBRATION: u8 = 0x05;

    device_driver::create_device!(
        device_name: Ina219Registers,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = BE;
            }

            /// CONFIGURATION (0x00)
            /// Power-on value: 0x399F
            register Configuration {
                const ADDRESS = 0x00;
                const SIZE_BITS = 16;

                /// Operating mode (MODE3..MODE1)
                mode: uint = 0..3,
                /// Shunt ADC resolution/averaging (SADC4..SADC1)
                sadc: uint = 3..7,
                /// Bus ADC resolution/averaging (BADC4..BADC1)
                badc: uint = 7..11,
                /// PGA gain and shunt voltage range (PG1..PG0)
                pg: uint = 11..13,
                /// Bus voltage range (0 = 16V, 1 = 32V)
                brng: bool = 13,
                reserved_14: uint = 14..15,
                /// Reset, self-clearing
                rst: bool = 15,
            }
        }
    );
}

/// LM75 typed register views
pub mod lm75 {
    /// TEMPERATURE register address
    pub const TEMPERATURE: u8 = 0x00;
    /// CONFIGURATION register address
    pub const CONFIGURATION: u8 = 0x01;
    /// T_HYST register address
    pub const HYSTERESIS: u8 = 0x02;
    /// T_OS register address
    pub const OVERTEMPERATURE_SHUTDOWN: u8 = 0x03;

    device_driver::create_device!(
        device_name: Lm75Registers,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = BE;
            }

            /// CONFIGURATION (0x01)
            register Configuration {
                const ADDRESS = 0x01;
                const SIZE_BITS = 8;

                /// Shutdown
                shutdown: bool = 0,
                /// OS operation mode (0 = comparator, 1 = interrupt)
                os_interrupt: bool = 1,
                /// OS output polarity (0 = active low, 1 = active high)
                os_active_high: bool = 2,
                /// Fault queue length (1, 2, 4, 6 faults)
                fault_queue: uint = 3..5,
                reserved_7_5: uint = 5..8,
            }
        }
    );
}
