//! Single-bit helpers used for read-modify-write of register fields
//!
//! These are pure functions on a raw register value. Device models read the
//! live register, apply one of these and write the whole value back.

use crate::RegisterValue;

/// Whether the bit at `offset` is set
#[must_use]
pub const fn test_bit(value: RegisterValue, offset: u8) -> bool {
    value & (1 << offset) != 0
}

/// `value` with the bit at `offset` set to 1
#[must_use]
pub const fn set_bit(value: RegisterValue, offset: u8) -> RegisterValue {
    value | (1 << offset)
}

/// `value` with the bit at `offset` cleared
#[must_use]
pub const fn clear_bit(value: RegisterValue, offset: u8) -> RegisterValue {
    value & !(1 << offset)
}

/// `value` with the bit at `offset` inverted
#[must_use]
pub const fn toggle_bit(value: RegisterValue, offset: u8) -> RegisterValue {
    value ^ (1 << offset)
}

/// `value` with the bit at `offset` forced to `state`
#[must_use]
pub const fn write_bit(value: RegisterValue, offset: u8, state: bool) -> RegisterValue {
    if state {
        set_bit(value, offset)
    } else {
        clear_bit(value, offset)
    }
}
