//! Wire encoding of register values
//!
//! All supported chips use the same framing: a command byte selecting the
//! register, followed by `width` data bytes, most significant byte first.

use heapless::Vec;

use crate::RegisterValue;
use crate::registers::Width;

/// Largest frame ever put on the bus: command byte + 16-bit value
pub const MAX_FRAME_LEN: usize = 3;

/// A command frame ready to be written to the bus
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Decode big-endian register bytes
///
/// Only the first `width` bytes of `bytes` are used; missing bytes read as 0.
#[must_use]
pub fn decode(width: Width, bytes: &[u8]) -> RegisterValue {
    let byte = |i: usize| bytes.get(i).copied().map_or(0, RegisterValue::from);
    match width {
        Width::Byte => byte(0),
        Width::Word => (byte(0) << 8) | byte(1),
    }
}

/// Encode a register value as big-endian bytes
///
/// Returns `None` if `value` does not fit the width.
#[must_use]
pub fn encode(width: Width, value: RegisterValue) -> Option<Vec<u8, 2>> {
    if value > width.max_value() {
        return None;
    }
    let [msb, lsb] = value.to_be_bytes();
    let mut out = Vec::new();
    match width {
        Width::Byte => out.push(lsb).ok()?,
        Width::Word => out.extend_from_slice(&[msb, lsb]).ok()?,
    }
    Some(out)
}

/// Build the frame for a register write
///
/// With `value == None` the frame is the bare command byte, which sets the
/// chip's register pointer without changing any register.
#[must_use]
pub fn command_frame(command: u8, width: Width, value: Option<RegisterValue>) -> Option<Frame> {
    let mut frame = Frame::new();
    frame.push(command).ok()?;
    if let Some(value) = value {
        frame.extend_from_slice(&encode(width, value)?).ok()?;
    }
    Some(frame)
}
