//! Device models
//!
//! Each model owns an [`I2cInterface`](crate::I2cInterface) bound to its
//! register map and exposes explicit get/set operations. Nothing is cached:
//! every getter re-reads the chip, and every per-bit setter is a visible
//! read-modify-write of the whole register.
//!
//! - [`ina219`]: current/voltage/power monitor
//! - [`lm75`]: temperature sensor
//! - [`pca95xx`]: port-banked GPIO expanders
//! - [`ds442x`]: current DACs

pub mod ds442x;
pub mod ina219;
pub mod lm75;
pub mod pca95xx;
