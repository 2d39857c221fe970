//! Common test utilities and mock implementations


pub use mock_i2c::{MockError, MockI2c, Transaction};
pub use test_utils::{assert_float_eq, create_ina219, INA219_ADDRESS, LM75_ADDRESS};
