//! Unit tests for the LM75 temperature sensor

use crate::common::{assert_float_eq, MockI2c, LM75_ADDRESS};
use bustools::registers::lm75::{CONFIGURATION, HYSTERESIS, OVERTEMPERATURE_SHUTDOWN, TEMPERATURE};
use bustools::{Error, FaultQueue, Lm75, Lm75Config, OsMode, OsPolarity};

fn create_lm75() -> (Lm75<MockI2c>, MockI2c) {
    let bus = MockI2c::new();
    (Lm75::new(bus.clone(), LM75_ADDRESS), bus)
}

#[test]
fn test_new_does_not_touch_bus() {
    let (driver, bus) = create_lm75();
    assert_eq!(driver.address(), LM75_ADDRESS);
    assert_eq!(bus.transaction_count(), 0);
}

#[test]
fn test_temperature_positive_and_negative() {
    let (mut driver, bus) = create_lm75();

    bus.set_word(LM75_ADDRESS, TEMPERATURE, 0x1900);
    assert_float_eq(driver.temperature().unwrap().celsius, 25.0, 1e-6);

    bus.set_word(LM75_ADDRESS, TEMPERATURE, 0x2380);
    let t = driver.temperature().unwrap();
    assert_float_eq(t.celsius, 35.5, 1e-6);
    assert_float_eq(t.fahrenheit(), 95.9, 1e-3);

    bus.set_word(LM75_ADDRESS, TEMPERATURE, 0xE700);
    assert_float_eq(driver.temperature().unwrap().celsius, -25.0, 1e-6);

    // Low 5 bits are unused
    bus.set_word(LM75_ADDRESS, TEMPERATURE, 0x191F);
    assert_float_eq(driver.temperature().unwrap().celsius, 25.0, 1e-6);
}

#[test]
fn test_with_config_writes_and_verifies() {
    let bus = MockI2c::new();
    let config = Lm75Config {
        shutdown: true,
        mode: OsMode::Comparator,
        polarity: OsPolarity::ActiveLow,
        fault_queue: FaultQueue::Four,
    };
    let mut driver = Lm75::with_config(bus.clone(), LM75_ADDRESS, config).unwrap();

    assert_eq!(bus.writes(), vec![vec![CONFIGURATION, 0x11]]);
    assert_eq!(driver.configuration().unwrap(), config);
}

#[test]
fn test_configuration_mismatch_is_reported() {
    let bus = MockI2c::new();
    bus.stick(LM75_ADDRESS, CONFIGURATION);
    let config = Lm75Config {
        mode: OsMode::Interrupt,
        ..Lm75Config::default()
    };
    let result = Lm75::with_config(bus, LM75_ADDRESS, config);
    assert!(matches!(
        result,
        Err(Error::ConfigurationMismatch {
            register: CONFIGURATION
        })
    ));
}

#[test]
fn test_shutdown_is_read_modify_write() {
    let (mut driver, bus) = create_lm75();
    bus.set_byte(LM75_ADDRESS, CONFIGURATION, 0x1C);

    driver.set_shutdown(true).unwrap();
    assert_eq!(bus.byte(LM75_ADDRESS, CONFIGURATION), 0x1D);

    driver.set_shutdown(false).unwrap();
    assert_eq!(bus.byte(LM75_ADDRESS, CONFIGURATION), 0x1C);
}

#[test]
fn test_thresholds() {
    let (mut driver, bus) = create_lm75();

    driver.set_overtemperature_shutdown(80.0).unwrap();
    assert_eq!(bus.word(LM75_ADDRESS, OVERTEMPERATURE_SHUTDOWN), 0x5000);
    assert_float_eq(driver.overtemperature_shutdown().unwrap(), 80.0, 1e-6);

    driver.set_hysteresis(75.5).unwrap();
    assert_eq!(bus.word(LM75_ADDRESS, HYSTERESIS), 0x4B80);
    assert_float_eq(driver.hysteresis().unwrap(), 75.5, 1e-6);

    driver.set_hysteresis(-25.0).unwrap();
    assert_eq!(bus.word(LM75_ADDRESS, HYSTERESIS), 0xE700);
    assert_float_eq(driver.hysteresis().unwrap(), -25.0, 1e-6);
}

#[test]
fn test_threshold_rounds_to_half_degree() {
    let (mut driver, bus) = create_lm75();

    driver.set_overtemperature_shutdown(80.3).unwrap();
    assert_eq!(bus.word(LM75_ADDRESS, OVERTEMPERATURE_SHUTDOWN), 0x5080);
}

#[test]
fn test_threshold_out_of_range_never_reaches_bus() {
    let (mut driver, bus) = create_lm75();

    assert_eq!(
        driver.set_overtemperature_shutdown(130.0),
        Err(Error::ValueOutOfRange)
    );
    assert_eq!(driver.set_hysteresis(-60.0), Err(Error::ValueOutOfRange));
    assert_eq!(driver.set_hysteresis(f32::NAN), Err(Error::ValueOutOfRange));
    assert_eq!(bus.transaction_count(), 0);
}

#[test]
fn test_raw_register_access() {
    let (mut driver, bus) = create_lm75();

    assert_eq!(driver.read_register(0x04), Err(Error::InvalidRegister(0x04)));
    assert_eq!(
        driver.write_register(TEMPERATURE, Some(0)),
        Err(Error::AccessDenied(TEMPERATURE))
    );
    assert_eq!(bus.transaction_count(), 0);

    // Pointer-only write
    driver.write_register(TEMPERATURE, None).unwrap();
    assert_eq!(bus.writes(), vec![vec![TEMPERATURE]]);
}
