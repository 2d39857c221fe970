//! Integration tests for basic workflow scenarios

use crate::common::test_utils::{DS4424_ADDRESS, PCA9555_ADDRESS};
use crate::common::{assert_float_eq, MockI2c, Transaction, INA219_ADDRESS, LM75_ADDRESS};
use bustools::devices::ds442x::DS4424;
use bustools::devices::pca95xx::PCA9555;
use bustools::{
    Direction, Ds442x, Error, FaultQueue, Ina219, Ina219Config, Level, Lm75, Lm75Config,
    OsPolarity, Pca95xx,
};

#[test]
fn test_shared_bus_with_all_devices() {
    let bus = MockI2c::with_devices(&[
        INA219_ADDRESS,
        LM75_ADDRESS,
        PCA9555_ADDRESS,
        DS4424_ADDRESS,
    ]);
    bus.set_byte(PCA9555_ADDRESS, 0x06, 0xFF);
    bus.set_byte(PCA9555_ADDRESS, 0x07, 0xFF);

    let mut monitor = Ina219::new(
        bus.clone(),
        INA219_ADDRESS,
        Ina219Config::default(),
        3.2,
        0.1,
    )
    .unwrap();
    let mut sensor = Lm75::with_config(
        bus.clone(),
        LM75_ADDRESS,
        Lm75Config {
            polarity: OsPolarity::ActiveHigh,
            fault_queue: FaultQueue::Six,
            ..Lm75Config::default()
        },
    )
    .unwrap();
    let mut gpio = Pca95xx::new(bus.clone(), PCA9555_ADDRESS, &PCA9555);
    let mut dac = Ds442x::new(bus.clone(), DS4424_ADDRESS, &DS4424, [Some(80_600.0); 4]);

    // Set up simulated measurements
    bus.set_word(INA219_ADDRESS, 0x02, (3000 << 3) | 0b10);
    bus.set_word(INA219_ADDRESS, 0x04, 5120);
    bus.set_word(LM75_ADDRESS, 0x00, 0x1980);

    assert_float_eq(monitor.bus_voltage().unwrap(), 12.0, 1e-3);
    assert_float_eq(monitor.current().unwrap(), 0.5, 1e-4);
    assert_float_eq(sensor.temperature().unwrap().celsius, 25.5, 1e-6);

    // Drive an LED on pin 0.0
    gpio.set_direction(0, 0, Direction::Output).unwrap();
    gpio.set_output(0, 0, Level::High).unwrap();
    assert_eq!(bus.byte(PCA9555_ADDRESS, 0x06), 0xFE);
    assert_eq!(bus.byte(PCA9555_ADDRESS, 0x02), 0x01);

    dac.initialize().unwrap();
    dac.set_output_current(1, 50e-6).unwrap();
    assert!(dac.output_current(1).unwrap() > 49e-6);

    // Every transaction was addressed to a present device
    assert!(bus.transactions().iter().all(|t| match t {
        Transaction::Write { address, .. } | Transaction::WriteRead { address, .. } => [
            INA219_ADDRESS,
            LM75_ADDRESS,
            PCA9555_ADDRESS,
            DS4424_ADDRESS
        ]
        .contains(address),
    }));
}

#[test]
fn test_thermostat_thresholds() {
    let bus = MockI2c::new();
    let mut sensor = Lm75::new(bus.clone(), LM75_ADDRESS);

    sensor.set_overtemperature_shutdown(45.0).unwrap();
    sensor.set_hysteresis(40.0).unwrap();

    assert_float_eq(sensor.overtemperature_shutdown().unwrap(), 45.0, 1e-6);
    assert_float_eq(sensor.hysteresis().unwrap(), 40.0, 1e-6);

    // Shutdown keeps the thresholds
    sensor.set_shutdown(true).unwrap();
    assert!(sensor.configuration().unwrap().shutdown);
    assert_float_eq(sensor.overtemperature_shutdown().unwrap(), 45.0, 1e-6);
}

#[test]
fn test_error_recovery() {
    let bus = MockI2c::new();
    bus.set_byte(PCA9555_ADDRESS, 0x07, 0xFF);
    let mut gpio = Pca95xx::new(bus.clone(), PCA9555_ADDRESS, &PCA9555);

    bus.fail_next();
    assert!(matches!(
        gpio.set_direction(1, 0, Direction::Output),
        Err(Error::Transport(_))
    ));
    // The failed read-modify-write left the register untouched
    assert_eq!(bus.byte(PCA9555_ADDRESS, 0x07), 0xFF);

    gpio.set_direction(1, 0, Direction::Output).unwrap();
    assert_eq!(bus.byte(PCA9555_ADDRESS, 0x07), 0xFE);
}

#[test]
fn test_release_and_reuse_bus() {
    let bus = MockI2c::new();
    let mut sensor = Lm75::new(bus.clone(), LM75_ADDRESS);
    bus.set_word(LM75_ADDRESS, 0x00, 0x0C80);
    assert_float_eq(sensor.temperature().unwrap().celsius, 12.5, 1e-6);

    // Hand the same bus to another driver
    let bus = sensor.release();
    let mut monitor =
        Ina219::new(bus, INA219_ADDRESS, Ina219Config::default(), 2.0, 0.1).unwrap();
    assert_eq!(monitor.address(), INA219_ADDRESS);
    assert!(monitor.dump_registers().is_ok());
}
