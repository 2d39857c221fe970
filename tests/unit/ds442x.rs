//! Unit tests for the DS4422/DS4424 current DACs

use crate::common::test_utils::DS4424_ADDRESS;
use crate::common::{assert_float_eq, MockI2c};
use bustools::devices::ds442x::{DS4422, DS4424, Family};
use bustools::registers;
use bustools::units::ds4424_full_scale_current;
use bustools::{CurrentDirection, Ds442x, Error, OutputCode};

const R_FS: f32 = 80_600.0;

fn create_ds4424() -> (Ds442x<MockI2c>, MockI2c) {
    let bus = MockI2c::new();
    let dac = Ds442x::new(
        bus.clone(),
        DS4424_ADDRESS,
        &DS4424,
        [Some(R_FS), None, Some(R_FS), Some(R_FS)],
    );
    (dac, bus)
}

#[test]
fn test_initialize_zeroes_every_channel() {
    let (mut dac, bus) = create_ds4424();
    bus.set_byte(DS4424_ADDRESS, 0xF9, 0xFF);

    dac.initialize().unwrap();
    assert_eq!(
        bus.writes(),
        vec![
            vec![0xF8, 0x00],
            vec![0xF9, 0x00],
            vec![0xFA, 0x00],
            vec![0xFB, 0x00],
        ]
    );

    let bus = MockI2c::new();
    let mut dac = Ds442x::new(bus.clone(), DS4424_ADDRESS, &DS4422, [None; 4]);
    dac.initialize().unwrap();
    assert_eq!(bus.writes().len(), 2);
}

#[test]
fn test_output_codes() {
    let (mut dac, bus) = create_ds4424();
    let code = OutputCode {
        direction: CurrentDirection::Source,
        magnitude: 100,
    };

    dac.set_output(2, code).unwrap();
    assert_eq!(bus.byte(DS4424_ADDRESS, 0xFA), 0xE4);
    assert_eq!(dac.output(2).unwrap(), code);

    bus.set_byte(DS4424_ADDRESS, 0xFB, 0x05);
    assert_eq!(
        dac.output(3).unwrap(),
        OutputCode {
            direction: CurrentDirection::Sink,
            magnitude: 5,
        }
    );
}

#[test]
fn test_invalid_channel_never_reaches_bus() {
    let (mut dac, bus) = create_ds4424();

    assert_eq!(dac.output(4), Err(Error::InvalidChannel(4)));
    assert_eq!(
        dac.set_output(4, OutputCode::ZERO),
        Err(Error::InvalidChannel(4))
    );
    assert_eq!(bus.transaction_count(), 0);

    let mut small = Ds442x::new(MockI2c::new(), DS4424_ADDRESS, &DS4422, [None; 4]);
    assert_eq!(small.output(2), Err(Error::InvalidChannel(2)));
}

#[test]
fn test_magnitude_limit() {
    let (mut dac, bus) = create_ds4424();
    let code = OutputCode {
        direction: CurrentDirection::Sink,
        magnitude: 128,
    };
    assert_eq!(dac.set_output(0, code), Err(Error::ValueOutOfRange));
    assert_eq!(bus.transaction_count(), 0);
}

#[test]
fn test_full_scale_current() {
    let (dac, _bus) = create_ds4424();

    let full_scale = dac.full_scale_current(0).unwrap().unwrap();
    assert_float_eq(full_scale, 96.1e-6, 0.1e-6);
    assert_eq!(dac.full_scale_current(1), Ok(None));
    assert_eq!(dac.full_scale_current(5), Err(Error::InvalidChannel(5)));
}

#[test]
fn test_output_current_round_trip() {
    let (mut dac, bus) = create_ds4424();
    let full_scale = ds4424_full_scale_current(R_FS);

    dac.set_output_current(0, full_scale * 64.0 / 127.0).unwrap();
    assert_eq!(bus.byte(DS4424_ADDRESS, 0xF8), 0xC0);

    dac.set_output_current(2, -full_scale * 64.0 / 127.0).unwrap();
    assert_eq!(bus.byte(DS4424_ADDRESS, 0xFA), 0x40);

    bus.set_byte(DS4424_ADDRESS, 0xFB, 0xFF);
    assert_float_eq(dac.output_current(3).unwrap(), full_scale, 1e-9);

    bus.set_byte(DS4424_ADDRESS, 0xFB, 0x7F);
    assert_float_eq(dac.output_current(3).unwrap(), -full_scale, 1e-9);
}

#[test]
fn test_output_current_validation() {
    let (mut dac, bus) = create_ds4424();
    let full_scale = ds4424_full_scale_current(R_FS);

    assert_eq!(dac.set_output_current(1, 1e-6), Err(Error::InvalidConfig));
    assert_eq!(dac.output_current(1), Err(Error::InvalidConfig));
    assert_eq!(
        dac.set_output_current(0, full_scale * 1.1),
        Err(Error::ValueOutOfRange)
    );
    assert_eq!(
        dac.set_output_current(0, f32::NAN),
        Err(Error::ValueOutOfRange)
    );
    assert_eq!(bus.transaction_count(), 0);
}

#[test]
fn test_raw_register_access() {
    let (mut dac, bus) = create_ds4424();

    assert_eq!(dac.read_register(0xFC), Err(Error::InvalidRegister(0xFC)));
    assert_eq!(
        dac.write_register(0xF7, Some(1)),
        Err(Error::InvalidRegister(0xF7))
    );
    assert_eq!(
        dac.write_register(0xF8, Some(0x100)),
        Err(Error::ValueOutOfRange)
    );
    assert_eq!(bus.transaction_count(), 0);

    dac.write_register(0xFB, Some(0x85)).unwrap();
    assert_eq!(dac.read_register(0xFB).unwrap(), 0x85);

    // Pointer-only write
    dac.write_register(0xF9, None).unwrap();
    assert_eq!(bus.writes().last().unwrap(), &vec![0xF9]);

    let bus = MockI2c::new();
    let mut small = Ds442x::new(bus.clone(), DS4424_ADDRESS, &DS4422, [None; 4]);
    assert_eq!(small.read_register(0xFA), Err(Error::InvalidRegister(0xFA)));
    assert_eq!(bus.transaction_count(), 0);
}

#[test]
fn test_channel_count_beyond_register_map() {
    static WIDE: Family = Family {
        name: "WIDE",
        channels: 255,
        registers: &registers::DS4424,
    };
    let bus = MockI2c::new();
    let mut dac = Ds442x::new(bus.clone(), DS4424_ADDRESS, &WIDE, [Some(R_FS); 4]);

    assert!(dac.full_scale_current(3).unwrap().is_some());
    assert_eq!(dac.full_scale_current(5), Err(Error::InvalidChannel(5)));
    assert_eq!(dac.output(4), Err(Error::InvalidChannel(4)));
    assert_eq!(dac.output(200), Err(Error::InvalidChannel(200)));
    assert_eq!(
        dac.set_output(9, OutputCode::ZERO),
        Err(Error::InvalidChannel(9))
    );
    assert_eq!(bus.transaction_count(), 0);
}
