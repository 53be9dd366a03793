//! Fixed-layout records for the Environmental Sensing characteristic and
//! its descriptors.
//!
//! Layouts (all multi-byte fields little-endian):
//! ```text
//! ES Measurement (11 bytes):
//!   [0..2]  flags            u16
//!   [2]     sampling function
//!   [3..6]  measurement period  u24
//!   [6..9]  update interval     u24
//!   [9]     application
//!   [10]    uncertainty
//!
//! ES Trigger Setting (1, 3 or 4 bytes):
//!   [0]     condition
//!   [1..4]  interval ms u24      (fixed interval / no-less-than)
//!   [1..3]  reference   i16      (reference comparisons)
//!
//! Valid Range (4 bytes):   lower i16, upper i16
//! Current value (2N bytes): one i16 per channel, channel order
//! ```
//!
//! 24-bit fields carry the low three bytes of a `u32`; higher bits are
//! dropped.

use crate::error::EncodingError;
use crate::sensor::trigger::{OperandKind, TriggerCondition, TriggerOperand};
use crate::sensor::{ChannelReading, MeasurementDescriptor, TriggerSetting, ValidRange};

/// ES Measurement record size in bytes.
pub const MEASUREMENT_RECORD_SIZE: usize = 11;

/// Valid Range record size in bytes.
pub const VALID_RANGE_RECORD_SIZE: usize = 4;

/// Largest ES Trigger Setting record (condition + 24-bit interval).
pub const TRIGGER_RECORD_MAX_SIZE: usize = 4;

/// Largest current-value record we stage for a notification.
pub const VALUE_RECORD_MAX_SIZE: usize = 20;

/// Bytes a current-value record with `channels` entries occupies.
pub const fn value_record_size(channels: usize) -> usize {
    channels * 2
}

/// Staging buffer for an encoded current-value record.
pub type ValueRecord = heapless::Vec<u8, VALUE_RECORD_MAX_SIZE>;

fn ensure_capacity(buf: &[u8], needed: usize) -> Result<(), EncodingError> {
    if buf.len() < needed {
        return Err(EncodingError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

fn ensure_input(data: &[u8], needed: usize) -> Result<(), EncodingError> {
    if data.len() < needed {
        return Err(EncodingError::Truncated {
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

/// Low three bytes of `value`, little-endian.
pub fn put_le24(value: u32, out: &mut [u8; 3]) {
    let bytes = value.to_le_bytes();
    out.copy_from_slice(&bytes[..3]);
}

pub fn get_le24(bytes: [u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

// ES Measurement

/// Serialise the ES Measurement descriptor. Returns the bytes written.
pub fn encode_measurement(
    meas: &MeasurementDescriptor,
    buf: &mut [u8],
) -> Result<usize, EncodingError> {
    ensure_capacity(buf, MEASUREMENT_RECORD_SIZE)?;

    buf[0..2].copy_from_slice(&meas.flags.to_le_bytes());
    buf[2] = meas.sampling_function;
    let mut le24 = [0u8; 3];
    put_le24(meas.measurement_period, &mut le24);
    buf[3..6].copy_from_slice(&le24);
    put_le24(meas.update_interval, &mut le24);
    buf[6..9].copy_from_slice(&le24);
    buf[9] = meas.application;
    buf[10] = meas.uncertainty;
    Ok(MEASUREMENT_RECORD_SIZE)
}

pub fn decode_measurement(data: &[u8]) -> Result<MeasurementDescriptor, EncodingError> {
    ensure_input(data, MEASUREMENT_RECORD_SIZE)?;

    Ok(MeasurementDescriptor {
        flags: u16::from_le_bytes([data[0], data[1]]),
        sampling_function: data[2],
        measurement_period: get_le24([data[3], data[4], data[5]]),
        update_interval: get_le24([data[6], data[7], data[8]]),
        application: data[9],
        uncertainty: data[10],
    })
}

// ES Trigger Setting

/// Record size for a given condition.
pub const fn trigger_record_size(condition: TriggerCondition) -> usize {
    match condition.operand_kind() {
        OperandKind::None => 1,
        OperandKind::Interval => 4,
        OperandKind::Reference => 3,
    }
}

/// Serialise the ES Trigger Setting descriptor. Returns the bytes written.
pub fn encode_trigger_setting(
    setting: &TriggerSetting,
    buf: &mut [u8],
) -> Result<usize, EncodingError> {
    let condition = setting.condition();
    let size = trigger_record_size(condition);
    ensure_capacity(buf, size)?;

    buf[0] = condition.code();
    match setting.operand() {
        TriggerOperand::None => {}
        TriggerOperand::Interval(ms) => {
            let mut le24 = [0u8; 3];
            put_le24(ms, &mut le24);
            buf[1..4].copy_from_slice(&le24);
        }
        TriggerOperand::Reference(reference) => {
            buf[1..3].copy_from_slice(&reference.to_le_bytes());
        }
    }
    Ok(size)
}

/// Parse an ES Trigger Setting record. Unknown condition codes come back
/// as [`TriggerSetting::Unrecognized`], which never notifies.
pub fn decode_trigger_setting(data: &[u8]) -> Result<TriggerSetting, EncodingError> {
    ensure_input(data, 1)?;
    let condition = TriggerCondition::from(data[0]);
    ensure_input(data, trigger_record_size(condition))?;

    let operand = match condition.operand_kind() {
        OperandKind::None => TriggerOperand::None,
        OperandKind::Interval => TriggerOperand::Interval(get_le24([data[1], data[2], data[3]])),
        OperandKind::Reference => TriggerOperand::Reference(i16::from_le_bytes([data[1], data[2]])),
    };

    // operand_kind() and from_operand() agree by construction.
    TriggerSetting::from_operand(condition, operand).ok_or(EncodingError::Truncated {
        needed: trigger_record_size(condition),
        available: data.len(),
    })
}

// Valid Range

pub fn encode_valid_range(range: &ValidRange, buf: &mut [u8]) -> Result<usize, EncodingError> {
    ensure_capacity(buf, VALID_RANGE_RECORD_SIZE)?;

    buf[0..2].copy_from_slice(&range.lower.to_le_bytes());
    buf[2..4].copy_from_slice(&range.upper.to_le_bytes());
    Ok(VALID_RANGE_RECORD_SIZE)
}

pub fn decode_valid_range(data: &[u8]) -> Result<ValidRange, EncodingError> {
    ensure_input(data, VALID_RANGE_RECORD_SIZE)?;

    Ok(ValidRange::new(
        i16::from_le_bytes([data[0], data[1]]),
        i16::from_le_bytes([data[2], data[3]]),
    ))
}

// Current value

/// Serialise the live reading, one little-endian i16 per channel.
pub fn encode_current_values<const N: usize>(
    reading: &ChannelReading<N>,
    buf: &mut [u8],
) -> Result<usize, EncodingError> {
    let size = value_record_size(N);
    ensure_capacity(buf, size)?;

    for (chunk, value) in buf[..size].chunks_exact_mut(2).zip(reading.values()) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    Ok(size)
}

/// Encode the live reading into a notification staging buffer.
pub fn value_record<const N: usize>(
    reading: &ChannelReading<N>,
) -> Result<ValueRecord, EncodingError> {
    let mut buf = [0u8; VALUE_RECORD_MAX_SIZE];
    let len = encode_current_values(reading, &mut buf)?;

    let mut record = ValueRecord::new();
    // len <= VALUE_RECORD_MAX_SIZE, checked by encode_current_values.
    let _ = record.extend_from_slice(&buf[..len]);
    Ok(record)
}

pub fn decode_current_values<const N: usize>(
    data: &[u8],
) -> Result<ChannelReading<N>, EncodingError> {
    ensure_input(data, value_record_size(N))?;

    let mut values = [0i16; N];
    for (value, chunk) in values.iter_mut().zip(data.chunks_exact(2)) {
        *value = i16::from_le_bytes([chunk[0], chunk[1]]);
    }
    Ok(ChannelReading::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::sensor_1;

    #[test]
    fn measurement_record_layout() {
        let meas = *sensor_1().measurement();
        let mut buf = [0u8; MEASUREMENT_RECORD_SIZE];
        let written = encode_measurement(&meas, &mut buf).unwrap();
        assert_eq!(written, 11);
        assert_eq!(
            buf,
            [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x64, 0x00, 0x00, 0x1C, 0x04]
        );
        assert_eq!(decode_measurement(&buf).unwrap(), meas);
    }

    #[test]
    fn measurement_record_truncates_wide_fields() {
        let meas = MeasurementDescriptor {
            flags: 0xBEEF,
            sampling_function: 0x02,
            measurement_period: 0x0100_1388,
            update_interval: 0xFFFF_FFFF,
            application: 0x01,
            uncertainty: 0xFF,
        };
        let mut buf = [0u8; 11];
        encode_measurement(&meas, &mut buf).unwrap();
        assert_eq!(&buf[0..2], &[0xEF, 0xBE]);
        assert_eq!(&buf[3..6], &[0x88, 0x13, 0x00]);
        assert_eq!(&buf[6..9], &[0xFF, 0xFF, 0xFF]);

        let decoded = decode_measurement(&buf).unwrap();
        assert_eq!(decoded.measurement_period, 0x1388);
        assert_eq!(decoded.update_interval, 0x00FF_FFFF);
    }

    #[test]
    fn measurement_buffer_too_small() {
        let meas = *sensor_1().measurement();
        let mut buf = [0u8; 10];
        assert_eq!(
            encode_measurement(&meas, &mut buf),
            Err(EncodingError::BufferTooSmall {
                needed: 11,
                available: 10
            })
        );
        assert_eq!(
            decode_measurement(&buf),
            Err(EncodingError::Truncated {
                needed: 11,
                available: 10
            })
        );
    }

    #[test]
    fn le24_of_5000() {
        let mut out = [0u8; 3];
        put_le24(5000, &mut out);
        assert_eq!(out, [0x88, 0x13, 0x00]);
        assert_eq!(get_le24(out), 5000);
    }

    #[test]
    fn le24_drops_bits_above_24() {
        let mut out = [0u8; 3];
        put_le24(0x0100_1388, &mut out);
        assert_eq!(out, [0x88, 0x13, 0x00]);

        put_le24(1 << 24, &mut out);
        assert_eq!(out, [0x00, 0x00, 0x00]);
    }

    #[test]
    fn trigger_record_without_operand() {
        let mut buf = [0xAAu8; TRIGGER_RECORD_MAX_SIZE];
        assert_eq!(encode_trigger_setting(&TriggerSetting::Inactive, &mut buf), Ok(1));
        assert_eq!(buf[0], 0x00);
        assert_eq!(encode_trigger_setting(&TriggerSetting::ValueChanged, &mut buf), Ok(1));
        assert_eq!(buf[0], 0x03);
        // Untouched tail.
        assert_eq!(&buf[1..], &[0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn trigger_record_with_interval() {
        let mut buf = [0u8; TRIGGER_RECORD_MAX_SIZE];
        let setting = TriggerSetting::FixedTimeInterval { interval_ms: 5000 };
        assert_eq!(encode_trigger_setting(&setting, &mut buf), Ok(4));
        assert_eq!(buf, [0x01, 0x88, 0x13, 0x00]);
        assert_eq!(decode_trigger_setting(&buf), Ok(setting));

        let setting = TriggerSetting::NoLessThanSpecifiedTime {
            interval_ms: 0x0100_1388,
        };
        assert_eq!(encode_trigger_setting(&setting, &mut buf), Ok(4));
        assert_eq!(buf, [0x02, 0x88, 0x13, 0x00]);
    }

    #[test]
    fn trigger_record_with_reference() {
        let mut buf = [0u8; TRIGGER_RECORD_MAX_SIZE];
        let setting = TriggerSetting::GreaterOrEqual { reference: -2 };
        assert_eq!(encode_trigger_setting(&setting, &mut buf), Ok(3));
        assert_eq!(&buf[..3], &[0x07, 0xFE, 0xFF]);
        assert_eq!(decode_trigger_setting(&buf[..3]), Ok(setting));
    }

    #[test]
    fn trigger_record_buffer_too_small() {
        let mut buf = [0u8; 3];
        let setting = TriggerSetting::FixedTimeInterval { interval_ms: 1 };
        assert_eq!(
            encode_trigger_setting(&setting, &mut buf),
            Err(EncodingError::BufferTooSmall {
                needed: 4,
                available: 3
            })
        );
        assert_eq!(
            encode_trigger_setting(&TriggerSetting::Inactive, &mut []),
            Err(EncodingError::BufferTooSmall {
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn trigger_decode_unknown_code_is_unrecognized() {
        let decoded = decode_trigger_setting(&[0x55, 0x10, 0x00]).unwrap();
        assert_eq!(
            decoded,
            TriggerSetting::Unrecognized {
                code: 0x55,
                reference: 0x10
            }
        );
        assert!(!decoded.should_notify(&[0], &[i16::MAX]));
    }

    #[test]
    fn trigger_decode_short_input() {
        assert_eq!(
            decode_trigger_setting(&[]),
            Err(EncodingError::Truncated {
                needed: 1,
                available: 0
            })
        );
        assert_eq!(
            decode_trigger_setting(&[0x01, 0x88]),
            Err(EncodingError::Truncated {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn valid_range_round_trip() {
        let range = ValidRange::new(-10000, 10000);
        let mut buf = [0u8; VALID_RANGE_RECORD_SIZE];
        assert_eq!(encode_valid_range(&range, &mut buf), Ok(4));
        assert_eq!(buf, [0xF0, 0xD8, 0x10, 0x27]);
        assert_eq!(decode_valid_range(&buf), Ok(range));
    }

    #[test]
    fn valid_range_buffer_too_small() {
        let mut buf = [0u8; 3];
        assert_eq!(
            encode_valid_range(&ValidRange::new(0, 1), &mut buf),
            Err(EncodingError::BufferTooSmall {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn current_values_layout() {
        let reading = ChannelReading::new([3600, -1, 0x0102]);
        let mut buf = [0u8; 6];
        assert_eq!(encode_current_values(&reading, &mut buf), Ok(6));
        assert_eq!(buf, [0x10, 0x0E, 0xFF, 0xFF, 0x02, 0x01]);
        assert_eq!(decode_current_values::<3>(&buf), Ok(reading));
    }

    #[test]
    fn current_values_buffer_too_small() {
        let reading = ChannelReading::new([1, 2, 3]);
        let mut buf = [0u8; 5];
        assert_eq!(
            encode_current_values(&reading, &mut buf),
            Err(EncodingError::BufferTooSmall {
                needed: 6,
                available: 5
            })
        );
    }

    #[test]
    fn value_record_staging() {
        let record = value_record(&ChannelReading::new([1, 2, 3])).unwrap();
        assert_eq!(record.as_slice(), &[1, 0, 2, 0, 3, 0]);

        let too_wide = ChannelReading::new([0i16; 11]);
        assert_eq!(
            value_record(&too_wide),
            Err(EncodingError::BufferTooSmall {
                needed: 22,
                available: 20
            })
        );
    }
}
