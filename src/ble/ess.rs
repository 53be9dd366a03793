//! Environmental Sensing Service (0x181A).
//!
//! One characteristic carries the live reading (one i16 per channel,
//! read + notify). Its descriptors are built by hand because the macro
//! only knows about the CCCD:
//!
//! | Descriptor            | UUID   | Contents                    |
//! |-----------------------|--------|-----------------------------|
//! | User Description      | 0x2901 | "Sensor 1"                  |
//! | ES Measurement        | 0x290C | 11-byte measurement record  |
//! | Valid Range           | 0x2906 | lower/upper i16             |
//! | ES Trigger Setting    | 0x290D | condition + operand         |
//! | CCCD                  | 0x2902 | drives the update cycle     |

use defmt::debug;
use ess_sensor::codec;
use ess_sensor::config;
use ess_sensor::cycle::NotifyTransport;
use ess_sensor::error::{BleError, Error, NotifyError};
use ess_sensor::sensor::{ChannelReading, SensorState};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{
    Attribute, Metadata, Properties, UserDescription,
};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError, RegisterError};
use nrf_softdevice::ble::{Connection, Uuid};
use nrf_softdevice::Softdevice;

/// Writes into the service's CCCD.
#[derive(Clone, Copy, defmt::Format)]
pub enum EssEvent {
    CccdWrite(u16),
}

pub struct EnvironmentalSensingService {
    value_handle: u16,
    cccd_handle: u16,
}

fn register_failed(_: RegisterError) -> Error {
    Error::Ble(BleError::Register)
}

impl EnvironmentalSensingService {
    /// Register the service with descriptor values taken from `sensor`.
    pub fn new<const N: usize>(sd: &mut Softdevice, sensor: &SensorState<N>) -> Result<Self, Error> {
        let mut value = [0u8; codec::VALUE_RECORD_MAX_SIZE];
        let value_len = codec::encode_current_values(sensor.current_values(), &mut value)?;

        let mut measurement = [0u8; codec::MEASUREMENT_RECORD_SIZE];
        codec::encode_measurement(sensor.measurement(), &mut measurement)?;

        let mut valid_range = [0u8; codec::VALID_RANGE_RECORD_SIZE];
        codec::encode_valid_range(&sensor.valid_range(), &mut valid_range)?;

        let mut trigger = [0u8; codec::TRIGGER_RECORD_MAX_SIZE];
        let trigger_len = codec::encode_trigger_setting(&sensor.trigger_setting(), &mut trigger)?;

        let mut sb = ServiceBuilder::new(sd, Uuid::new_16(config::UUID_ENVIRONMENTAL_SENSING))
            .map_err(register_failed)?;

        let metadata = Metadata {
            user_description: Some(UserDescription::new(config::SENSOR_1_NAME.as_bytes())),
            ..Metadata::new(Properties::new().read().notify())
        };
        let mut cb = sb
            .add_characteristic(
                Uuid::new_16(config::UUID_TEMPERATURE),
                Attribute::new(&value[..value_len]),
                metadata,
            )
            .map_err(register_failed)?;

        cb.add_descriptor(
            Uuid::new_16(config::UUID_ES_MEASUREMENT),
            Attribute::new(&measurement),
        )
        .map_err(register_failed)?;
        cb.add_descriptor(
            Uuid::new_16(config::UUID_VALID_RANGE),
            Attribute::new(&valid_range),
        )
        .map_err(register_failed)?;
        cb.add_descriptor(
            Uuid::new_16(config::UUID_ES_TRIGGER_SETTING),
            Attribute::new(&trigger[..trigger_len]),
        )
        .map_err(register_failed)?;

        let handles = cb.build();
        let _service = sb.build();

        debug!(
            "ESS: value handle {}, cccd handle {}",
            handles.value_handle, handles.cccd_handle
        );

        Ok(Self {
            value_handle: handles.value_handle,
            cccd_handle: handles.cccd_handle,
        })
    }

    pub fn on_write(&self, handle: u16, data: &[u8]) -> Option<EssEvent> {
        if handle != self.cccd_handle || data.is_empty() {
            return None;
        }
        let cccd = u16::from_le_bytes([data[0], data.get(1).copied().unwrap_or(0)]);
        Some(EssEvent::CccdWrite(cccd))
    }

    /// Refresh the readable value without notifying.
    pub fn store<const N: usize>(&self, sd: &Softdevice, reading: &ChannelReading<N>) {
        match codec::value_record(reading) {
            Ok(record) => {
                if gatt_server::set_value(sd, self.value_handle, &record).is_err() {
                    debug!("ESS: value not stored");
                }
            }
            Err(e) => debug!("ESS: {}", e),
        }
    }

    /// Notification transport bound to one connection.
    pub fn notifier<'a>(&self, conn: &'a Connection) -> EssNotifier<'a> {
        EssNotifier {
            conn,
            value_handle: self.value_handle,
        }
    }
}

pub struct EssNotifier<'a> {
    conn: &'a Connection,
    value_handle: u16,
}

impl NotifyTransport for EssNotifier<'_> {
    fn notify(&mut self, payload: &[u8]) -> Result<(), NotifyError> {
        gatt_server::notify_value(self.conn, self.value_handle, payload).map_err(|e| match e {
            NotifyValueError::Disconnected => NotifyError::NotConnected,
            NotifyValueError::Raw(raw) => NotifyError::Rejected(raw as u32),
        })
    }
}
