//! Application-wide constants and compile-time configuration.
//!
//! All hardware channel assignments, timing parameters, sensor metadata
//! and protocol constants live here so they can be tuned in one place.

// ADC (nRF52840 SAADC)

/// Number of analog channels sampled per conversion (AIN0, AIN1, AIN2).
pub const ADC_CHANNEL_COUNT: usize = 3;

/// SAADC resolution in bits.
pub const ADC_RESOLUTION_BITS: u8 = 14;

/// Internal reference voltage (mV).
pub const ADC_REFERENCE_MV: f32 = 600.0;

/// Inverse of the channel gain (gain 1/6 → 6).
pub const ADC_GAIN_DIVISOR: f32 = 6.0;

/// Highest code at `ADC_RESOLUTION_BITS` (2^14 - 1).
pub const ADC_FULL_SCALE_CODE: f32 = ((1u32 << ADC_RESOLUTION_BITS) - 1) as f32;

/// Raw code → millivolts. Computed once at compile time.
pub const ADC_CALIBRATION_SCALE: f32 = (ADC_REFERENCE_MV * ADC_GAIN_DIVISOR) / ADC_FULL_SCALE_CODE;

/// Raw conversions accumulated per channel before averaging.
pub const ADC_OVERSAMPLE_COUNT: u16 = 20;

// Sensor 1

/// User description exposed next to the measurement characteristic.
pub const SENSOR_1_NAME: &str = "Sensor 1";

/// Valid range bounds (informational, never enforced).
pub const SENSOR_1_LOWER_LIMIT: i16 = -10000;
pub const SENSOR_1_UPPER_LIMIT: i16 = 10000;

/// ES Measurement descriptor contents.
pub const SENSOR_1_SAMPLING_FUNCTION: u8 = 0x00;
pub const SENSOR_1_MEASUREMENT_PERIOD: u32 = 0x01;
pub const SENSOR_1_APPLICATION: u8 = 0x1C;
pub const SENSOR_1_UNCERTAINTY: u8 = 0x04;

/// Internal update interval. Also gates the update cycle (in ticks).
pub const SENSOR_1_UPDATE_INTERVAL: u32 = 100;

/// Operand of the default fixed-interval trigger (ms).
pub const SENSOR_1_TRIGGER_INTERVAL_MS: u32 = 0;

// Tick cadence

/// Period of the main loop tick (ms).
pub const TICK_PERIOD_MS: u64 = 1;

/// The cycle counter wraps back to zero when it reaches this value.
pub const CYCLE_COUNTER_MODULUS: u8 = 100;

/// Ticks between two LED blink phase changes.
pub const LED_BLINK_PERIOD_TICKS: u32 = 400;

// BLE

/// GAP device name (also advertised as the complete local name).
pub const BLE_DEVICE_NAME: &str = "ESS Sensor";

/// GAP appearance: Generic Thermometer (0x0300).
pub const BLE_APPEARANCE: u16 = 0x0300;

/// Environmental Sensing service and its characteristic/descriptor UUIDs.
/// BAS and DIS UUIDs are declared on their service structs.
pub const UUID_ENVIRONMENTAL_SENSING: u16 = 0x181A;
pub const UUID_TEMPERATURE: u16 = 0x2A6E;
pub const UUID_ES_MEASUREMENT: u16 = 0x290C;
pub const UUID_VALID_RANGE: u16 = 0x2906;
pub const UUID_ES_TRIGGER_SETTING: u16 = 0x290D;

/// Device Information Service strings.
pub const DIS_MANUFACTURER: &str = "Nordic Semiconductor ASA";
pub const DIS_MODEL: &str = "nRF52840-ESS";

/// ATT MTU requested for the single peripheral link.
pub const BLE_ATT_MTU: u16 = 247;

// Battery

/// Level the cosmetic battery counter restarts from.
pub const BATTERY_LEVEL_FULL: u8 = 100;
