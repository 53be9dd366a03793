//! Sensor model - latest reading, valid range, trigger setting and
//! measurement metadata for one logical sensor.
//!
//! Accepting a reading and deciding to notify are decoupled: every
//! reading handed to [`SensorState::update`] becomes the current value,
//! and the returned flag only says whether the peer should hear about it.

pub mod trigger;


use crate::config;
use trigger::{should_notify, TriggerCondition, TriggerOperand};

/// One physical-unit value per analog channel, produced once per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelReading<const N: usize>([i16; N]);

impl<const N: usize> ChannelReading<N> {
    pub const fn new(values: [i16; N]) -> Self {
        Self(values)
    }

    /// All-zero reading.
    pub const fn zeroed() -> Self {
        Self([0; N])
    }

    pub const fn values(&self) -> &[i16; N] {
        &self.0
    }
}

impl<const N: usize> From<[i16; N]> for ChannelReading<N> {
    fn from(values: [i16; N]) -> Self {
        Self(values)
    }
}

/// Valid Range descriptor bounds. Informational only - out-of-range
/// readings are still recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidRange {
    pub lower: i16,
    pub upper: i16,
}

impl ValidRange {
    pub const fn new(lower: i16, upper: i16) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: i16) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// ES Measurement descriptor contents. Fixed at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementDescriptor {
    /// Reserved for future use.
    pub flags: u16,
    pub sampling_function: u8,
    /// Seconds; only the low 24 bits reach the wire.
    pub measurement_period: u32,
    /// Seconds; only the low 24 bits reach the wire.
    pub update_interval: u32,
    pub application: u8,
    pub uncertainty: u8,
}

/// Trigger condition together with the operand it selects.
///
/// Each variant carries exactly the operand its condition reads, so the
/// interval and the reference value can never be confused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSetting {
    Inactive,
    FixedTimeInterval { interval_ms: u32 },
    NoLessThanSpecifiedTime { interval_ms: u32 },
    ValueChanged,
    LessThan { reference: i16 },
    LessOrEqual { reference: i16 },
    GreaterThan { reference: i16 },
    GreaterOrEqual { reference: i16 },
    EqualTo { reference: i16 },
    NotEqualTo { reference: i16 },
    /// Unknown condition code as received; laid out like a reference
    /// condition and never notifies.
    Unrecognized { code: u8, reference: i16 },
}

impl TriggerSetting {
    /// Pair a condition with its operand. Returns `None` when the operand
    /// is not the one the condition uses.
    pub fn from_operand(condition: TriggerCondition, operand: TriggerOperand) -> Option<Self> {
        use TriggerCondition as C;

        let setting = match (condition, operand) {
            (C::Inactive, TriggerOperand::None) => TriggerSetting::Inactive,
            (C::ValueChanged, TriggerOperand::None) => TriggerSetting::ValueChanged,
            (C::FixedTimeInterval, TriggerOperand::Interval(interval_ms)) => {
                TriggerSetting::FixedTimeInterval { interval_ms }
            }
            (C::NoLessThanSpecifiedTime, TriggerOperand::Interval(interval_ms)) => {
                TriggerSetting::NoLessThanSpecifiedTime { interval_ms }
            }
            (C::LessThanReference, TriggerOperand::Reference(reference)) => {
                TriggerSetting::LessThan { reference }
            }
            (C::LessOrEqualReference, TriggerOperand::Reference(reference)) => {
                TriggerSetting::LessOrEqual { reference }
            }
            (C::GreaterThanReference, TriggerOperand::Reference(reference)) => {
                TriggerSetting::GreaterThan { reference }
            }
            (C::GreaterOrEqualReference, TriggerOperand::Reference(reference)) => {
                TriggerSetting::GreaterOrEqual { reference }
            }
            (C::EqualToReference, TriggerOperand::Reference(reference)) => {
                TriggerSetting::EqualTo { reference }
            }
            (C::NotEqualToReference, TriggerOperand::Reference(reference)) => {
                TriggerSetting::NotEqualTo { reference }
            }
            (C::Unrecognized(code), TriggerOperand::Reference(reference)) => {
                TriggerSetting::Unrecognized { code, reference }
            }
            _ => return None,
        };
        Some(setting)
    }

    pub const fn condition(&self) -> TriggerCondition {
        match *self {
            TriggerSetting::Inactive => TriggerCondition::Inactive,
            TriggerSetting::FixedTimeInterval { .. } => TriggerCondition::FixedTimeInterval,
            TriggerSetting::NoLessThanSpecifiedTime { .. } => {
                TriggerCondition::NoLessThanSpecifiedTime
            }
            TriggerSetting::ValueChanged => TriggerCondition::ValueChanged,
            TriggerSetting::LessThan { .. } => TriggerCondition::LessThanReference,
            TriggerSetting::LessOrEqual { .. } => TriggerCondition::LessOrEqualReference,
            TriggerSetting::GreaterThan { .. } => TriggerCondition::GreaterThanReference,
            TriggerSetting::GreaterOrEqual { .. } => TriggerCondition::GreaterOrEqualReference,
            TriggerSetting::EqualTo { .. } => TriggerCondition::EqualToReference,
            TriggerSetting::NotEqualTo { .. } => TriggerCondition::NotEqualToReference,
            TriggerSetting::Unrecognized { code, .. } => TriggerCondition::Unrecognized(code),
        }
    }

    pub const fn operand(&self) -> TriggerOperand {
        match *self {
            TriggerSetting::Inactive | TriggerSetting::ValueChanged => TriggerOperand::None,
            TriggerSetting::FixedTimeInterval { interval_ms }
            | TriggerSetting::NoLessThanSpecifiedTime { interval_ms } => {
                TriggerOperand::Interval(interval_ms)
            }
            TriggerSetting::LessThan { reference }
            | TriggerSetting::LessOrEqual { reference }
            | TriggerSetting::GreaterThan { reference }
            | TriggerSetting::GreaterOrEqual { reference }
            | TriggerSetting::EqualTo { reference }
            | TriggerSetting::NotEqualTo { reference }
            | TriggerSetting::Unrecognized { reference, .. } => TriggerOperand::Reference(reference),
        }
    }

    /// Reference value, for reference-comparison conditions.
    pub const fn reference(&self) -> Option<i16> {
        match self.operand() {
            TriggerOperand::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Interval in milliseconds, for time-based conditions.
    pub const fn interval_ms(&self) -> Option<u32> {
        match self.operand() {
            TriggerOperand::Interval(ms) => Some(ms),
            _ => None,
        }
    }

    /// Evaluate this setting against an old/new reading pair.
    pub fn should_notify(&self, old: &[i16], new: &[i16]) -> bool {
        should_notify(self.condition(), old, new, self.reference().unwrap_or(0))
    }
}

/// Per-sensor state, owned by the update cycle for the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorState<const N: usize> {
    current: ChannelReading<N>,
    valid_range: ValidRange,
    trigger: TriggerSetting,
    measurement: MeasurementDescriptor,
}

impl<const N: usize> SensorState<N> {
    pub const fn new(
        initial: ChannelReading<N>,
        valid_range: ValidRange,
        trigger: TriggerSetting,
        measurement: MeasurementDescriptor,
    ) -> Self {
        Self {
            current: initial,
            valid_range,
            trigger,
            measurement,
        }
    }

    /// Latest accepted reading.
    pub fn current_values(&self) -> &ChannelReading<N> {
        &self.current
    }

    pub fn valid_range(&self) -> ValidRange {
        self.valid_range
    }

    pub fn trigger_setting(&self) -> TriggerSetting {
        self.trigger
    }

    pub fn measurement(&self) -> &MeasurementDescriptor {
        &self.measurement
    }

    /// Evaluate the trigger against the previous reading, then accept
    /// `reading` unconditionally. Returns whether to notify.
    pub fn update(&mut self, reading: ChannelReading<N>) -> bool {
        let notify = self
            .trigger
            .should_notify(self.current.values(), reading.values());

        #[cfg(feature = "defmt")]
        if let Some(&value) = reading.values().first() {
            if !self.valid_range.contains(value) {
                defmt::debug!(
                    "Sensor: {} outside valid range {}..={}",
                    value,
                    self.valid_range.lower,
                    self.valid_range.upper
                );
            }
        }

        self.current = reading;
        notify
    }
}

/// State for "Sensor 1" as it is exposed at startup.
pub const fn sensor_1() -> SensorState<{ config::ADC_CHANNEL_COUNT }> {
    SensorState::new(
        ChannelReading::zeroed(),
        ValidRange::new(config::SENSOR_1_LOWER_LIMIT, config::SENSOR_1_UPPER_LIMIT),
        TriggerSetting::FixedTimeInterval {
            interval_ms: config::SENSOR_1_TRIGGER_INTERVAL_MS,
        },
        MeasurementDescriptor {
            flags: 0,
            sampling_function: config::SENSOR_1_SAMPLING_FUNCTION,
            measurement_period: config::SENSOR_1_MEASUREMENT_PERIOD,
            update_interval: config::SENSOR_1_UPDATE_INTERVAL,
            application: config::SENSOR_1_APPLICATION,
            uncertainty: config::SENSOR_1_UNCERTAINTY,
        },
    )
}
