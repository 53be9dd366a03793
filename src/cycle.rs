//! Update cycle driver.
//!
//! Called once per tick. While the link has notifications enabled the
//! driver advances a free-running counter and, on cycle boundaries,
//! samples the ADC, evaluates the trigger, stores the reading and hands
//! the encoded value record to the transport when the trigger fires.
//!
//! ```text
//!            notify_enabled == true
//!   ┌──────┐ ─────────────────────▶ ┌────────┐
//!   │ Idle │                        │ Active │ ── every Nth tick ─▶ sample/evaluate/store/notify
//!   └──────┘ ◀───────────────────── └────────┘
//!            notify_enabled == false
//! ```
//!
//! The counter wraps at [`config::CYCLE_COUNTER_MODULUS`] regardless of the
//! configured interval and only advances while Active. The first Active
//! tick always runs a cycle.

use core::num::{NonZeroU16, NonZeroU32};

use crate::adc::{AdcSource, OversamplingSampler};
use crate::codec;
use crate::config;
use crate::error::NotifyError;
use crate::link::LinkState;
use crate::sensor::SensorState;

/// Outbound half of the radio transport: a notification on the
/// measurement characteristic.
///
/// Fire-and-forget from the driver's point of view. Errors are logged and
/// dropped; retrying is the transport's business.
pub trait NotifyTransport {
    fn notify(&mut self, payload: &[u8]) -> Result<(), NotifyError>;
}

/// What one call to [`UpdateCycleDriver::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Notifications disabled; nothing ran and the counter did not move.
    Idle,
    /// Active, but this tick is not a cycle boundary.
    Skipped,
    /// A reading was taken and stored. `notified` is true when the trigger
    /// fired and the value record was handed to the transport.
    Updated { notified: bool },
}

/// Free-running tick counter gating the cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleCounter {
    count: u8,
}

impl CycleCounter {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Advance by one tick. Returns true when the tick, as counted before
    /// advancing, lands on a multiple of `interval`.
    pub fn tick(&mut self, interval: NonZeroU32) -> bool {
        let due = u32::from(self.count) % interval.get() == 0;
        if self.count % config::CYCLE_COUNTER_MODULUS == 0 {
            self.count = 0;
        }
        self.count += 1;
        due
    }
}

/// Owns the sampler and the sensor state for the lifetime of the loop.
pub struct UpdateCycleDriver<A, const N: usize> {
    sampler: OversamplingSampler<A, N>,
    sensor: SensorState<N>,
    counter: CycleCounter,
    interval: NonZeroU32,
    oversample_count: NonZeroU16,
}

impl<A: AdcSource<N>, const N: usize> UpdateCycleDriver<A, N> {
    pub fn new(
        sampler: OversamplingSampler<A, N>,
        sensor: SensorState<N>,
        interval: NonZeroU32,
        oversample_count: NonZeroU16,
    ) -> Self {
        Self {
            sampler,
            sensor,
            counter: CycleCounter::new(),
            interval,
            oversample_count,
        }
    }

    pub fn sensor(&self) -> &SensorState<N> {
        &self.sensor
    }

    pub fn counter(&self) -> CycleCounter {
        self.counter
    }

    /// Run one tick against `link` and `transport`.
    pub async fn tick<T: NotifyTransport>(
        &mut self,
        link: &LinkState,
        transport: &mut T,
    ) -> CycleOutcome {
        // Sampled once; a change mid-tick takes effect on the next one.
        if !link.notify_enabled() {
            return CycleOutcome::Idle;
        }

        if !self.counter.tick(self.interval) {
            return CycleOutcome::Skipped;
        }

        let reading = self.sampler.sample(self.oversample_count).await;
        let notify = self.sensor.update(reading);

        if notify {
            match codec::value_record(self.sensor.current_values()) {
                Ok(record) => {
                    if let Err(_e) = transport.notify(&record) {
                        #[cfg(feature = "defmt")]
                        defmt::debug!("Cycle: notify failed: {}", _e);
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Cycle: value record not encoded: {}", _e);
                }
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Cycle: {} (notify={})",
            self.sensor.current_values(),
            notify
        );

        CycleOutcome::Updated { notified: notify }
    }
}
