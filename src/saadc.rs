//! nRF52840 SAADC behind the [`AdcSource`] seam.
//!
//! Three single-ended channels (AIN0..AIN2), gain 1/6 against the 600 mV
//! internal reference, 3 µs acquisition, 14-bit, no hardware oversampling.
//! Averaging is done in software by the sampler.

use defmt::info;
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::peripherals::{P0_02, P0_03, P0_04, SAADC};
use embassy_nrf::saadc::{
    self, ChannelConfig, Config, Gain, Oversample, Reference, Resolution, Saadc, Time,
};
use embassy_nrf::{bind_interrupts, Peripheral};
use ess_sensor::adc::AdcSource;
use ess_sensor::config;
use ess_sensor::error::AdcError;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
});

const CHANNELS: usize = config::ADC_CHANNEL_COUNT;

/// Analog front end pins.
pub struct AdcPins {
    pub saadc: SAADC,
    pub ain0: P0_02,
    pub ain1: P0_03,
    pub ain2: P0_04,
}

fn channel(pin: impl Peripheral<P = impl saadc::Input> + 'static) -> ChannelConfig<'static> {
    let mut ch = ChannelConfig::single_ended(pin);
    ch.gain = Gain::GAIN1_6;
    ch.reference = Reference::INTERNAL;
    ch.time = Time::_3US;
    ch
}

pub struct SaadcSource {
    saadc: Saadc<'static, CHANNELS>,
}

impl SaadcSource {
    /// Configure the converter and run offset calibration.
    pub async fn new(pins: AdcPins) -> Self {
        let mut cfg = Config::default();
        cfg.resolution = Resolution::_14BIT;
        cfg.oversample = Oversample::BYPASS;

        let channels = [channel(pins.ain0), channel(pins.ain1), channel(pins.ain2)];
        let saadc = Saadc::new(pins.saadc, Irqs, cfg, channels);
        // Priorities 0, 1 and 4 belong to the SoftDevice.
        interrupt::SAADC.set_priority(Priority::P3);

        saadc.calibrate().await;
        info!("SAADC: calibrated, {} channels", CHANNELS);

        Self { saadc }
    }
}

impl AdcSource<CHANNELS> for SaadcSource {
    async fn read_raw(&mut self, raw: &mut [i16; CHANNELS]) -> Result<(), AdcError> {
        // EasyDMA sampling has no failure path; the task completes or the
        // watchdog resets us.
        self.saadc.sample(raw).await;
        Ok(())
    }
}
