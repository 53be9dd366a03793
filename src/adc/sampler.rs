//! Oversampled conversion with calibration scaling.
//!
//! Each call to [`OversamplingSampler::sample`] runs `count` raw
//! conversions, sums every channel into an `i32` accumulator and turns
//! the average into physical units:
//!
//! ```text
//! value = trunc((sum / count) * scale)
//! ```
//!
//! Truncation toward zero is part of the historical output format and is
//! kept on purpose. A failed conversion does not abort the cycle: the
//! last raw codes (zero before the first success) are accumulated again.

use core::num::NonZeroU16;

use super::AdcSource;
use crate::config;
use crate::sensor::ChannelReading;

/// Raw code → physical unit conversion factor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    scale: f32,
}

impl Calibration {
    /// SAADC at 14 bit, gain 1/6, 600 mV internal reference → millivolts.
    pub const SAADC_MILLIVOLTS: Self = Self {
        scale: config::ADC_CALIBRATION_SCALE,
    };

    pub const fn from_scale(scale: f32) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scale an averaged raw code, truncating toward zero.
    #[inline]
    pub fn apply(&self, average: f32) -> i16 {
        (average * self.scale) as i16
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::SAADC_MILLIVOLTS
    }
}

/// Drives an [`AdcSource`] and produces calibrated channel readings.
pub struct OversamplingSampler<A, const N: usize> {
    adc: A,
    calibration: Calibration,
    /// Codes from the most recent conversion; reused when one fails.
    raw: [i16; N],
}

impl<A: AdcSource<N>, const N: usize> OversamplingSampler<A, N> {
    pub const fn new(adc: A, calibration: Calibration) -> Self {
        Self {
            adc,
            calibration,
            raw: [0; N],
        }
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Average `oversample_count` conversions per channel and scale them.
    pub async fn sample(&mut self, oversample_count: NonZeroU16) -> ChannelReading<N> {
        let mut accumulators = [0i32; N];

        for _ in 0..oversample_count.get() {
            if let Err(_e) = self.adc.read_raw(&mut self.raw).await {
                #[cfg(feature = "defmt")]
                defmt::warn!("ADC: conversion failed ({}), reusing last codes", _e);
            }

            for (sum, &code) in accumulators.iter_mut().zip(self.raw.iter()) {
                *sum += i32::from(code);
            }
        }

        let count = f32::from(oversample_count.get());
        let mut values = [0i16; N];
        for (value, &sum) in values.iter_mut().zip(accumulators.iter()) {
            *value = self.calibration.apply(sum as f32 / count);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("ADC: {} mV", values);

        ChannelReading::new(values)
    }

    /// Single conversion, scaled. Used to flush the first result after
    /// offset calibration.
    pub async fn sample_once(&mut self) -> ChannelReading<N> {
        self.sample(NonZeroU16::MIN).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdcError;
    use embassy_futures::block_on;

    /// Replays a fixed list of conversion results, then repeats the last.
    struct ScriptedAdc<const N: usize> {
        script: std::vec::Vec<Result<[i16; N], AdcError>>,
        calls: usize,
    }

    impl<const N: usize> ScriptedAdc<N> {
        fn new(script: std::vec::Vec<Result<[i16; N], AdcError>>) -> Self {
            Self { script, calls: 0 }
        }
    }

    impl<const N: usize> AdcSource<N> for ScriptedAdc<N> {
        async fn read_raw(&mut self, raw: &mut [i16; N]) -> Result<(), AdcError> {
            let idx = self.calls.min(self.script.len() - 1);
            self.calls += 1;
            match self.script[idx] {
                Ok(codes) => {
                    *raw = codes;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    }

    fn count(n: u16) -> NonZeroU16 {
        NonZeroU16::new(n).unwrap()
    }

    #[test]
    fn calibration_scale_is_millivolts_per_code() {
        let scale = Calibration::SAADC_MILLIVOLTS.scale();
        assert!((scale - 3600.0 / 16383.0).abs() < 1e-7);
        assert_eq!(Calibration::default(), Calibration::SAADC_MILLIVOLTS);
    }

    #[test]
    fn average_is_truncated_toward_zero() {
        let adc = ScriptedAdc::new(std::vec![Ok([10, -10]), Ok([11, -11])]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::from_scale(1.0));
        let reading = block_on(sampler.sample(count(2)));
        // 10.5 → 10, -10.5 → -10
        assert_eq!(reading.values(), &[10, -10]);
    }

    #[test]
    fn output_matches_floor_of_scaled_average() {
        let script = std::vec![
            Ok([8192, 1000, 0]),
            Ok([8190, 1001, 2]),
            Ok([8194, 999, 1]),
            Ok([8192, 1000, 1]),
        ];
        let adc = ScriptedAdc::new(script.clone());
        let mut sampler = OversamplingSampler::new(adc, Calibration::SAADC_MILLIVOLTS);
        let reading = block_on(sampler.sample(count(4)));

        let scale = Calibration::SAADC_MILLIVOLTS.scale();
        for ch in 0..3 {
            let sum: i32 = script
                .iter()
                .map(|r| i32::from(r.as_ref().unwrap()[ch]))
                .sum();
            let expected = ((sum as f32 / 4.0) * scale) as i16;
            assert_eq!(reading.values()[ch], expected);
        }
        // 8192 codes ≈ 1800.1 mV, 1000 codes ≈ 219.7 mV
        assert_eq!(reading.values()[0], 1800);
        assert_eq!(reading.values()[1], 219);
        assert_eq!(reading.values()[2], 0);
    }

    #[test]
    fn default_oversample_count_runs_twenty_conversions() {
        let adc = ScriptedAdc::new(std::vec![Ok([1000, 0, 0])]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::SAADC_MILLIVOLTS);
        let reading = block_on(sampler.sample(count(config::ADC_OVERSAMPLE_COUNT)));
        assert_eq!(sampler.adc.calls, 20);
        assert_eq!(reading.values(), &[219, 0, 0]);
    }

    #[test]
    fn failure_before_first_success_accumulates_zero() {
        let adc = ScriptedAdc::new(std::vec![Err(AdcError::Conversion(-5)), Ok([100])]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::from_scale(1.0));
        // (0 + 100) / 2
        let reading = block_on(sampler.sample(count(2)));
        assert_eq!(reading.values(), &[50]);
    }

    #[test]
    fn failure_reuses_last_codes() {
        let adc = ScriptedAdc::new(std::vec![
            Ok([40]),
            Err(AdcError::NotReady),
            Err(AdcError::NotReady),
            Ok([0]),
        ]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::from_scale(1.0));
        // (40 + 40 + 40 + 0) / 4
        let reading = block_on(sampler.sample(count(4)));
        assert_eq!(reading.values(), &[30]);
    }

    #[test]
    fn stale_codes_survive_across_calls() {
        let adc = ScriptedAdc::new(std::vec![Ok([7, 8]), Err(AdcError::NotReady)]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::from_scale(1.0));
        assert_eq!(block_on(sampler.sample_once()).values(), &[7, 8]);
        // Every later conversion fails; the sampler still produces a reading.
        assert_eq!(block_on(sampler.sample(count(3))).values(), &[7, 8]);
    }

    #[test]
    fn accumulators_reset_between_calls() {
        let adc = ScriptedAdc::new(std::vec![Ok([100]), Ok([100]), Ok([20])]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::from_scale(1.0));
        assert_eq!(block_on(sampler.sample(count(2))).values(), &[100]);
        assert_eq!(block_on(sampler.sample(count(2))).values(), &[20]);
    }

    #[test]
    fn full_scale_does_not_overflow() {
        let adc = ScriptedAdc::new(std::vec![Ok([i16::MAX, i16::MIN])]);
        let mut sampler = OversamplingSampler::new(adc, Calibration::from_scale(1.0));
        let reading = block_on(sampler.sample(count(u16::MAX)));
        assert_eq!(reading.values(), &[i16::MAX, i16::MIN]);
    }
}
