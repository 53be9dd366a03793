//! Analog acquisition - the raw-conversion seam and the oversampling
//! sampler built on top of it.
//!
//! The firmware plugs the nRF52840 SAADC in behind [`AdcSource`]; host
//! tests plug in scripted sources.

pub mod sampler;

pub use sampler::{Calibration, OversamplingSampler};

use crate::error::AdcError;

/// One raw multi-channel conversion, channel codes in channel order.
///
/// Implementations must be bounded in time. On error they leave `raw`
/// as it was (or partially written); the sampler uses it regardless.
#[allow(async_fn_in_trait)]
pub trait AdcSource<const N: usize> {
    async fn read_raw(&mut self, raw: &mut [i16; N]) -> Result<(), AdcError>;
}
