//! Unified error types for ess-sensor.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A fixed-layout record could not be encoded or decoded.
    Encoding(EncodingError),

    /// The ADC driver failed a raw conversion.
    Adc(AdcError),

    /// The radio stack refused a notification.
    Notify(NotifyError),

    /// The SoftDevice returned a BLE-level error during startup.
    Ble(BleError),
}

/// Codec failures. Records are never silently truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodingError {
    /// Destination buffer is smaller than the record's fixed size.
    BufferTooSmall { needed: usize, available: usize },
    /// Input is shorter than the record being decoded.
    Truncated { needed: usize, available: usize },
}

/// Raw conversion failures reported by an [`crate::adc::AdcSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Driver-level error code.
    Conversion(i32),
    /// The converter has not been set up yet.
    NotReady,
}

/// Notification delivery failures from the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyError {
    /// No peer connected.
    NotConnected,
    /// Raw error code from the radio stack.
    Rejected(u32),
}

/// Subset of BLE startup errors we propagate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// GATT service/characteristic registration failed.
    Register,
    /// Advertising could not start.
    Advertise,
    /// Writing an attribute value into the attribute table failed.
    SetValue,
}

// Convenience conversions

impl From<EncodingError> for Error {
    fn from(e: EncodingError) -> Self {
        Error::Encoding(e)
    }
}

impl From<AdcError> for Error {
    fn from(e: AdcError) -> Self {
        Error::Adc(e)
    }
}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Error::Notify(e)
    }
}

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
