//! Host-testable core of the ess-sensor firmware.
//!
//! Everything here is `no_std` and hardware-free: the oversampling
//! sampler, the trigger evaluator, the sensor model, the byte-exact
//! descriptor codec and the update cycle driver. The embedded binary
//! (`src/main.rs`, `embedded` feature) adds the SAADC, GPIO and
//! SoftDevice glue on top.
//!
//! Usage: `cargo test --lib` / `cargo test --test integration`
//!
//! Build the firmware with
//! `cargo build --release --features embedded --target thumbv7em-none-eabihf`.

#![cfg_attr(not(test), no_std)]

pub mod adc;
pub mod battery;
pub mod codec;
pub mod config;
pub mod cycle;
pub mod error;
pub mod indicator_logic;
pub mod link;
pub mod sensor;

pub use adc::{AdcSource, Calibration, OversamplingSampler};
pub use cycle::{CycleOutcome, NotifyTransport, UpdateCycleDriver};
pub use error::Error;
pub use link::LinkState;
pub use sensor::{ChannelReading, SensorState};
