//! ess-sensor - BLE Environmental Sensing peripheral for nRF52840.
//!
//! Samples three SAADC channels, keeps the latest reading in the ESS
//! characteristic and notifies a subscribed central once per update
//! cycle. A cosmetic battery level and two status LEDs round it off.
//!
//! Build & flash: `cargo run --release --features embedded`

#![no_std]
#![no_main]

mod ble;
mod indicator;
mod saadc;

use core::num::{NonZeroU16, NonZeroU32};

use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::Priority;
use ess_sensor::adc::{Calibration, OversamplingSampler};
use ess_sensor::config;
use ess_sensor::cycle::UpdateCycleDriver;
use ess_sensor::link::LinkState;
use ess_sensor::sensor::sensor_1;
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;

use indicator::{indicator_task, StatusLeds};
use saadc::{AdcPins, SaadcSource};

/// Written by the GATT event handler, read by the tick loop and LEDs.
static LINK: LinkState = LinkState::new();

const UPDATE_INTERVAL: NonZeroU32 = match NonZeroU32::new(config::SENSOR_1_UPDATE_INTERVAL) {
    Some(interval) => interval,
    None => panic!("update interval must be non-zero"),
};

const OVERSAMPLE_COUNT: NonZeroU16 = match NonZeroU16::new(config::ADC_OVERSAMPLE_COUNT) {
    Some(count) => count,
    None => panic!("oversample count must be non-zero"),
};

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: config::BLE_ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::BLE_DEVICE_NAME.as_ptr() as _,
            current_len: config::BLE_DEVICE_NAME.len() as u16,
            max_len: config::BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ess-sensor v{} starting", env!("CARGO_PKG_VERSION"));

    // Priorities 0, 1 and 4 are reserved for the SoftDevice.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    // LED1 (red) / LED2 (blue) on the DK, active-low.
    let red = Output::new(p.P0_13, Level::High, OutputDrive::Standard);
    let blue = Output::new(p.P0_14, Level::High, OutputDrive::Standard);
    unwrap!(spawner.spawn(indicator_task(StatusLeds::new(red, blue), &LINK)));

    let adc = SaadcSource::new(AdcPins {
        saadc: p.SAADC,
        ain0: p.P0_02,
        ain1: p.P0_03,
        ain2: p.P0_04,
    })
    .await;
    let mut sampler = OversamplingSampler::new(adc, Calibration::SAADC_MILLIVOLTS);
    // The first conversion after calibration is unreliable.
    let _ = sampler.sample_once().await;

    let driver = UpdateCycleDriver::new(sampler, sensor_1(), UPDATE_INTERVAL, OVERSAMPLE_COUNT);

    let sd = Softdevice::enable(&softdevice_config());
    let server = match ble::Server::new(sd, driver.sensor()) {
        Ok(server) => server,
        Err(e) => defmt::panic!("GATT registration failed: {}", e),
    };

    let ret = unsafe { raw::sd_ble_gap_appearance_set(config::BLE_APPEARANCE) };
    if ret != raw::NRF_SUCCESS {
        warn!("GAP: appearance not set ({})", ret);
    }

    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble::peripheral_task(sd, server, driver, &LINK)));

    info!("ess-sensor running");
}
