//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertising** - connectable, general discoverable, listing the
//!    Environmental Sensing and Battery services.
//! 2. **GATT server** - ESS (live reading + descriptors), BAS and DIS.
//! 3. **Connection loop** - per connection, the GATT event loop runs
//!    alongside the 1 ms tick that drives the update cycle and the
//!    battery counter. Disconnection clears the subscriptions and the
//!    device goes back to advertising.

pub mod bas;
pub mod dis;
pub mod ess;

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker, Timer};
use ess_sensor::battery::SimulatedBattery;
use ess_sensor::config;
use ess_sensor::cycle::{CycleOutcome, UpdateCycleDriver};
use ess_sensor::error::{BleError, Error};
use ess_sensor::link::LinkState;
use ess_sensor::sensor::SensorState;
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
    ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::gatt_server::{self, Service, WriteOp};
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::Softdevice;

use crate::saadc::SaadcSource;
use bas::{BatteryReporter, BatteryService, BatteryServiceEvent};
use dis::DeviceInformationService;
use ess::{EnvironmentalSensingService, EssEvent};

/// Update cycle as wired on this board.
pub type SensorDriver = UpdateCycleDriver<SaadcSource, { config::ADC_CHANNEL_COUNT }>;

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(
        ServiceList::Complete,
        &[ServiceUuid16::ENVIRONMENTAL_SENSING, ServiceUuid16::BATTERY],
    )
    .raw(
        AdvertisementDataType::APPEARANCE,
        &config::BLE_APPEARANCE.to_le_bytes(),
    )
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .full_name(config::BLE_DEVICE_NAME)
    .build();

pub struct Server {
    pub ess: EnvironmentalSensingService,
    pub bas: BatteryService,
    battery: BatteryReporter,
}

pub enum ServerEvent {
    Ess(EssEvent),
    Bas(BatteryServiceEvent),
}

impl Server {
    pub fn new<const N: usize>(sd: &mut Softdevice, sensor: &SensorState<N>) -> Result<Self, Error> {
        let ess = EnvironmentalSensingService::new(sd, sensor)?;
        let bas = BatteryService::new(sd).map_err(|_| BleError::Register)?;
        // DIS values are static; nothing needs its handles afterwards.
        DeviceInformationService::new(sd)
            .map_err(|_| BleError::Register)?
            .populate()?;

        bas.battery_level_set(&config::BATTERY_LEVEL_FULL)
            .map_err(|_| BleError::SetValue)?;

        info!("GATT: ESS, BAS and DIS registered");

        Ok(Self {
            ess,
            bas,
            battery: BatteryReporter::new(),
        })
    }

    fn handle_event(&self, event: ServerEvent, link: &LinkState) {
        match event {
            ServerEvent::Ess(EssEvent::CccdWrite(cccd)) => link.on_cccd_write(cccd),
            ServerEvent::Bas(BatteryServiceEvent::BatteryLevelCccdWrite { notifications }) => {
                self.battery.on_cccd_write(notifications)
            }
        }
    }
}

impl gatt_server::Server for Server {
    type Event = ServerEvent;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        if let Some(event) = self.ess.on_write(handle, data) {
            return Some(ServerEvent::Ess(event));
        }
        if let Some(event) = self.bas.on_write(handle, data) {
            return Some(ServerEvent::Bas(event));
        }
        None
    }
}

async fn advertise(sd: &Softdevice) -> Result<Connection, BleError> {
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &ADV_DATA,
        scan_data: &SCAN_DATA,
    };
    let adv_config = peripheral::Config::default();

    peripheral::advertise_connectable(sd, adv, &adv_config)
        .await
        .map_err(|e| {
            warn!("BLE: advertising failed: {:?}", e);
            BleError::Advertise
        })
}

/// The 1 ms tick for one connection. Runs until the GATT loop ends and
/// drops it.
async fn run_ticks(
    sd: &Softdevice,
    server: &Server,
    conn: &Connection,
    driver: &mut SensorDriver,
    battery: &mut SimulatedBattery,
    link: &LinkState,
) {
    let mut notifier = server.ess.notifier(conn);
    let mut ticker = Ticker::every(Duration::from_millis(config::TICK_PERIOD_MS));

    loop {
        ticker.next().await;

        if let CycleOutcome::Updated { notified: false } = driver.tick(link, &mut notifier).await {
            // A notification already updates the stored value.
            server.ess.store(sd, driver.sensor().current_values());
        }

        server.battery.report(&server.bas, conn, battery.tick());
    }
}

#[embassy_executor::task]
pub async fn peripheral_task(
    sd: &'static Softdevice,
    server: Server,
    mut driver: SensorDriver,
    link: &'static LinkState,
) -> ! {
    let mut battery = SimulatedBattery::new();

    loop {
        info!("BLE: advertising as \"{}\"", config::BLE_DEVICE_NAME);
        let conn = match advertise(sd).await {
            Ok(conn) => conn,
            Err(_) => {
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        link.on_connected();
        info!("BLE: connected");

        let gatt = gatt_server::run(&conn, &server, |event| server.handle_event(event, link));
        let ticks = run_ticks(sd, &server, &conn, &mut driver, &mut battery, link);

        if let Either::First(reason) = select(gatt, ticks).await {
            info!("BLE: disconnected: {:?}", reason);
        }

        link.on_disconnected();
        server.battery.on_disconnected();
    }
}
