//! Battery Service (0x180F).

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::info;
use nrf_softdevice::ble::Connection;

/// Battery Level (0x2A19), percent.
#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    pub battery_level: u8,
}

/// Tracks whether the peer subscribed to battery level notifications.
pub struct BatteryReporter {
    notify_enabled: AtomicBool,
}

impl BatteryReporter {
    pub const fn new() -> Self {
        Self {
            notify_enabled: AtomicBool::new(false),
        }
    }

    pub fn on_cccd_write(&self, notifications: bool) {
        info!("BAS: notifications {}", notifications);
        self.notify_enabled.store(notifications, Ordering::Relaxed);
    }

    pub fn on_disconnected(&self) {
        self.notify_enabled.store(false, Ordering::Relaxed);
    }

    /// Publish `level`: notify when subscribed, otherwise just update
    /// the readable value. Dropped silently if the stack is busy.
    pub fn report(&self, service: &BatteryService, conn: &Connection, level: u8) {
        if self.notify_enabled.load(Ordering::Relaxed) {
            let _ = service.battery_level_notify(conn, &level);
        } else {
            let _ = service.battery_level_set(&level);
        }
    }
}
