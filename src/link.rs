//! Link context shared between the radio callbacks and the tick loop.
//!
//! The GATT server writes it from its event handler; the update cycle
//! and the status LEDs read it. Every field is a single atomic boolean,
//! stored and loaded with `Relaxed` ordering: readers only need the value
//! to become visible eventually, and each tick samples it exactly once.

use core::sync::atomic::{AtomicBool, Ordering};

/// CCCD value with only the "notifications enabled" bit set.
pub const CCCD_NOTIFY: u16 = 0x0001;

/// Connection and subscription state of the single peripheral link.
#[derive(Debug, Default)]
pub struct LinkState {
    connected: AtomicBool,
    notify_enabled: AtomicBool,
}

impl LinkState {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            notify_enabled: AtomicBool::new(false),
        }
    }

    pub fn on_connected(&self) {
        self.connected.store(true, Ordering::Relaxed);
    }

    /// Peer went away. The subscription does not survive the link.
    pub fn on_disconnected(&self) {
        self.connected.store(false, Ordering::Relaxed);
        self.notify_enabled.store(false, Ordering::Relaxed);
    }

    /// Client Characteristic Configuration write on the measurement
    /// characteristic. Only a plain notify subscription activates the cycle.
    pub fn on_cccd_write(&self, cccd: u16) {
        let enabled = cccd == CCCD_NOTIFY;
        self.notify_enabled.store(enabled, Ordering::Relaxed);

        #[cfg(feature = "defmt")]
        defmt::info!("Link: notifications {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Force the subscription flag. Used by tests and by transports that
    /// track subscription state themselves.
    pub fn set_notify_enabled(&self, enabled: bool) {
        self.notify_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn notify_enabled(&self) -> bool {
        self.notify_enabled.load(Ordering::Relaxed)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_and_unsubscribed() {
        let link = LinkState::new();
        assert!(!link.is_connected());
        assert!(!link.notify_enabled());
    }

    #[test]
    fn cccd_notify_bit_enables_subscription() {
        let link = LinkState::new();
        link.on_cccd_write(0x0001);
        assert!(link.notify_enabled());
        link.on_cccd_write(0x0000);
        assert!(!link.notify_enabled());
    }

    #[test]
    fn indicate_is_not_a_notify_subscription() {
        let link = LinkState::new();
        link.on_cccd_write(0x0002);
        assert!(!link.notify_enabled());
        link.on_cccd_write(0x0003);
        assert!(!link.notify_enabled());
    }

    #[test]
    fn disconnect_clears_subscription() {
        let link = LinkState::new();
        link.on_connected();
        link.on_cccd_write(CCCD_NOTIFY);
        assert!(link.is_connected());

        link.on_disconnected();
        assert!(!link.is_connected());
        assert!(!link.notify_enabled());
    }
}
