//! Status LED driver.
//!
//! Red shows the link, blue is a heartbeat. Policy lives in
//! [`ess_sensor::indicator_logic`]; this module only drives the pins.
//! LEDs on the nRF52840-DK are active-low.

use embassy_nrf::gpio::Output;
use embassy_time::{Duration, Ticker};
use embedded_hal::digital::{OutputPin, PinState};
use ess_sensor::config;
use ess_sensor::indicator_logic::{led_levels, Blinker, LedLevels};
use ess_sensor::link::LinkState;

pub struct StatusLeds<R, B> {
    red: R,
    blue: B,
}

impl<R: OutputPin, B: OutputPin> StatusLeds<R, B> {
    pub fn new(red: R, blue: B) -> Self {
        let mut leds = Self { red, blue };
        leds.apply(LedLevels::default());
        leds
    }

    pub fn apply(&mut self, levels: LedLevels) {
        // GPIO writes on nRF are infallible.
        let _ = self.red.set_state(PinState::from(!levels.red));
        let _ = self.blue.set_state(PinState::from(!levels.blue));
    }
}

#[embassy_executor::task]
pub async fn indicator_task(
    mut leds: StatusLeds<Output<'static>, Output<'static>>,
    link: &'static LinkState,
) -> ! {
    let mut blinker = Blinker::new(config::LED_BLINK_PERIOD_TICKS);
    let mut ticker = Ticker::every(Duration::from_millis(config::TICK_PERIOD_MS));

    loop {
        ticker.next().await;
        if let Some(phase_on) = blinker.tick() {
            leds.apply(led_levels(link.is_connected(), phase_on));
        }
    }
}
