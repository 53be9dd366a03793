//! Status LED policy, independent of GPIO.

use crate::config;

/// Desired on/off state of both status LEDs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedLevels {
    /// Connection indicator.
    pub red: bool,
    /// Heartbeat.
    pub blue: bool,
}

/// Red follows the blink phase only while connected; blue always does.
pub fn led_levels(connected: bool, phase_on: bool) -> LedLevels {
    LedLevels {
        red: connected && phase_on,
        blue: phase_on,
    }
}

/// Blink phase plus the tick counter that paces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blinker {
    ticks: u32,
    period: u32,
    phase_on: bool,
}

impl Blinker {
    pub const fn new(period_ticks: u32) -> Self {
        Self {
            ticks: 0,
            period: period_ticks,
            phase_on: false,
        }
    }

    pub fn phase_on(&self) -> bool {
        self.phase_on
    }

    /// Advance one tick. Returns the new phase on ticks where it toggles:
    /// the first tick and every `period` ticks after it.
    pub fn tick(&mut self) -> Option<bool> {
        let due = self.ticks == 0;
        self.ticks += 1;
        if self.ticks >= self.period {
            self.ticks = 0;
        }

        if due {
            self.phase_on = !self.phase_on;
            Some(self.phase_on)
        } else {
            None
        }
    }
}

impl Default for Blinker {
    fn default() -> Self {
        Self::new(config::LED_BLINK_PERIOD_TICKS)
    }
}
