//! Cosmetic battery level for the Battery Service.
//!
//! There is no fuel gauge on the board. The level counts down by one per
//! tick and restarts at full, which keeps BAS clients visibly updating.

use crate::config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimulatedBattery {
    level: u8,
}

impl SimulatedBattery {
    pub const fn new() -> Self {
        Self {
            level: config::BATTERY_LEVEL_FULL,
        }
    }

    /// Current level in percent.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Step the level down and return it. Never reports 0.
    pub fn tick(&mut self) -> u8 {
        self.level = self.level.wrapping_sub(1);
        if self.level == 0 {
            self.level = config::BATTERY_LEVEL_FULL;
        }
        self.level
    }
}

impl Default for SimulatedBattery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full() {
        assert_eq!(SimulatedBattery::new().level(), 100);
    }

    #[test]
    fn decrements_each_tick() {
        let mut battery = SimulatedBattery::new();
        assert_eq!(battery.tick(), 99);
        assert_eq!(battery.tick(), 98);
        assert_eq!(battery.level(), 98);
    }

    #[test]
    fn wraps_from_one_back_to_full() {
        let mut battery = SimulatedBattery::new();
        for _ in 0..98 {
            battery.tick();
        }
        assert_eq!(battery.level(), 2);
        assert_eq!(battery.tick(), 1);
        assert_eq!(battery.tick(), 100);
    }

    #[test]
    fn never_reports_zero() {
        let mut battery = SimulatedBattery::new();
        assert!((0..1000).all(|_| battery.tick() != 0));
    }
}
