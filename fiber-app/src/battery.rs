//! Battery Status API source.

use fiber_core::{BatterySource, BatteryStatus, Subscription};
use web_sys::BatteryManager;

use crate::listener::EventListener;

const BATTERY_EVENTS: [&str; 2] = ["levelchange", "chargingchange"];

/// [`BatterySource`] over the object resolved by `navigator.getBattery()`.
pub struct WebBattery {
    manager: BatteryManager,
}

impl WebBattery {
    /// Wrap a resolved battery manager.
    #[must_use]
    pub fn new(manager: BatteryManager) -> Self {
        Self { manager }
    }
}

fn read(manager: &BatteryManager) -> BatteryStatus {
    BatteryStatus::new(manager.level(), manager.charging())
}

impl BatterySource for WebBattery {
    fn status(&self) -> BatteryStatus {
        read(&self.manager)
    }

    fn on_change(&self, mut callback: Box<dyn FnMut(BatteryStatus)>) -> Box<dyn Subscription> {
        let manager = self.manager.clone();
        Box::new(EventListener::listen(&self.manager, &BATTERY_EVENTS, move || {
            callback(read(&manager));
        }))
    }
}
