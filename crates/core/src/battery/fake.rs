use anyhow::Error;
use super::{Battery, BatteryUpdate};

pub struct FakeBattery {
    update: Option<BatteryUpdate>,
}

impl FakeBattery {
    pub fn new() -> FakeBattery {
        FakeBattery { update: Some(BatteryUpdate { level: 50, scale: 100, plugged: 0 }) }
    }

    /// A source that never has a payload to hand out.
    pub fn empty() -> FakeBattery {
        FakeBattery { update: None }
    }

    pub fn set(&mut self, update: BatteryUpdate) {
        self.update = Some(update);
    }
}

impl Battery for FakeBattery {
    fn poll(&mut self) -> Result<Option<BatteryUpdate>, Error> {
        Ok(self.update)
    }
}
