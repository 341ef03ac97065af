use crate::core::{
    decision::{Decision, Direction, Slot},
    device::{Device, Level},
    station::Station,
};

/// Station price curve and slot length that every device is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct Market<'a> {
    pub station: &'a Station,

    /// Mean price over the horizon.
    pub average_price: f64,

    pub slot_duration: f64,
}

impl<'a> Market<'a> {
    pub fn new(station: &'a Station, slot_duration: f64) -> Self {
        Self { station, average_price: station.average_price(), slot_duration }
    }

    /// Fitness of the device's decision.
    ///
    /// Early slots dominate: slot `t` is weighted with `e^-t`. Discharging is paid at most
    /// the device's agreement price.
    #[expect(clippy::cast_precision_loss)]
    pub fn benefit(&self, device: &Device, decision: &Decision) -> f64 {
        decision
            .slots
            .iter()
            .zip(&self.station.price)
            .enumerate()
            .filter(|(_, (slot, _))| slot.is_active())
            .map(|(index, (slot, price))| {
                let omega = (-(index as f64)).exp();
                let price = if slot.direction == Direction::Discharge {
                    price.min(device.agreement_price)
                } else {
                    *price
                };
                omega * price * self.traded_value(slot)
            })
            .sum()
    }

    /// Market-side value of all the decisions at the raw station price.
    pub fn revenue(&self, decisions: &[Decision]) -> f64 {
        decisions
            .iter()
            .flat_map(|decision| decision.slots.iter().zip(&self.station.price))
            .filter(|(slot, _)| slot.is_active())
            .map(|(slot, price)| price * self.traded_value(slot))
            .sum()
    }

    /// Signed energy moved within the slot, net of the level cost.
    fn traded_value(&self, slot: &Slot) -> f64 {
        slot.direction.signum() * (1.0 - slot.cost) * (slot.speed * self.slot_duration)
    }

    /// Check whether the device may switch the slot to the given level.
    ///
    /// The device's own storage must stay within its capacity, and the station ceiling must hold
    /// together with what everybody else has committed in the same direction.
    pub fn is_feasible(
        &self,
        device: &Device,
        committed: &[Decision],
        slot: usize,
        direction: Direction,
        level: Level,
    ) -> bool {
        let produced = device.produce[slot] * self.slot_duration;
        let moved = level.speed * self.slot_duration;
        let stored = device.current_storage[slot];
        let demand = device.demands[slot];

        let fits_device = match direction {
            Direction::Charge => produced + moved + stored - demand <= device.overall_capacity,
            Direction::Discharge => produced - moved + stored >= demand,
            Direction::Idle => true,
        };
        fits_device
            && Station::load_except(committed, device.id, slot, direction) + level.speed
                <= self.station.ceiling(direction)
    }
}
