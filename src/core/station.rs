use serde::{Deserialize, Serialize};

use crate::core::decision::{Decision, Direction};

/// Charging station shared by all the devices.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Energy price per time slot.
    pub price: Vec<f64>,

    /// Aggregate charging rate ceiling per time slot.
    #[builder(default = 1.0)]
    pub max_charge: f64,

    /// Aggregate discharging rate ceiling per time slot.
    #[builder(default = 1.0)]
    pub max_discharge: f64,
}

impl Station {
    /// Arithmetic mean of the price curve.
    #[expect(clippy::cast_precision_loss)]
    pub fn average_price(&self) -> f64 {
        if self.price.is_empty() {
            0.0
        } else {
            self.price.iter().sum::<f64>() / self.price.len() as f64
        }
    }

    pub const fn ceiling(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Charge => self.max_charge,
            Direction::Discharge => self.max_discharge,
            Direction::Idle => f64::INFINITY,
        }
    }

    /// Total rate claimed in the given direction at the slot by everyone except `device_id`.
    pub fn load_except(
        decisions: &[Decision],
        device_id: usize,
        slot: usize,
        direction: Direction,
    ) -> f64 {
        decisions
            .iter()
            .enumerate()
            .filter(|(id, _)| *id != device_id)
            .map(|(_, decision)| decision.slots[slot])
            .filter(|other| other.direction == direction)
            .map(|other| other.speed)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::{decision::Slot, device::Level};

    #[test]
    fn test_average_price() {
        let station = Station::builder().price(vec![1.0, 2.0, 4.5]).build();
        assert_abs_diff_eq!(station.average_price(), 2.5);
    }

    #[test]
    fn test_load_except_skips_own_decision_and_other_directions() {
        let mut decisions = vec![Decision::idle(2); 3];
        decisions[0].slots[1] = Slot::active(Direction::Charge, Level::new(0.25, 0.0));
        decisions[1].slots[1] = Slot::active(Direction::Charge, Level::new(0.5, 0.0));
        decisions[2].slots[1] = Slot::active(Direction::Discharge, Level::new(0.75, 0.0));

        assert_abs_diff_eq!(Station::load_except(&decisions, 2, 1, Direction::Charge), 0.75);
        assert_abs_diff_eq!(Station::load_except(&decisions, 0, 1, Direction::Charge), 0.5);
        assert_abs_diff_eq!(Station::load_except(&decisions, 0, 1, Direction::Discharge), 0.75);
        assert_abs_diff_eq!(Station::load_except(&decisions, 0, 0, Direction::Charge), 0.0);
    }
}
