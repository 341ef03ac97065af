use std::fmt::{Display, Formatter};

use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::core::device::Level;

/// What a device does within a single time slot.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Take energy from the station.
    Charge,

    #[default]
    Idle,

    /// Give energy to the station.
    Discharge,
}

impl Direction {
    /// Signed interchange value: `-1` for charging, `+1` for discharging.
    pub const fn sign(self) -> i8 {
        match self {
            Self::Charge => -1,
            Self::Idle => 0,
            Self::Discharge => 1,
        }
    }

    pub fn signum(self) -> f64 {
        f64::from(self.sign())
    }

    pub const fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            -1 => Some(Self::Charge),
            0 => Some(Self::Idle),
            1 => Some(Self::Discharge),
            _ => None,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Charge => write!(f, "Charge"),
            Self::Idle => write!(f, "Idle"),
            Self::Discharge => write!(f, "Discharge"),
        }
    }
}

/// Single time slot of a [`Decision`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Slot {
    pub direction: Direction,

    /// Chosen rate, meaningful only for an active slot.
    pub speed: f64,

    /// Cost fraction of the chosen level, meaningful only for an active slot.
    pub cost: f64,
}

impl Slot {
    pub const IDLE: Self = Self { direction: Direction::Idle, speed: 0.0, cost: 0.0 };

    pub const fn active(direction: Direction, level: Level) -> Self {
        Self { direction, speed: level.speed, cost: level.cost }
    }

    pub fn is_active(&self) -> bool {
        self.direction != Direction::Idle
    }
}

/// Charging plan of one device over the whole horizon.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "DecisionRecord", into = "DecisionRecord")]
pub struct Decision {
    pub slots: Vec<Slot>,

    /// Cached fitness of the decision.
    ///
    /// Advisory only: the final report recomputes it from the slots.
    pub benefit: f64,
}

impl Decision {
    pub fn idle(n_slots: usize) -> Self {
        Self { slots: vec![Slot::IDLE; n_slots], benefit: 0.0 }
    }

    /// Whether the decision does nothing at all.
    pub fn is_unallocated(&self) -> bool {
        !self.slots.iter().any(Slot::is_active)
    }

    /// Whether both decisions charge and discharge the same way at the same rates.
    ///
    /// Costs and the cached benefit are not compared.
    #[expect(clippy::float_cmp)]
    pub fn is_same_move(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self.slots.iter().zip(&other.slots).all(|(lhs, rhs)| {
                lhs.direction == rhs.direction && lhs.speed == rhs.speed
            })
    }

    pub fn n_active_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }
}

/// Interchange shape of a [`Decision`]: three parallel per-slot lists.
#[derive(Deserialize, Serialize)]
struct DecisionRecord {
    dc: Vec<i8>,
    speed: Vec<f64>,
    cost: Vec<f64>,
    benefit: f64,
}

impl TryFrom<DecisionRecord> for Decision {
    type Error = String;

    fn try_from(record: DecisionRecord) -> Result<Self, Self::Error> {
        if record.dc.len() != record.speed.len() || record.dc.len() != record.cost.len() {
            return Err(format!(
                "decision lists differ in length: {} dc, {} speed, {} cost",
                record.dc.len(),
                record.speed.len(),
                record.cost.len(),
            ));
        }
        let slots = izip!(record.dc, record.speed, record.cost)
            .map(|(dc, speed, cost)| -> Result<Slot, String> {
                let direction =
                    Direction::from_sign(dc).ok_or_else(|| format!("invalid dc value: {dc}"))?;
                Ok(Slot { direction, speed, cost })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { slots, benefit: record.benefit })
    }
}

impl From<Decision> for DecisionRecord {
    fn from(decision: Decision) -> Self {
        Self {
            dc: decision.slots.iter().map(|slot| slot.direction.sign()).collect(),
            speed: decision.slots.iter().map(|slot| slot.speed).collect(),
            cost: decision.slots.iter().map(|slot| slot.cost).collect(),
            benefit: decision.benefit,
        }
    }
}
