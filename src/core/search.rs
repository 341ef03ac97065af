use bon::Builder;
use fastrand::Rng;

use crate::core::{
    decision::{Decision, Direction, Slot},
    device::{Device, Level},
    market::Market,
};

/// Fruit-fly-inspired population search for a single device's best response.
///
/// Every outer iteration restarts from an idle decision and lets a swarm of «flies» wander
/// around the best decision found so far within the iteration. Each fly re-rolls a random
/// number of random slots to random levels, keeping only the moves the constraints allow.
/// Only an iteration that beats everything before it replaces the overall best.
#[derive(Builder)]
pub struct FlySearch<'a> {
    market: Market<'a>,

    /// Number of outer iterations.
    n_iterations: usize,

    /// Number of flies sampled per outer iteration.
    population_size: usize,
}

impl FlySearch<'_> {
    /// Search for a decision that beats the device's committed one.
    ///
    /// The search reads the committed decisions of all the devices and never modifies them.
    ///
    /// # Returns
    ///
    /// - [`Some`] decision with a strictly greater benefit than the committed one.
    /// - [`None`], if no sampled fly improved on the committed decision.
    pub fn best_response(
        &self,
        device: &Device,
        committed: &[Decision],
        rng: &mut Rng,
    ) -> Option<Decision> {
        let current = &committed[device.id];
        let n_slots = current.slots.len();

        let mut best_fitness = self.market.benefit(device, current);
        let mut best_decision = None;

        for _ in 0..self.n_iterations {
            let mut iteration_best = Decision::idle(n_slots);
            let mut iteration_best_fitness = f64::NEG_INFINITY;

            for _ in 0..self.population_size {
                let mut fly = self.fly(device, committed, &iteration_best, rng);
                fly.benefit = self.market.benefit(device, &fly);
                if fly.benefit > iteration_best_fitness {
                    iteration_best_fitness = fly.benefit;
                    iteration_best = fly;
                }
            }

            if iteration_best_fitness > best_fitness {
                best_fitness = iteration_best_fitness;
                best_decision = Some(iteration_best);
            }
        }

        best_decision
    }

    /// Perturb the origin decision into a new candidate.
    fn fly(
        &self,
        device: &Device,
        committed: &[Decision],
        origin: &Decision,
        rng: &mut Rng,
    ) -> Decision {
        let mut fly = origin.clone();
        let n_slots = fly.slots.len();
        let n_perturbations = rng.usize(0..n_slots);

        for _ in 0..n_perturbations {
            let slot = rng.usize(0..n_slots);
            let (direction, level) = Self::pick_level(device, rng);
            // Rejected moves leave whatever the slot held before:
            if self.market.is_feasible(device, committed, slot, direction, level) {
                fly.slots[slot] = Slot::active(direction, level);
            }
        }

        fly
    }

    /// Pick a level uniformly from the discharge levels followed by the charge levels.
    fn pick_level(device: &Device, rng: &mut Rng) -> (Direction, Level) {
        let index = rng.usize(0..device.n_levels());
        device.discharge_levels.get(index).map_or_else(
            || {
                let level = device.charge_levels[index - device.discharge_levels.len()];
                (Direction::Charge, level)
            },
            |level| (Direction::Discharge, *level),
        )
    }
}
