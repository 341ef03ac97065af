use std::time::Instant;

use fastrand::Rng;

use crate::{
    core::{
        decision::Decision,
        device::Device,
        market::Market,
        parameters::Parameters,
        report::{Convergence, Report},
        search::FlySearch,
        station::Station,
        validation::validate,
    },
    prelude::*,
};

/// Committed decisions of all the devices, frozen for the duration of a propose pass.
#[must_use]
#[derive(Clone, Debug, PartialEq, derive_more::Deref)]
pub struct Snapshot(Vec<Decision>);

impl Snapshot {
    pub fn idle(n_devices: usize, n_time_slots: usize) -> Self {
        Self(vec![Decision::idle(n_time_slots); n_devices])
    }

    /// Next snapshot with the device's decision replaced.
    pub fn with_commit(mut self, device_id: usize, decision: Decision) -> Self {
        self.0[device_id] = decision;
        self
    }

    pub fn into_inner(self) -> Vec<Decision> {
        self.0
    }
}

/// Asynchronous best-response game between the devices.
///
/// Every round, each device searches for a better decision against the same snapshot
/// of everybody's commitments. One device with a non-trivial proposal is then picked at random
/// and commits, and the game goes on until nobody has anything to propose.
pub struct Game<'a> {
    devices: &'a [Device],
    market: Market<'a>,
    search: FlySearch<'a>,
    n_time_slots: usize,
    max_rounds: Option<usize>,
}

impl<'a> Game<'a> {
    /// Validate the market input and set up the game.
    pub fn try_new(
        devices: &'a [Device],
        station: &'a Station,
        parameters: &Parameters,
    ) -> Result<Self> {
        validate(devices, station, parameters).context("invalid market input")?;
        let market = Market::new(station, parameters.slot_duration);
        let search = FlySearch::builder()
            .market(market)
            .n_iterations(parameters.n_search_iterations)
            .population_size(parameters.population_size)
            .build();
        Ok(Self {
            devices,
            market,
            search,
            n_time_slots: parameters.n_time_slots,
            max_rounds: parameters.max_rounds,
        })
    }

    pub const fn market(&self) -> &Market<'a> {
        &self.market
    }

    /// Play the game till it settles or runs out of rounds.
    #[instrument(
        skip_all,
        fields(n_devices = self.devices.len(), n_time_slots = self.n_time_slots),
    )]
    pub fn run(&self, rng: &mut Rng) -> Report {
        let start_instant = Instant::now();
        info!(average_price = self.market.average_price, "starting the game…");

        let mut snapshot = Snapshot::idle(self.devices.len(), self.n_time_slots);
        let mut n_commits = 0;
        let mut n_rounds = 0;

        let convergence = loop {
            if self.max_rounds.is_some_and(|max_rounds| n_rounds >= max_rounds) {
                warn!(n_rounds, n_commits, "round limit reached, the game has not converged");
                break Convergence::RoundLimitReached;
            }
            n_rounds += 1;

            let proposals = self.propose(&snapshot, rng);
            let Some((winner, candidate)) = Self::select_winner(proposals, rng) else {
                break Convergence::Converged;
            };
            if candidate.is_same_move(&snapshot[winner]) {
                debug!(n_rounds, winner, "the winner re-proposed its committed decision");
                continue;
            }

            debug!(n_rounds, winner, benefit = candidate.benefit, "committing");
            snapshot = snapshot.with_commit(winner, candidate);
            n_commits += 1;
        };

        let report = Report::settle(
            &self.market,
            self.devices,
            snapshot.into_inner(),
            n_commits,
            n_rounds,
            convergence,
        );
        info!(
            %convergence,
            n_rounds,
            n_commits,
            benefit = report.benefit,
            revenue = report.revenue,
            elapsed = ?start_instant.elapsed(),
            "finished",
        );
        report
    }

    /// Ask every device for its best response to the committed decisions.
    ///
    /// Devices are searched one after another, but all of them see the same snapshot.
    pub fn propose(&self, committed: &[Decision], rng: &mut Rng) -> Vec<Option<Decision>> {
        self.devices
            .iter()
            .map(|device| self.search.best_response(device, committed, rng))
            .collect()
    }

    /// Randomly pick one of the devices with a non-trivial proposal.
    ///
    /// Draws land uniformly on all the devices and get rejected until an eligible one is hit.
    ///
    /// # Returns
    ///
    /// - [`Some`] winner index and its proposal.
    /// - [`None`], if nobody is eligible.
    fn select_winner(
        mut proposals: Vec<Option<Decision>>,
        rng: &mut Rng,
    ) -> Option<(usize, Decision)> {
        if !proposals.iter().flatten().any(|proposal| !proposal.is_unallocated()) {
            return None;
        }
        loop {
            let index = rng.usize(0..proposals.len());
            if let Some(proposal) = proposals[index].take_if(|proposal| !proposal.is_unallocated())
            {
                return Some((index, proposal));
            }
        }
    }
}
