use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::core::{decision::Decision, device::Device, market::Market};

/// How the game ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum Convergence {
    /// No device could find an improving move anymore.
    #[display("converged")]
    Converged,

    /// The round cap was hit before the game settled.
    #[display("round limit reached")]
    RoundLimitReached,
}

/// Final state of the market.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Sum of the devices' own benefits under their final decisions.
    pub benefit: f64,

    /// Market-side value of the final decisions at the raw station price.
    pub revenue: f64,

    /// Number of committed updates.
    #[serde(rename = "iteration")]
    pub n_commits: usize,

    /// Number of propose passes.
    #[serde(rename = "rounds")]
    pub n_rounds: usize,

    pub convergence: Convergence,

    /// Final committed decision of every device, in the device order.
    pub decisions: Vec<Decision>,
}

impl Report {
    /// Aggregate the final decisions.
    ///
    /// The per-decision benefits are recomputed from scratch, whatever was cached during the game.
    pub fn settle(
        market: &Market<'_>,
        devices: &[Device],
        mut decisions: Vec<Decision>,
        n_commits: usize,
        n_rounds: usize,
        convergence: Convergence,
    ) -> Self {
        for (device, decision) in devices.iter().zip(&mut decisions) {
            decision.benefit = market.benefit(device, decision);
        }
        Self {
            benefit: decisions.iter().map(|decision| decision.benefit).sum(),
            revenue: market.revenue(&decisions),
            n_commits,
            n_rounds,
            convergence,
            decisions,
        }
    }

    pub const fn is_converged(&self) -> bool {
        matches!(self.convergence, Convergence::Converged)
    }

    /// Device which got the most out of the market, if anyone got anything.
    pub fn top_device(&self) -> Option<(usize, &Decision)> {
        self.decisions
            .iter()
            .enumerate()
            .filter(|(_, decision)| !decision.is_unallocated())
            .max_by_key(|(_, decision)| OrderedFloat(decision.benefit))
    }
}
