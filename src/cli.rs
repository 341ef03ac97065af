use std::path::PathBuf;

use chrono_tz::Tz;
use clap::{Parser, Subcommand};

use crate::{core::parameters::Parameters, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Random seed, entropy-seeded when omitted.
    #[clap(long, env = "SEED", global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play the market game and print the outcome.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),

    /// Write a random device population.
    #[clap(name = "generate")]
    Generate(Box<GenerateArgs>),
}

#[derive(Parser)]
pub struct SimulateArgs {
    /// JSON file with the devices, a random population is generated when omitted.
    #[clap(long, env = "DEVICES_PATH")]
    pub devices: Option<PathBuf>,

    /// Spreadsheet with the hourly prices.
    #[clap(long, env = "PRICES_PATH", default_value = "price.xlsx")]
    pub prices: PathBuf,

    /// IANA timezone of the price spreadsheet.
    #[clap(long, env = "TIMEZONE", default_value = "Asia/Shanghai")]
    pub timezone: String,

    /// Write the final report into this JSON file.
    #[clap(long, env = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub station: StationArgs,

    #[clap(flatten)]
    pub market: MarketArgs,
}

impl SimulateArgs {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .ok()
            .with_context(|| format!("unknown timezone `{}`", self.timezone))
    }
}

#[derive(Parser)]
pub struct GenerateArgs {
    #[clap(long, env = "OUTPUT_PATH")]
    pub output: PathBuf,

    #[clap(flatten)]
    pub market: MarketArgs,
}

#[derive(Copy, Clone, Parser)]
pub struct StationArgs {
    /// Aggregate charging rate ceiling per time slot.
    #[clap(long, env = "MAX_CHARGE", default_value = "1.0")]
    pub max_charge: f64,

    /// Aggregate discharging rate ceiling per time slot.
    #[clap(long, env = "MAX_DISCHARGE", default_value = "1.0")]
    pub max_discharge: f64,
}

#[derive(Copy, Clone, Parser)]
pub struct MarketArgs {
    #[clap(long, env = "N_DEVICES", default_value = "10")]
    pub n_devices: usize,

    #[clap(long, env = "N_TIME_SLOTS", default_value = "24")]
    pub n_time_slots: usize,

    /// Time slot length in the unit the rates are expressed in.
    #[clap(long, env = "SLOT_DURATION", default_value = "0.25")]
    pub slot_duration: f64,

    #[clap(long, env = "N_CHARGE_LEVELS", default_value = "5")]
    pub n_charge_levels: usize,

    #[clap(long, env = "N_DISCHARGE_LEVELS", default_value = "5")]
    pub n_discharge_levels: usize,

    /// Outer iterations of the per-device search.
    #[clap(long, env = "N_SEARCH_ITERATIONS", default_value = "20")]
    pub n_search_iterations: usize,

    /// Candidates sampled per search iteration.
    #[clap(long, env = "POPULATION_SIZE", default_value = "30")]
    pub population_size: usize,

    /// Stop after this many rounds even if the game has not settled.
    #[clap(long, env = "MAX_ROUNDS")]
    pub max_rounds: Option<usize>,
}

impl From<MarketArgs> for Parameters {
    fn from(args: MarketArgs) -> Self {
        Self::builder()
            .n_devices(args.n_devices)
            .n_time_slots(args.n_time_slots)
            .slot_duration(args.slot_duration)
            .n_charge_levels(args.n_charge_levels)
            .n_discharge_levels(args.n_discharge_levels)
            .n_search_iterations(args.n_search_iterations)
            .population_size(args.population_size)
            .maybe_max_rounds(args.max_rounds)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_simulate_defaults() -> Result {
        let args = Args::try_parse_from(["smartgrid", "simulate", "--n-devices", "3"])?;
        let Command::Simulate(args) = args.command else {
            bail!("expected the simulate command");
        };
        let parameters = Parameters::from(args.market);
        assert_eq!(parameters.n_devices, 3);
        assert_eq!(parameters.n_time_slots, 24);
        assert_eq!(parameters.max_rounds, None);
        assert_eq!(args.timezone()?, chrono_tz::Asia::Shanghai);
        Ok(())
    }

    #[test]
    fn test_unknown_timezone() -> Result {
        let args = Args::try_parse_from(["smartgrid", "simulate", "--timezone", "Mars/Olympus"])?;
        let Command::Simulate(args) = args.command else {
            bail!("expected the simulate command");
        };
        assert!(args.timezone().is_err());
        Ok(())
    }
}
