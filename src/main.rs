mod cli;
mod core;
mod data;
mod prelude;
mod tables;

use chrono::Utc;
use clap::{Parser, crate_version};
use fastrand::Rng;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command, GenerateArgs, SimulateArgs},
    core::{game::Game, parameters::Parameters, station::Station},
    data::{
        generator::generate_devices,
        interchange::{read_devices, write_devices, write_report},
        prices::load_price_curve,
    },
    prelude::*,
    tables::{build_decisions_table, build_slots_table, build_summary_table},
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let mut rng = args.seed.map_or_else(Rng::new, Rng::with_seed);

    match args.command {
        Command::Simulate(args) => simulate(&args, &mut rng)?,
        Command::Generate(args) => generate(&args, &mut rng)?,
    }

    info!("done!");
    Ok(())
}

fn simulate(args: &SimulateArgs, rng: &mut Rng) -> Result {
    let mut parameters = Parameters::from(args.market);
    let devices = match &args.devices {
        Some(path) => {
            let devices = read_devices(path)?;
            // The file decides how many devices there are:
            parameters.n_devices = devices.len();
            devices
        }
        None => generate_devices(&parameters, rng),
    };

    let start = Utc::now().with_timezone(&args.timezone()?).time();
    let station = Station::builder()
        .price(load_price_curve(&args.prices, start, parameters.n_time_slots, rng))
        .max_charge(args.station.max_charge)
        .max_discharge(args.station.max_discharge)
        .build();

    let game = Game::try_new(&devices, &station, &parameters)?;
    let report = game.run(rng);

    println!("{}", build_slots_table(game.market(), &report.decisions));
    println!("{}", build_decisions_table(&report, parameters.slot_duration));
    println!("{}", build_summary_table(game.market(), &report));

    if let Some(path) = &args.output {
        write_report(path, &report)?;
    }
    Ok(())
}

fn generate(args: &GenerateArgs, rng: &mut Rng) -> Result {
    let devices = generate_devices(&Parameters::from(args.market), rng);
    write_devices(&args.output, &devices)
}
