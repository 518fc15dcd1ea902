use anyhow::{Context, Result};
use energy_carrier_transport::{config, planner, telemetry};
use energy_carrier_transport::domain::CarrierPropertiesTable;
use config::Config;
use planner::TransportPlanner;
use telemetry::init_tracing;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {path}"))?,
        None => Config::load()?,
    };

    let table = CarrierPropertiesTable::standard();
    let planner = TransportPlanner::new(&cfg.scenario, &cfg.sizing, &table)?;

    info!(
        carrier = %cfg.scenario.carrier,
        target_mass_kg = planner.target_mass_kg(),
        stages = planner.pipeline().steps().len(),
        "planning shipment"
    );

    let report = planner.plan()?;
    let summary = &report.run.summary;
    info!(
        initial_mass_kg = report.sizing.initial_mass_kg,
        delivered_mass_kg = summary.final_delivered_mass_kg,
        total_cost = summary.total_cost,
        total_energy_kwh = summary.total_energy_kwh,
        total_emissions_kg = summary.total_emissions_kg,
        cost_per_kg = summary.levelized_cost_per_kg(),
        "shipment planned"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
