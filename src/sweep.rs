//! Independent scenarios evaluated side by side.
//!
//! Each scenario builds its own pipeline; the carrier table is the only
//! shared state and is read-only.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use strum::IntoEnumIterator;
use tracing::info;

use crate::config::{ScenarioConfig, SizingConfig};
use crate::domain::{Carrier, CarrierPropertiesTable};
use crate::error::Result;
use crate::planner::{TransportPlanner, TransportReport};

fn plan_one(
    scenario: &ScenarioConfig,
    sizing: &SizingConfig,
    table: &CarrierPropertiesTable,
) -> Result<TransportReport> {
    TransportPlanner::new(scenario, sizing, table)?.plan()
}

/// Plan every scenario; results keep the input order.
pub fn sweep_scenarios(
    scenarios: &[ScenarioConfig],
    sizing: &SizingConfig,
    table: &CarrierPropertiesTable,
) -> Vec<Result<TransportReport>> {
    info!(scenarios = scenarios.len(), "starting scenario sweep");

    #[cfg(feature = "parallel")]
    let reports = scenarios
        .par_iter()
        .map(|scenario| plan_one(scenario, sizing, table))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let reports = scenarios
        .iter()
        .map(|scenario| plan_one(scenario, sizing, table))
        .collect();

    reports
}

/// The same route planned once per carrier.
pub fn sweep_carriers(
    base: &ScenarioConfig,
    sizing: &SizingConfig,
    table: &CarrierPropertiesTable,
) -> Vec<(Carrier, Result<TransportReport>)> {
    let scenarios: Vec<ScenarioConfig> = Carrier::iter().map(|c| base.with_carrier(c)).collect();
    let reports = sweep_scenarios(&scenarios, sizing, table);
    Carrier::iter().zip(reports).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_covers_every_carrier_in_order() {
        let results = sweep_carriers(
            &ScenarioConfig::default(),
            &SizingConfig::default(),
            &CarrierPropertiesTable::standard(),
        );
        let carriers: Vec<Carrier> = results.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            carriers,
            vec![Carrier::LiquefiedHydrogen, Carrier::Ammonia, Carrier::Methanol]
        );
        for (carrier, report) in &results {
            let report = report.as_ref().unwrap();
            assert_eq!(report.carrier, *carrier);
        }
    }

    #[test]
    fn test_sweep_matches_single_plan() {
        let scenario = ScenarioConfig::default();
        let sizing = SizingConfig::default();
        let table = CarrierPropertiesTable::standard();

        let swept = sweep_scenarios(std::slice::from_ref(&scenario), &sizing, &table);
        let single = plan_one(&scenario, &sizing, &table).unwrap();
        assert_eq!(swept[0].as_ref().unwrap(), &single);
    }
}
