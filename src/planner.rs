//! Size, run, then fold in the shipment overheads.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::config::{ScenarioConfig, SizingConfig};
use crate::domain::{Carrier, CarrierPropertiesTable, Jurisdiction};
use crate::economics::OverheadsConfig;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRun};
use crate::sizing::{strategy_for, SizingOutcome, SizingProblem, SizingStrategy};
use crate::stages::{ShipClass, StageKind};

/// Sized and costed shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportReport {
    pub carrier: Carrier,
    pub sizing: SizingOutcome,
    pub run: PipelineRun,
}

pub struct TransportPlanner {
    pipeline: Pipeline,
    sizing_config: SizingConfig,
    strategy: Box<dyn SizingStrategy>,
    ship: ShipClass,
    overheads: OverheadsConfig,
    destination: Jurisdiction,
}

impl TransportPlanner {
    pub fn new(
        scenario: &ScenarioConfig,
        sizing: &SizingConfig,
        table: &CarrierPropertiesTable,
    ) -> Result<Self> {
        scenario.overheads.validate()?;
        let pipeline = PipelineBuilder::new(scenario, table).build()?;
        let destination = scenario
            .jurisdictions
            .lookup(&scenario.sites.destination.country)?
            .clone();
        Ok(Self {
            pipeline,
            sizing_config: sizing.clone(),
            strategy: strategy_for(sizing.method),
            ship: scenario.ocean.ship.clone(),
            overheads: scenario.overheads.clone(),
            destination,
        })
    }

    pub fn with_strategy(mut self, strategy: Box<dyn SizingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Vessel cargo capacity for this carrier.
    pub fn target_mass_kg(&self) -> f64 {
        self.ship.capacity_kg(self.pipeline.carrier())
    }

    /// Initial mass that fills the vessel at ship loading.
    pub fn size(&self) -> Result<SizingOutcome> {
        let head = self.pipeline.truncated_through(StageKind::ShipLoading)?;
        let problem = SizingProblem::new(self.target_mass_kg(), &self.sizing_config);
        let outcome = self
            .strategy
            .size(&problem, &|mass| head.final_mass(mass))?;

        if outcome.converged {
            info!(
                strategy = self.strategy.name(),
                carrier = %self.pipeline.carrier().carrier,
                target_mass_kg = outcome.target_mass_kg,
                initial_mass_kg = outcome.initial_mass_kg,
                iterations = outcome.iterations,
                "sizing converged"
            );
        } else {
            warn!(
                strategy = self.strategy.name(),
                carrier = %self.pipeline.carrier().carrier,
                best_mass_kg = outcome.initial_mass_kg,
                residual = outcome.relative_residual,
                iterations = outcome.iterations,
                "sizing did not converge"
            );
        }

        if self.sizing_config.require_convergence {
            return outcome.require_converged();
        }
        Ok(outcome)
    }

    /// Full ledger for a given initial mass, overheads included.
    pub fn run_for_mass(&self, initial_mass_kg: f64) -> Result<PipelineRun> {
        let run = self.pipeline.run(initial_mass_kg)?;
        let charges = self.overheads.charges(&run.overhead_basis(), &self.destination);
        Ok(run.with_overheads(&charges))
    }

    pub fn plan(&self) -> Result<TransportReport> {
        let sizing = self.size()?;
        let run = self.run_for_mass(sizing.initial_mass_kg)?;
        Ok(TransportReport {
            carrier: self.pipeline.carrier().carrier,
            sizing,
            run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizingMethod;
    use crate::pipeline::RowKind;

    fn planner(scenario: &ScenarioConfig, sizing: &SizingConfig) -> TransportPlanner {
        TransportPlanner::new(scenario, sizing, &CarrierPropertiesTable::standard()).unwrap()
    }

    #[test]
    fn test_sizing_fills_vessel() {
        let p = planner(&ScenarioConfig::default(), &SizingConfig::default());
        let outcome = p.size().unwrap();
        let head = p.pipeline().truncated_through(StageKind::ShipLoading).unwrap();
        let loaded = head.final_mass(outcome.initial_mass_kg).unwrap();

        assert!(outcome.converged);
        assert!((loaded - p.target_mass_kg()).abs() / p.target_mass_kg() < 1e-3);
        assert!(outcome.initial_mass_kg > p.target_mass_kg());
    }

    #[test]
    fn test_strategies_agree() {
        let scenario = ScenarioConfig {
            carrier: Carrier::LiquefiedHydrogen,
            ..Default::default()
        };
        let bisection = planner(&scenario, &SizingConfig::default()).size().unwrap();
        let fixed = planner(
            &scenario,
            &SizingConfig {
                method: SizingMethod::FixedPoint,
                ..Default::default()
            },
        )
        .size()
        .unwrap();
        let rel = (bisection.initial_mass_kg - fixed.initial_mass_kg).abs() / fixed.initial_mass_kg;
        assert!(rel < 1e-5);
    }

    #[test]
    fn test_plan_appends_overheads() {
        let p = planner(&ScenarioConfig::default(), &SizingConfig::default());
        let report = p.plan().unwrap();
        let overheads = report
            .run
            .rows
            .iter()
            .filter(|row| row.kind == RowKind::Overhead)
            .count();
        assert_eq!(overheads, 5);
        assert!(report.run.summary.total_cost > report.run.totals.stages.stage_cost());
        assert_eq!(report.run.summary.initial_mass_kg, report.sizing.initial_mass_kg);
    }

    #[test]
    fn test_unreachable_target_reports_non_convergence() {
        let sizing = SizingConfig {
            upper_bound_factor: 0.5,
            ..Default::default()
        };
        let err = planner(&ScenarioConfig::default(), &sizing).size().unwrap_err();
        assert!(matches!(
            err,
            crate::error::TransportError::OptimizerNonConvergence { .. }
        ));

        let lenient = SizingConfig {
            require_convergence: false,
            ..sizing
        };
        let outcome = planner(&ScenarioConfig::default(), &lenient).size().unwrap();
        assert!(!outcome.converged);
    }
}
