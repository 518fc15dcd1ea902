use tracing::{debug, info, warn};

use super::{LedgerRow, Pipeline, PipelineRun};
use crate::domain::Shipment;
use crate::error::{Result, TransportError};
use crate::stages::{StageKind, StageReport};

impl Pipeline {
    /// Execute every stage in order starting from `initial_mass_kg`.
    ///
    /// Clamped quantities are logged and kept on their ledger row; a
    /// non-finite result aborts the run.
    pub fn run(&self, initial_mass_kg: f64) -> Result<PipelineRun> {
        let rows = self.execute(initial_mass_kg, true)?;
        let run = PipelineRun::new(self.carrier().carrier, initial_mass_kg, rows);
        info!(
            carrier = %self.carrier().carrier,
            initial_mass_kg,
            final_mass_kg = run.summary.final_delivered_mass_kg,
            total_cost = run.summary.total_cost,
            total_energy_kwh = run.summary.total_energy_kwh,
            total_emissions_kg = run.summary.total_emissions_kg,
            "pipeline run complete"
        );
        Ok(run)
    }

    /// Mass leaving the last stage, without building the ledger.
    pub fn final_mass(&self, initial_mass_kg: f64) -> Result<f64> {
        let rows = self.execute(initial_mass_kg, false)?;
        Ok(rows
            .last()
            .map(|row| row.result.output_mass_kg)
            .unwrap_or(initial_mass_kg))
    }

    /// Apply the step at `index` on its own; reproduces that ledger row.
    pub fn reapply(&self, index: usize, mass_in_kg: f64) -> Option<StageReport> {
        let step = self.steps().get(index)?;
        Some(step.apply(mass_in_kg, self.carrier(), &self.bog_for(step.leg)))
    }

    fn execute(&self, initial_mass_kg: f64, log: bool) -> Result<Vec<LedgerRow>> {
        if !initial_mass_kg.is_finite() || initial_mass_kg < 0.0 {
            return Err(TransportError::configuration(
                "initial_mass_kg",
                format!("must be a finite non-negative mass, got {initial_mass_kg}"),
            ));
        }

        let carrier = self.carrier();
        let mut shipment = Shipment::new(initial_mass_kg, carrier.carrier, self.policies());
        let mut rows = Vec::with_capacity(self.steps().len());

        for step in self.steps() {
            let bog = self.bog_for(step.leg);
            let report = step.apply(shipment.mass_kg, carrier, &bog);

            for (quantity, value) in report.result.fields() {
                if !value.is_finite() {
                    return Err(TransportError::PhysicalInfeasibility {
                        stage: step.label.clone(),
                        quantity,
                        value,
                    });
                }
            }

            if log {
                for clamp in &report.clamps {
                    warn!(stage = %step.label, leg = %step.leg, %clamp, "quantity clamped");
                }
                debug!(
                    stage = %step.label,
                    kind = %step.kind(),
                    leg = %step.leg,
                    policy = %bog.policy,
                    mass_in_kg = report.mass_in_kg,
                    mass_out_kg = report.result.output_mass_kg,
                    loss_kg = report.result.loss_mass_kg,
                    recovered_kg = report.result.recovered_mass_kg,
                    cost = report.result.stage_cost(),
                    energy_kwh = report.result.energy_kwh,
                    skipped = report.is_skipped(),
                    "stage applied"
                );
            }

            shipment = shipment.advance(&report.result);
            if step.kind() == StageKind::Conversion {
                shipment = shipment.into_hydrogen();
            }
            rows.push(LedgerRow::stage(&step.label, step.leg, step.kind(), report));
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::bog::BogPolicy;
    use crate::config::ScenarioConfig;
    use crate::domain::{Carrier, CarrierPropertiesTable, LegPolicies};
    use crate::error::TransportError;
    use crate::pipeline::{Pipeline, PipelineBuilder};
    use crate::stages::StageKind;

    fn pipeline(scenario: &ScenarioConfig) -> Pipeline {
        PipelineBuilder::new(scenario, &CarrierPropertiesTable::standard())
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_threads_mass_through_stages() {
        let p = pipeline(&ScenarioConfig::default());
        let run = p.run(1.0e7).unwrap();

        let rows: Vec<_> = run.stage_rows().collect();
        assert_eq!(rows.len(), p.steps().len());
        assert_eq!(rows[0].mass_in_kg, 1.0e7);
        for pair in rows.windows(2) {
            assert_eq!(pair[1].mass_in_kg, pair[0].result.output_mass_kg);
        }
        assert_eq!(run.final_mass_kg(), rows.last().unwrap().result.output_mass_kg);
        assert!(run.final_mass_kg() < 1.0e7);
    }

    #[test]
    fn test_rows_are_reproducible() {
        let scenario = ScenarioConfig {
            carrier: Carrier::LiquefiedHydrogen,
            policies: LegPolicies::uniform(BogPolicy::Reliquefy),
            ..Default::default()
        };
        let p = pipeline(&scenario);
        let run = p.run(2.0e6).unwrap();
        for (index, row) in run.stage_rows().enumerate() {
            let again = p.reapply(index, row.mass_in_kg).unwrap();
            assert_eq!(again.result, row.result);
            assert_eq!(again.status, row.status);
        }
    }

    #[test]
    fn test_final_mass_matches_run() {
        let p = pipeline(&ScenarioConfig::default());
        let run = p.run(5.0e6).unwrap();
        assert_eq!(p.final_mass(5.0e6).unwrap(), run.final_mass_kg());
    }

    #[test]
    fn test_methanol_liquefaction_row_is_skipped() {
        let scenario = ScenarioConfig {
            carrier: Carrier::Methanol,
            ..Default::default()
        };
        let run = pipeline(&scenario).run(1.0e6).unwrap();
        let liquefaction = run
            .stage_rows()
            .find(|row| row.stage == Some(StageKind::Liquefaction))
            .unwrap();
        assert!(matches!(
            liquefaction.status,
            crate::stages::StageStatus::Skipped { .. }
        ));
        assert_eq!(liquefaction.result.stage_cost(), 0.0);
    }

    #[test]
    fn test_negative_initial_mass_rejected() {
        let p = pipeline(&ScenarioConfig::default());
        assert!(matches!(
            p.run(-1.0).unwrap_err(),
            TransportError::Configuration { .. }
        ));
        assert!(p.run(f64::NAN).is_err());
    }

    #[test]
    fn test_non_finite_stage_value_aborts() {
        let mut scenario = ScenarioConfig::default();
        scenario.sites.origin.electricity_price_per_kwh = f64::INFINITY;
        let p = pipeline(&scenario);
        match p.run(1.0e6).unwrap_err() {
            TransportError::PhysicalInfeasibility { stage, quantity, .. } => {
                assert_eq!(stage, "production");
                assert_eq!(quantity, "opex");
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
