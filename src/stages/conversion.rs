use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{StageKind, StageReport, UnitStage};
use crate::bog::BogSettings;
use crate::domain::{clamp_loss, CarrierProperties, HydrogenYield, ResolvedSite, StageResult};
use crate::error::Result;

/// Carrier-to-hydrogen conversion. Unset yield constants fall back to the
/// carrier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConversionConfig {
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub stoichiometric_ratio: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub conversion_efficiency: Option<f64>,
    #[validate(range(min = 0.0))]
    pub energy_kwh_per_kg_h2: Option<f64>,
    /// Count CO2 released by reforming (methanol)
    pub count_process_co2: bool,
    #[validate(range(min = 0.0))]
    pub capex_per_kg_h2: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            stoichiometric_ratio: None,
            conversion_efficiency: None,
            energy_kwh_per_kg_h2: None,
            count_process_co2: true,
            capex_per_kg_h2: 1.0,
        }
    }
}

impl ConversionConfig {
    /// Yield constants with any overrides applied.
    pub fn yield_for(&self, carrier: &CarrierProperties) -> HydrogenYield {
        let base = carrier.hydrogen_yield;
        HydrogenYield {
            stoichiometric_ratio: self.stoichiometric_ratio.unwrap_or(base.stoichiometric_ratio),
            conversion_efficiency: self
                .conversion_efficiency
                .unwrap_or(base.conversion_efficiency),
            energy_kwh_per_kg_h2: self.energy_kwh_per_kg_h2.unwrap_or(base.energy_kwh_per_kg_h2),
            process_co2_kg_per_kg: base.process_co2_kg_per_kg,
        }
    }
}

/// Cracking, reforming or regasification back to hydrogen at the consumer.
#[derive(Debug, Clone)]
pub struct ConversionStage {
    config: ConversionConfig,
    site: ResolvedSite,
}

impl ConversionStage {
    pub fn new(config: ConversionConfig, site: ResolvedSite) -> Self {
        Self { config, site }
    }
}

impl UnitStage for ConversionStage {
    fn kind(&self) -> StageKind {
        StageKind::Conversion
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, _bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let yields = self.config.yield_for(carrier);
        let mut clamps = Vec::new();

        let hydrogen_kg = mass_kg * yields.factor();
        let loss_kg = clamp_loss(mass_kg, mass_kg - hydrogen_kg, &mut clamps);
        let hydrogen_kg = mass_kg - loss_kg;

        // Process energy is quoted per kg of hydrogen out, not carrier in
        let energy_kwh = hydrogen_kg * yields.energy_kwh_per_kg_h2;
        let bill = self.site.electricity(energy_kwh);
        let process_co2 = if self.config.count_process_co2 {
            mass_kg * yields.conversion_efficiency * yields.process_co2_kg_per_kg
        } else {
            0.0
        };
        let emissions_kg = bill.emissions_kg + process_co2;

        let result = StageResult {
            opex: bill.cost,
            capex: hydrogen_kg * self.config.capex_per_kg_h2,
            carbon_tax: self.site.carbon_tax(emissions_kg),
            energy_kwh,
            emissions_kg,
            output_mass_kg: hydrogen_kg,
            loss_mass_kg: loss_kg,
            insurance_cost: 0.0,
            recovered_mass_kg: 0.0,
        };

        StageReport::executed(mass_kg, result, 0.0, clamps)
    }
}
