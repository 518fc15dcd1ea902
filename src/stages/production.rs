use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{StageKind, StageReport, UnitStage};
use crate::bog::BogSettings;
use crate::domain::{clamp_loss, CarrierProperties, ResolvedSite, StageResult};
use crate::economics::InsuranceCover;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProductionConfig {
    /// Synthesis electricity (kWh/kg); carrier default when unset
    #[validate(range(min = 0.0))]
    pub energy_kwh_per_kg: Option<f64>,
    /// Plant capital charge per kg produced
    #[validate(range(min = 0.0))]
    pub capex_per_kg: f64,
    /// Water, nitrogen or CO2 feedstock per kg produced
    #[validate(range(min = 0.0))]
    pub feedstock_cost_per_kg: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub process_loss_fraction: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            energy_kwh_per_kg: None,
            capex_per_kg: 0.5,
            feedstock_cost_per_kg: 0.02,
            process_loss_fraction: 0.0,
        }
    }
}

/// Carrier synthesis at the origin plant. Carries the one-time insurance
/// premium on the produced cargo.
#[derive(Debug, Clone)]
pub struct ProductionStage {
    config: ProductionConfig,
    site: ResolvedSite,
    insurance: Option<InsuranceCover>,
}

impl ProductionStage {
    pub fn new(config: ProductionConfig, site: ResolvedSite) -> Self {
        Self {
            config,
            site,
            insurance: None,
        }
    }

    pub fn with_insurance(mut self, cover: InsuranceCover) -> Self {
        self.insurance = Some(cover);
        self
    }
}

impl UnitStage for ProductionStage {
    fn kind(&self) -> StageKind {
        StageKind::Production
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if let Some(cover) = &self.insurance {
            cover.validate()?;
        }
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, _bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let mut clamps = Vec::new();

        let specific = self
            .config
            .energy_kwh_per_kg
            .unwrap_or(carrier.production_energy_kwh_per_kg);
        let energy_kwh = mass_kg * specific;
        let bill = self.site.electricity(energy_kwh);
        let loss_kg = clamp_loss(mass_kg, mass_kg * self.config.process_loss_fraction, &mut clamps);

        let insurance_cost = self
            .insurance
            .as_ref()
            .map(|cover| cover.premium_for(mass_kg))
            .unwrap_or(0.0);

        let result = StageResult {
            opex: bill.cost + mass_kg * self.config.feedstock_cost_per_kg,
            capex: mass_kg * self.config.capex_per_kg,
            carbon_tax: self.site.carbon_tax(bill.emissions_kg),
            energy_kwh,
            emissions_kg: bill.emissions_kg,
            output_mass_kg: mass_kg - loss_kg,
            loss_mass_kg: loss_kg,
            insurance_cost,
            recovered_mass_kg: 0.0,
        };

        StageReport::executed(mass_kg, result, 0.0, clamps)
    }
}
