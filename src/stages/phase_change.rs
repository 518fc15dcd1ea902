use serde::{Deserialize, Serialize};
use validator::Validate;

use super::thermal::KJ_PER_KWH;
use super::{cop_or, ElectricSettlement, StageKind, StageReport, UnitStage};
use crate::bog::{BogSettings, RecoveryRequest};
use crate::domain::{fractional_loss, CarrierProperties, ResolvedSite};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDirection {
    #[default]
    Liquefaction,
    Vaporization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PhaseChangeConfig {
    pub direction: PhaseDirection,
    /// Gas feed temperature for liquefaction, delivery temperature for
    /// vaporization; site ambient when unset
    pub process_temp_c: Option<f64>,
    /// Carrier liquefaction COP when unset; vaporization defaults to a heater (1.0)
    #[validate(range(exclusive_min = 0.0))]
    pub cop: Option<f64>,
    /// Fixed share of the throughput boiled off, independent of duration
    #[validate(range(min = 0.0, max = 1.0))]
    pub boil_off_fraction: f64,
    #[validate(range(min = 0.0))]
    pub capex_per_kg: f64,
    /// Window over which boil-off recovery equipment is sized
    #[validate(range(exclusive_min = 0.0))]
    pub processing_hours: f64,
}

impl Default for PhaseChangeConfig {
    fn default() -> Self {
        Self {
            direction: PhaseDirection::Liquefaction,
            process_temp_c: None,
            cop: None,
            boil_off_fraction: 0.016,
            capex_per_kg: 0.3,
            processing_hours: 24.0,
        }
    }
}

/// Liquefaction or vaporization: sensible plus latent heat moved at a COP.
#[derive(Debug, Clone)]
pub struct PhaseChangeStage {
    config: PhaseChangeConfig,
    site: ResolvedSite,
}

impl PhaseChangeStage {
    pub fn new(config: PhaseChangeConfig, site: ResolvedSite) -> Self {
        Self { config, site }
    }

    fn process_temp_c(&self) -> f64 {
        self.config
            .process_temp_c
            .unwrap_or_else(|| self.site.ambient_c())
    }

    /// Heat that must be moved per kg, or `None` when the carrier is already
    /// in the target phase at the process temperature.
    fn heat_kj_per_kg(&self, carrier: &CarrierProperties) -> Option<f64> {
        let lift_k = self.process_temp_c() - carrier.boiling_point_c;
        if lift_k <= 0.0 {
            return None;
        }
        Some(carrier.specific_heat_kj_kg_k * lift_k + carrier.latent_heat_kj_kg)
    }

    fn cop(&self, carrier: &CarrierProperties) -> f64 {
        match self.config.direction {
            PhaseDirection::Liquefaction => cop_or(self.config.cop, carrier.liquefaction_cop),
            PhaseDirection::Vaporization => cop_or(self.config.cop, 1.0),
        }
    }
}

impl UnitStage for PhaseChangeStage {
    fn kind(&self) -> StageKind {
        match self.config.direction {
            PhaseDirection::Liquefaction => StageKind::Liquefaction,
            PhaseDirection::Vaporization => StageKind::Vaporization,
        }
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let Some(heat_kj_per_kg) = self.heat_kj_per_kg(carrier) else {
            let reason = match self.config.direction {
                PhaseDirection::Liquefaction => "carrier already liquid at feed temperature",
                PhaseDirection::Vaporization => "carrier delivered as liquid at process temperature",
            };
            return StageReport::skipped(mass_kg, reason);
        };

        let mut clamps = Vec::new();
        let demand_kwh = mass_kg * heat_kj_per_kg / self.cop(carrier) / KJ_PER_KWH;
        let loss_kg = fractional_loss(mass_kg, self.config.boil_off_fraction, 1.0, &mut clamps);

        let outcome = bog.apply(
            carrier,
            RecoveryRequest {
                loss_kg,
                duration_h: self.config.processing_hours,
                offsetable_demand_kwh: demand_kwh,
            },
        );

        ElectricSettlement {
            site: &self.site,
            mass_in_kg: mass_kg,
            loss_kg,
            bog: outcome,
            fixed_energy_kwh: 0.0,
            other_opex: 0.0,
            capex: mass_kg * self.config.capex_per_kg,
        }
        .settle(0.0, clamps)
    }
}
