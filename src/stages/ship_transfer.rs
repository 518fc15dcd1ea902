use serde::{Deserialize, Serialize};
use validator::Validate;

use super::thermal::KJ_PER_KWH;
use super::transfer::PumpTransferConfig;
use super::{cop_or, ElectricSettlement, StageKind, StageReport, UnitStage};
use crate::bog::{BogSettings, RecoveryRequest};
use crate::domain::{CarrierProperties, ResolvedSite};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    #[default]
    Loading,
    Unloading,
}

/// Pre-cooling of the receiving tank structure from ambient to the boiling point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CooldownConfig {
    /// Steel and insulation mass cooled before cargo flows (kg)
    #[validate(range(min = 0.0))]
    pub shell_mass_kg: f64,
    #[validate(range(min = 0.0))]
    pub shell_specific_heat_kj_kg_k: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub cop: Option<f64>,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            shell_mass_kg: 5.0e5,
            shell_specific_heat_kj_kg_k: 0.5,
            cop: None,
        }
    }
}

impl CooldownConfig {
    /// One-time electricity to chill the shell; zero for ambient-liquid carriers.
    pub fn energy_kwh(&self, carrier: &CarrierProperties, ambient_c: f64) -> f64 {
        if !carrier.is_cold_at(ambient_c) {
            return 0.0;
        }
        let cop = cop_or(self.cop, carrier.refrigeration_cop);
        self.shell_mass_kg * self.shell_specific_heat_kj_kg_k * carrier.cold_delta_k(ambient_c)
            / cop
            / KJ_PER_KWH
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShipTransferConfig {
    #[validate(nested)]
    pub transfer: PumpTransferConfig,
    #[validate(nested)]
    pub cooldown: CooldownConfig,
}

/// Terminal-to-ship or ship-to-terminal transfer.
///
/// Same hydraulics as a pumped transfer, plus cooldown of the receiving tanks.
#[derive(Debug, Clone)]
pub struct ShipTransferStage {
    direction: TransferDirection,
    config: ShipTransferConfig,
    site: ResolvedSite,
}

impl ShipTransferStage {
    pub fn new(direction: TransferDirection, config: ShipTransferConfig, site: ResolvedSite) -> Self {
        Self {
            direction,
            config,
            site,
        }
    }
}

impl UnitStage for ShipTransferStage {
    fn kind(&self) -> StageKind {
        match self.direction {
            TransferDirection::Loading => StageKind::ShipLoading,
            TransferDirection::Unloading => StageKind::ShipUnloading,
        }
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let ambient_c = self.site.ambient_c();
        let demand = self.config.transfer.demand(mass_kg, carrier, ambient_c);
        let cooldown_kwh = self.config.cooldown.energy_kwh(carrier, ambient_c);

        let outcome = bog.apply(
            carrier,
            RecoveryRequest {
                loss_kg: demand.loss_kg,
                duration_h: demand.duration_h,
                offsetable_demand_kwh: demand.refrigeration_kwh + cooldown_kwh,
            },
        );

        ElectricSettlement {
            site: &self.site,
            mass_in_kg: mass_kg,
            loss_kg: demand.loss_kg,
            bog: outcome,
            fixed_energy_kwh: demand.pump_kwh,
            other_opex: 0.0,
            capex: self.config.transfer.equipment_cost(demand.duration_h),
        }
        .settle(demand.duration_h, demand.clamps)
    }
}
