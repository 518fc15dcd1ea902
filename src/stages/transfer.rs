use serde::{Deserialize, Serialize};
use validator::Validate;

use super::thermal::{refrigeration_kwh, InsulatedPipe, GRAVITY_M_S2};
use super::{cop_or, ElectricSettlement, StageKind, StageReport, UnitStage};
use crate::bog::{BogSettings, RecoveryRequest};
use crate::domain::{fractional_loss, CarrierProperties, ResolvedSite};
use crate::error::{Infeasibility, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PumpTransferConfig {
    /// Volumetric flow per pump (m³/h)
    #[validate(range(exclusive_min = 0.0))]
    pub flow_rate_m3_per_h: f64,
    #[validate(range(min = 1))]
    pub pump_count: u32,
    #[validate(range(min = 0.0))]
    pub head_m: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub pump_efficiency: f64,
    #[validate(nested)]
    pub pipe: InsulatedPipe,
    #[validate(range(min = 0.0))]
    pub inlet_pressure_kpa: f64,
    #[validate(range(min = 0.0))]
    pub pressure_drop_kpa_per_m: f64,
    /// Carrier refrigeration COP when unset
    #[validate(range(exclusive_min = 0.0))]
    pub refrigeration_cop: Option<f64>,
    /// Hire of pump skid and hoses per pump-hour
    #[validate(range(min = 0.0))]
    pub equipment_cost_per_hour: f64,
}

impl Default for PumpTransferConfig {
    fn default() -> Self {
        Self {
            flow_rate_m3_per_h: 700.0,
            pump_count: 2,
            head_m: 25.0,
            pump_efficiency: 0.75,
            pipe: InsulatedPipe::default(),
            inlet_pressure_kpa: 600.0,
            pressure_drop_kpa_per_m: 0.2,
            refrigeration_cop: None,
            equipment_cost_per_hour: 150.0,
        }
    }
}

/// Physical demand of moving one batch through the line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransferDemand {
    pub duration_h: f64,
    pub pump_kwh: f64,
    pub refrigeration_kwh: f64,
    pub loss_kg: f64,
    pub clamps: Vec<Infeasibility>,
}

impl PumpTransferConfig {
    /// Hours needed to move `mass_kg` with all pumps running.
    pub fn duration_h(&self, mass_kg: f64, density_kg_m3: f64) -> f64 {
        let total_flow = self.flow_rate_m3_per_h * f64::from(self.pump_count);
        if total_flow <= 0.0 || density_kg_m3 <= 0.0 {
            return 0.0;
        }
        mass_kg.max(0.0) / density_kg_m3 / total_flow
    }

    /// Static head plus the line friction loss expressed as head (m).
    pub fn total_head_m(&self, density_kg_m3: f64) -> f64 {
        if density_kg_m3 <= 0.0 {
            return self.head_m;
        }
        let friction_pa = self.pressure_drop_kpa_per_m * self.pipe.length_m * 1000.0;
        self.head_m + friction_pa / (density_kg_m3 * GRAVITY_M_S2)
    }

    /// Hydraulic power of all pumps: ρ g H Q / η (W).
    pub fn pump_power_w(&self, density_kg_m3: f64) -> f64 {
        let flow_m3_s = self.flow_rate_m3_per_h * f64::from(self.pump_count) / 3600.0;
        density_kg_m3 * GRAVITY_M_S2 * self.total_head_m(density_kg_m3) * flow_m3_s
            / self.pump_efficiency
    }

    /// Pressure at the delivery end of the line; a drop larger than the inlet
    /// pressure is reported as the clamp to record.
    pub fn final_pressure_kpa(&self) -> std::result::Result<f64, Infeasibility> {
        let computed_kpa =
            self.inlet_pressure_kpa - self.pressure_drop_kpa_per_m * self.pipe.length_m;
        if computed_kpa < 0.0 {
            return Err(Infeasibility::NegativePressure { computed_kpa });
        }
        Ok(computed_kpa)
    }

    pub(crate) fn demand(
        &self,
        mass_kg: f64,
        carrier: &CarrierProperties,
        ambient_c: f64,
    ) -> TransferDemand {
        let mut clamps = Vec::new();
        let duration_h = self.duration_h(mass_kg, carrier.density_kg_m3);
        let pump_kwh = self.pump_power_w(carrier.density_kg_m3) * duration_h / 1000.0;

        if let Err(clamp) = self.final_pressure_kpa() {
            clamps.push(clamp);
        }

        let leak_w = self.pipe.heat_leak_w(carrier.cold_delta_k(ambient_c));
        let cop = cop_or(self.refrigeration_cop, carrier.refrigeration_cop);
        let refrigeration_kwh = refrigeration_kwh(leak_w, duration_h, cop);

        let rate = carrier.boil_off.transfer_per_hour * carrier.boil_off.temperature_factor(ambient_c);
        let loss_kg = fractional_loss(mass_kg, rate, duration_h, &mut clamps);

        TransferDemand {
            duration_h,
            pump_kwh,
            refrigeration_kwh,
            loss_kg,
            clamps,
        }
    }

    pub(crate) fn equipment_cost(&self, duration_h: f64) -> f64 {
        self.equipment_cost_per_hour * f64::from(self.pump_count) * duration_h
    }
}

/// Pumped transfer between a tank and a truck, or a truck and a tank.
#[derive(Debug, Clone)]
pub struct PumpTransferStage {
    config: PumpTransferConfig,
    site: ResolvedSite,
}

impl PumpTransferStage {
    pub fn new(config: PumpTransferConfig, site: ResolvedSite) -> Self {
        Self { config, site }
    }
}

impl UnitStage for PumpTransferStage {
    fn kind(&self) -> StageKind {
        StageKind::PumpTransfer
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let demand = self.config.demand(mass_kg, carrier, self.site.ambient_c());

        let outcome = bog.apply(
            carrier,
            RecoveryRequest {
                loss_kg: demand.loss_kg,
                duration_h: demand.duration_h,
                offsetable_demand_kwh: demand.refrigeration_kwh,
            },
        );

        ElectricSettlement {
            site: &self.site,
            mass_in_kg: mass_kg,
            loss_kg: demand.loss_kg,
            bog: outcome,
            fixed_energy_kwh: demand.pump_kwh,
            other_opex: 0.0,
            capex: self.config.equipment_cost(demand.duration_h),
        }
        .settle(demand.duration_h, demand.clamps)
    }
}
