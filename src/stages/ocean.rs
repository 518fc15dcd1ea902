use serde::{Deserialize, Serialize};
use validator::Validate;

use super::thermal::{refrigeration_kwh, InsulatedShell, HOURS_PER_DAY};
use super::{cop_or, StageKind, StageReport, UnitStage};
use crate::bog::{BogSettings, RecoveryRequest};
use crate::domain::{fractional_loss, CarrierProperties, Jurisdiction, StageResult};
use crate::error::Result;

/// 100-year GWP of methane slipped from dual-fuel engines
pub const GWP_CH4: f64 = 29.8;
/// 100-year GWP of nitrous oxide
pub const GWP_N2O: f64 = 273.0;

/// Vessel particulars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShipClass {
    #[validate(range(exclusive_min = 0.0))]
    pub gross_tonnage: f64,
    /// Volume of one cargo tank (m³)
    #[validate(range(exclusive_min = 0.0))]
    pub tank_volume_m3: f64,
    #[validate(range(min = 1))]
    pub tank_count: u32,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub fill_limit: f64,
    /// Mean shaft power over the voyage (kW)
    #[validate(range(min = 0.0))]
    pub average_power_kw: f64,
    /// Specific fuel oil consumption (g/kWh)
    #[validate(range(exclusive_min = 0.0))]
    pub sfoc_g_per_kwh: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub fuel_lhv_mj_per_kg: f64,
    #[validate(range(min = 0.0))]
    pub fuel_price_per_tonne: f64,
    #[validate(range(min = 0.0))]
    pub fuel_co2_kg_per_kg: f64,
    #[validate(range(min = 0.0))]
    pub methane_slip_g_per_kwh: f64,
    #[validate(range(min = 0.0))]
    pub n2o_g_per_kwh: f64,
    #[validate(range(min = 0.0))]
    pub daily_operating_cost: f64,
    #[validate(range(min = 0.0))]
    pub daily_maintenance_cost: f64,
    /// Charter or capital recovery per day
    #[validate(range(min = 0.0))]
    pub daily_capital_cost: f64,
    #[validate(nested)]
    pub tank_shell: InsulatedShell,
    #[validate(range(exclusive_min = 0.0))]
    pub refrigeration_cop: Option<f64>,
}

impl Default for ShipClass {
    fn default() -> Self {
        // Large gas carrier, four membrane tanks
        Self {
            gross_tonnage: 130_000.0,
            tank_volume_m3: 40_000.0,
            tank_count: 4,
            fill_limit: 0.98,
            average_power_kw: 20_000.0,
            sfoc_g_per_kwh: 175.0,
            fuel_lhv_mj_per_kg: 41.0,
            fuel_price_per_tonne: 650.0,
            fuel_co2_kg_per_kg: 3.114,
            methane_slip_g_per_kwh: 0.0,
            n2o_g_per_kwh: 0.03,
            daily_operating_cost: 12_000.0,
            daily_maintenance_cost: 4_000.0,
            daily_capital_cost: 60_000.0,
            tank_shell: InsulatedShell::default(),
            refrigeration_cop: None,
        }
    }
}

impl ShipClass {
    /// Cargo mass that fills every tank to the fill limit.
    pub fn capacity_kg(&self, carrier: &CarrierProperties) -> f64 {
        self.tank_volume_m3 * f64::from(self.tank_count) * self.fill_limit * carrier.density_kg_m3
    }
}

/// Route-specific voyage parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VoyageConfig {
    #[validate(range(min = 0.0))]
    pub distance_nm: f64,
    #[validate(range(min = 0.0))]
    pub duration_h: f64,
    #[validate(range(min = 0.0))]
    pub port_fees: f64,
    pub canal_transits: u32,
    #[validate(range(min = 0.0))]
    pub canal_toll_per_gt: f64,
    pub sea_ambient_temp_c: f64,
}

impl Default for VoyageConfig {
    fn default() -> Self {
        Self {
            distance_nm: 6_000.0,
            duration_h: 400.0,
            port_fees: 200_000.0,
            canal_transits: 0,
            canal_toll_per_gt: 5.0,
            sea_ambient_temp_c: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShipLegConfig {
    #[validate(nested)]
    pub ship: ShipClass,
    #[validate(nested)]
    pub voyage: VoyageConfig,
}

/// Sea voyage between the two port terminals.
///
/// Ship costs are apportioned by the shipment's share of vessel capacity.
/// Carbon tax follows the destination jurisdiction, raised by its levy
/// fraction when it is a regulatory zone.
#[derive(Debug, Clone)]
pub struct OceanStage {
    config: ShipLegConfig,
    destination: Jurisdiction,
}

impl OceanStage {
    pub fn new(config: ShipLegConfig, destination: Jurisdiction) -> Self {
        Self { config, destination }
    }

    fn carbon_tax(&self, emissions_kg: f64) -> f64 {
        let levy = self.destination.carbon_levy_fraction.unwrap_or(0.0).max(0.0);
        self.destination.carbon_tax(emissions_kg) * (1.0 + levy)
    }
}

impl UnitStage for OceanStage {
    fn kind(&self) -> StageKind {
        StageKind::OceanTransport
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.destination.validate()?;
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let ship = &self.config.ship;
        let voyage = &self.config.voyage;
        let ambient_c = voyage.sea_ambient_temp_c;
        let hours = voyage.duration_h;
        let days = hours / HOURS_PER_DAY;
        let mut clamps = Vec::new();

        let capacity = ship.capacity_kg(carrier);
        let share = if capacity > 0.0 {
            (mass_kg / capacity).min(1.0)
        } else {
            0.0
        };

        let leak_w = ship
            .tank_shell
            .heat_leak_w(ship.tank_volume_m3, carrier.cold_delta_k(ambient_c))
            * f64::from(ship.tank_count);
        let cop = cop_or(ship.refrigeration_cop, carrier.refrigeration_cop);
        let demand_kwh =
            (ship.average_power_kw * hours + refrigeration_kwh(leak_w, hours, cop)) * share;

        let rate = carrier.boil_off.ship_per_day * carrier.boil_off.temperature_factor(ambient_c);
        let loss_kg = fractional_loss(mass_kg, rate, days, &mut clamps);

        let outcome = bog.apply(
            carrier,
            RecoveryRequest {
                loss_kg,
                duration_h: hours,
                offsetable_demand_kwh: demand_kwh,
            },
        );

        let work_kwh = outcome.energy_kwh();
        let fuel_kg = work_kwh * ship.sfoc_g_per_kwh / 1000.0;
        let energy_kwh = fuel_kg * ship.fuel_lhv_mj_per_kg / 3.6;

        let emissions_kg = fuel_kg * ship.fuel_co2_kg_per_kg
            + work_kwh * ship.methane_slip_g_per_kwh / 1000.0 * GWP_CH4
            + work_kwh * ship.n2o_g_per_kwh / 1000.0 * GWP_N2O
            + outcome.emissions_kg;

        let canal_tolls =
            f64::from(voyage.canal_transits) * ship.gross_tonnage * voyage.canal_toll_per_gt;
        let opex = fuel_kg / 1000.0 * ship.fuel_price_per_tonne
            + ((ship.daily_operating_cost + ship.daily_maintenance_cost) * days
                + voyage.port_fees
                + canal_tolls)
                * share;
        let capex = ship.daily_capital_cost * days * share + outcome.capex;

        let result = StageResult {
            opex,
            capex,
            carbon_tax: self.carbon_tax(emissions_kg),
            energy_kwh,
            emissions_kg,
            output_mass_kg: (mass_kg - loss_kg + outcome.recovered_kg).max(0.0),
            loss_mass_kg: loss_kg,
            insurance_cost: 0.0,
            recovered_mass_kg: outcome.recovered_kg,
        };

        clamps.extend(outcome.clamps);
        StageReport::executed(mass_kg, result, hours, clamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bog::{BogPolicy, RecoverySettings};
    use crate::stages::test_support::assert_balanced;

    fn jurisdiction(levy: Option<f64>) -> Jurisdiction {
        Jurisdiction {
            carbon_price_per_tonne: 100.0,
            import_tariff_rate: 0.0,
            carbon_levy_fraction: levy,
        }
    }

    #[test]
    fn test_capacity_from_tanks() {
        let ship = ShipClass::default();
        let lh2 = CarrierProperties::liquefied_hydrogen();
        assert!((ship.capacity_kg(&lh2) - 40_000.0 * 4.0 * 0.98 * 70.8).abs() < 1e-6);
    }

    #[test]
    fn test_levy_zone_raises_carbon_tax() {
        let nh3 = CarrierProperties::ammonia();
        let mass = ShipClass::default().capacity_kg(&nh3);
        let plain = OceanStage::new(ShipLegConfig::default(), jurisdiction(None));
        let levied = OceanStage::new(ShipLegConfig::default(), jurisdiction(Some(0.25)));

        let a = plain.apply(mass, &nh3, &BogSettings::expel());
        let b = levied.apply(mass, &nh3, &BogSettings::expel());

        assert_eq!(a.result.emissions_kg, b.result.emissions_kg);
        assert!((b.result.carbon_tax - a.result.carbon_tax * 1.25).abs() < 1e-6);
        assert!((a.result.carbon_tax - a.result.emissions_kg / 1000.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_half_load_pays_half_overheads() {
        let meoh = CarrierProperties::methanol();
        let stage = OceanStage::new(ShipLegConfig::default(), jurisdiction(None));
        let full_mass = ShipClass::default().capacity_kg(&meoh);

        let full = stage.apply(full_mass, &meoh, &BogSettings::expel());
        let half = stage.apply(full_mass / 2.0, &meoh, &BogSettings::expel());
        assert!((half.result.capex - full.result.capex / 2.0).abs() < 1e-6);
        assert!((half.result.energy_kwh - full.result.energy_kwh / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_canal_tolls_per_gross_ton() {
        let meoh = CarrierProperties::methanol();
        let mass = ShipClass::default().capacity_kg(&meoh);
        let base = OceanStage::new(ShipLegConfig::default(), jurisdiction(None));
        let canal = OceanStage::new(
            ShipLegConfig {
                voyage: VoyageConfig {
                    canal_transits: 1,
                    ..Default::default()
                },
                ..Default::default()
            },
            jurisdiction(None),
        );
        let a = base.apply(mass, &meoh, &BogSettings::expel());
        let b = canal.apply(mass, &meoh, &BogSettings::expel());
        assert!((b.result.opex - a.result.opex - 130_000.0 * 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_voyage_boil_off_and_reliquefaction() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let stage = OceanStage::new(ShipLegConfig::default(), jurisdiction(None));
        let mass = 1.0e7;

        let expel = stage.apply(mass, &lh2, &BogSettings::expel());
        let factor = lh2.boil_off.temperature_factor(20.0);
        let expected = mass * 2.0e-3 * factor * 400.0 / 24.0;
        assert!((expel.result.loss_mass_kg - expected).abs() < 1e-6);
        assert_balanced(&expel);

        let reliq = stage.apply(
            mass,
            &lh2,
            &BogSettings::new(BogPolicy::Reliquefy, RecoverySettings::default()),
        );
        assert!(reliq.result.output_mass_kg > expel.result.output_mass_kg);
        assert_balanced(&reliq);
    }

    #[test]
    fn test_overfilled_ship_share_capped() {
        let nh3 = CarrierProperties::ammonia();
        let stage = OceanStage::new(ShipLegConfig::default(), jurisdiction(None));
        let cap = ShipClass::default().capacity_kg(&nh3);
        let at_cap = stage.apply(cap, &nh3, &BogSettings::expel());
        let over = stage.apply(cap * 1.5, &nh3, &BogSettings::expel());
        assert!((over.result.capex - at_cap.result.capex).abs() < 1e-6);
    }
}
