use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

use crate::domain::CarrierProperties;
use crate::error::Infeasibility;

/// Shortest window used when converting recovered mass into a flow rate.
/// Stages without a physical duration (batch phase change) recover over it.
const MIN_RECOVERY_WINDOW_H: f64 = 1.0;

/// What happens to boil-off gas on a leg
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BogPolicy {
    /// Vent everything
    #[default]
    Expel,
    /// Re-condense the usable fraction back into the cargo
    Reliquefy,
    /// Burn the usable fraction in a fuel cell to offset refrigeration or propulsion
    AuxFuelReuse,
    /// Combust the usable fraction in a flare
    Flare,
}

impl BogPolicy {
    pub fn returns_mass(self) -> bool {
        matches!(self, BogPolicy::Reliquefy)
    }
}

/// Recovery equipment parameters shared by all legs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RecoverySettings {
    /// Fraction of boil-off the recovery train can capture
    #[validate(range(min = 0.0, max = 1.0))]
    pub usable_fraction: f64,
    /// Electrical efficiency of the fuel cell burning recovered vapour
    #[validate(range(min = 0.0, max = 1.0))]
    pub fuel_cell_efficiency: f64,
    /// Reliquefier capital per tonne-per-day of capacity
    #[validate(range(min = 0.0))]
    pub reliquefier_capex_per_tpd: f64,
    /// Fuel-cell integration capital per kW of recovered power
    #[validate(range(min = 0.0))]
    pub integration_capex_per_kw: f64,
    /// Flare capital per kg/h of combustion capacity
    #[validate(range(min = 0.0))]
    pub flare_capex_per_kg_h: f64,
    #[validate(range(min = 1.0))]
    pub equipment_lifetime_years: f64,
    #[validate(range(min = 1.0, max = 8760.0))]
    pub operating_hours_per_year: f64,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            usable_fraction: 0.8,
            fuel_cell_efficiency: 0.5,
            reliquefier_capex_per_tpd: 1.5e6,
            integration_capex_per_kw: 3000.0,
            flare_capex_per_kg_h: 500.0,
            equipment_lifetime_years: 20.0,
            operating_hours_per_year: 8000.0,
        }
    }
}

impl RecoverySettings {
    /// Capital charge for using `capital` worth of equipment for `hours`.
    pub fn amortize(&self, capital: f64, hours: f64) -> f64 {
        let lifetime_hours = self.equipment_lifetime_years * self.operating_hours_per_year;
        if lifetime_hours <= 0.0 {
            return 0.0;
        }
        capital.max(0.0) * hours.max(0.0) / lifetime_hours
    }
}

/// Policy of one leg plus the shared equipment parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BogSettings {
    pub policy: BogPolicy,
    pub recovery: RecoverySettings,
}

/// Boil-off produced by a stage and the demand recovered energy may offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecoveryRequest {
    pub loss_kg: f64,
    pub duration_h: f64,
    /// Refrigeration or propulsion energy that AuxFuelReuse can displace
    pub offsetable_demand_kwh: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BogOutcome {
    /// Mass returned to the cargo
    pub recovered_kg: f64,
    /// Mass burnt in a fuel cell or flare
    pub consumed_kg: f64,
    pub vented_kg: f64,
    /// Offsetable demand left after recovered energy, never negative
    pub net_demand_kwh: f64,
    /// Electricity drawn by the reliquefier
    pub recovery_energy_kwh: f64,
    pub capex: f64,
    /// GWP of vented vapour plus combustion CO2
    pub emissions_kg: f64,
    pub clamps: Vec<Infeasibility>,
}

impl BogOutcome {
    pub fn energy_kwh(&self) -> f64 {
        self.net_demand_kwh + self.recovery_energy_kwh
    }
}

impl BogSettings {
    pub fn new(policy: BogPolicy, recovery: RecoverySettings) -> Self {
        Self { policy, recovery }
    }

    pub fn expel() -> Self {
        Self::default()
    }

    /// Apply the leg's policy to a stage's boil-off.
    pub fn apply(&self, carrier: &CarrierProperties, request: RecoveryRequest) -> BogOutcome {
        let loss_kg = request.loss_kg.max(0.0);
        let demand_kwh = request.offsetable_demand_kwh.max(0.0);
        let hours = request.duration_h.max(MIN_RECOVERY_WINDOW_H);

        let mut outcome = BogOutcome {
            net_demand_kwh: demand_kwh,
            ..Default::default()
        };

        let captured_kg = match self.policy {
            BogPolicy::Expel => 0.0,
            _ => self.captured(loss_kg, &mut outcome.clamps),
        };
        outcome.vented_kg = loss_kg - captured_kg;
        outcome.emissions_kg = outcome.vented_kg * carrier.gwp100;

        match self.policy {
            BogPolicy::Expel => {}
            BogPolicy::Reliquefy => {
                let throughput_tpd = captured_kg / hours * 24.0 / 1000.0;
                let specific = carrier
                    .reliquefaction
                    .specific_energy_kwh_per_kg(throughput_tpd);
                outcome.recovered_kg = captured_kg;
                outcome.recovery_energy_kwh = captured_kg * specific;
                outcome.capex = self
                    .recovery
                    .amortize(self.recovery.reliquefier_capex_per_tpd * throughput_tpd, hours);
            }
            BogPolicy::AuxFuelReuse => {
                let recovered_kwh =
                    captured_kg * carrier.lhv_kwh_per_kg() * self.recovery.fuel_cell_efficiency;
                if recovered_kwh > demand_kwh {
                    outcome.clamps.push(Infeasibility::RecoveredEnergyExceedsDemand {
                        recovered_kwh,
                        demand_kwh,
                    });
                }
                outcome.consumed_kg = captured_kg;
                outcome.net_demand_kwh = (demand_kwh - recovered_kwh).max(0.0);
                outcome.emissions_kg += captured_kg * carrier.flare_co2_kg_per_kg;
                outcome.capex = self
                    .recovery
                    .amortize(self.recovery.integration_capex_per_kw * recovered_kwh / hours, hours);
            }
            BogPolicy::Flare => {
                outcome.consumed_kg = captured_kg;
                outcome.emissions_kg += captured_kg * carrier.flare_co2_kg_per_kg;
                outcome.capex = self
                    .recovery
                    .amortize(self.recovery.flare_capex_per_kg_h * captured_kg / hours, hours);
            }
        }

        outcome
    }

    fn captured(&self, loss_kg: f64, clamps: &mut Vec<Infeasibility>) -> f64 {
        let requested_kg = self.recovery.usable_fraction.max(0.0) * loss_kg;
        if requested_kg > loss_kg {
            clamps.push(Infeasibility::RecoveryExceedsLoss {
                requested_kg,
                loss_kg,
            });
            return loss_kg;
        }
        requested_kg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CarrierProperties;

    fn request(loss_kg: f64, demand_kwh: f64) -> RecoveryRequest {
        RecoveryRequest {
            loss_kg,
            duration_h: 24.0,
            offsetable_demand_kwh: demand_kwh,
        }
    }

    #[test]
    fn test_expel_vents_everything() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let out = BogSettings::expel().apply(&lh2, request(100.0, 500.0));
        assert_eq!(out.vented_kg, 100.0);
        assert_eq!(out.recovered_kg, 0.0);
        assert_eq!(out.net_demand_kwh, 500.0);
        assert!((out.emissions_kg - 100.0 * 11.6).abs() < 1e-9);
        assert_eq!(out.capex, 0.0);
    }

    #[test]
    fn test_reliquefy_returns_usable_fraction() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let settings = BogSettings::new(BogPolicy::Reliquefy, RecoverySettings::default());
        let out = settings.apply(&lh2, request(100.0, 500.0));
        assert!((out.recovered_kg - 80.0).abs() < 1e-9);
        assert!((out.vented_kg - 20.0).abs() < 1e-9);
        assert!(out.recovery_energy_kwh > 80.0 * lh2.reliquefaction.floor_kwh_per_kg);
        assert!(out.capex > 0.0);
        assert!((out.emissions_kg - 20.0 * 11.6).abs() < 1e-9);
    }

    #[test]
    fn test_aux_fuel_floors_net_demand() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let settings = BogSettings::new(BogPolicy::AuxFuelReuse, RecoverySettings::default());
        // 80 kg * 33.3 kWh/kg * 0.5 = ~1333 kWh against 100 kWh of demand
        let out = settings.apply(&lh2, request(100.0, 100.0));
        assert_eq!(out.net_demand_kwh, 0.0);
        assert_eq!(out.energy_kwh(), 0.0);
        assert_eq!(out.recovered_kg, 0.0);
        assert!(matches!(
            out.clamps.as_slice(),
            [Infeasibility::RecoveredEnergyExceedsDemand { .. }]
        ));
    }

    #[test]
    fn test_aux_fuel_partial_offset() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let settings = BogSettings::new(BogPolicy::AuxFuelReuse, RecoverySettings::default());
        let out = settings.apply(&lh2, request(1.0, 1000.0));
        let offset = 0.8 * lh2.lhv_kwh_per_kg() * 0.5;
        assert!((out.net_demand_kwh - (1000.0 - offset)).abs() < 1e-9);
        assert!(out.clamps.is_empty());
    }

    #[test]
    fn test_flare_nets_avoided_gwp() {
        let meoh = CarrierProperties::methanol();
        let expel = BogSettings::expel().apply(&meoh, request(100.0, 0.0));
        let flare = BogSettings::new(BogPolicy::Flare, RecoverySettings::default())
            .apply(&meoh, request(100.0, 0.0));

        let expected = 20.0 * meoh.gwp100 + 80.0 * meoh.flare_co2_kg_per_kg;
        assert!((flare.emissions_kg - expected).abs() < 1e-9);
        assert!(flare.emissions_kg < expel.emissions_kg + 80.0 * meoh.flare_co2_kg_per_kg);
        assert_eq!(flare.recovered_kg, 0.0);
        assert!((flare.consumed_kg - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_recovery_clamped_to_loss() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let settings = BogSettings::new(
            BogPolicy::Reliquefy,
            RecoverySettings {
                usable_fraction: 1.5,
                ..Default::default()
            },
        );
        let out = settings.apply(&lh2, request(10.0, 0.0));
        assert_eq!(out.recovered_kg, 10.0);
        assert_eq!(out.vented_kg, 0.0);
        assert!(matches!(
            out.clamps.as_slice(),
            [Infeasibility::RecoveryExceedsLoss { .. }]
        ));
    }

    #[test]
    fn test_recovered_never_exceeds_loss() {
        let nh3 = CarrierProperties::ammonia();
        for policy in [
            BogPolicy::Expel,
            BogPolicy::Reliquefy,
            BogPolicy::AuxFuelReuse,
            BogPolicy::Flare,
        ] {
            let out = BogSettings::new(policy, RecoverySettings::default())
                .apply(&nh3, request(42.0, 10.0));
            assert!(out.recovered_kg + out.consumed_kg <= 42.0 + 1e-12);
            assert!(out.net_demand_kwh >= 0.0);
        }
    }
}
