use serde::{Deserialize, Serialize};
use validator::Validate;

use super::thermal::{refrigeration_kwh, InsulatedShell, DAYS_PER_YEAR, HOURS_PER_DAY};
use super::{cop_or, ElectricSettlement, StageKind, StageReport, UnitStage};
use crate::bog::{BogSettings, RecoveryRequest};
use crate::domain::{fractional_loss, CarrierProperties, ResolvedSite};
use crate::error::{Result, TransportError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StorageConfig {
    #[validate(range(exclusive_min = 0.0))]
    pub tank_volume_m3: f64,
    pub duration_days: f64,
    #[validate(nested)]
    pub shell: InsulatedShell,
    #[validate(range(exclusive_min = 0.0))]
    pub refrigeration_cop: Option<f64>,
    /// Installed cost of one tank
    #[validate(range(min = 0.0))]
    pub tank_capex: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub tank_lifetime_years: f64,
    /// Yearly operation and maintenance as a fraction of tank capex
    #[validate(range(min = 0.0, max = 1.0))]
    pub annual_om_fraction: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tank_volume_m3: 40_000.0,
            duration_days: 5.0,
            shell: InsulatedShell::default(),
            refrigeration_cop: None,
            tank_capex: 5.0e7,
            tank_lifetime_years: 30.0,
            annual_om_fraction: 0.02,
        }
    }
}

impl StorageConfig {
    pub fn tanks_needed(&self, mass_kg: f64, density_kg_m3: f64) -> u32 {
        let per_tank = self.tank_volume_m3 * density_kg_m3;
        if mass_kg <= 0.0 || per_tank <= 0.0 {
            return 0;
        }
        (mass_kg / per_tank).ceil() as u32
    }
}

/// Terminal or consumer tank farm holding the cargo for a fixed period.
#[derive(Debug, Clone)]
pub struct StorageStage {
    config: StorageConfig,
    site: ResolvedSite,
}

impl StorageStage {
    pub fn new(config: StorageConfig, site: ResolvedSite) -> Self {
        Self { config, site }
    }
}

impl UnitStage for StorageStage {
    fn kind(&self) -> StageKind {
        StageKind::Storage
    }

    fn validate(&self) -> Result<()> {
        if !self.config.duration_days.is_finite() || self.config.duration_days < 0.0 {
            return Err(TransportError::configuration(
                "storage.duration_days",
                "must be a finite non-negative number of days",
            ));
        }
        self.config.validate()?;
        Ok(())
    }

    fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, bog: &BogSettings) -> StageReport {
        let mass_kg = mass_kg.max(0.0);
        let cfg = &self.config;
        if cfg.duration_days <= 0.0 {
            return StageReport::skipped(mass_kg, "zero storage duration");
        }

        let ambient_c = self.site.ambient_c();
        let hours = cfg.duration_days * HOURS_PER_DAY;
        let mut clamps = Vec::new();

        let tanks = f64::from(cfg.tanks_needed(mass_kg, carrier.density_kg_m3));
        let leak_w = cfg
            .shell
            .heat_leak_w(cfg.tank_volume_m3, carrier.cold_delta_k(ambient_c))
            * tanks;
        let cop = cop_or(cfg.refrigeration_cop, carrier.refrigeration_cop);
        let demand_kwh = refrigeration_kwh(leak_w, hours, cop);

        let rate = carrier.boil_off.storage_per_day * carrier.boil_off.temperature_factor(ambient_c);
        let loss_kg = fractional_loss(mass_kg, rate, cfg.duration_days, &mut clamps);

        let outcome = bog.apply(
            carrier,
            RecoveryRequest {
                loss_kg,
                duration_h: hours,
                offsetable_demand_kwh: demand_kwh,
            },
        );

        let years = cfg.duration_days / DAYS_PER_YEAR;
        let om = tanks * cfg.tank_capex * cfg.annual_om_fraction * years;
        let capex = tanks * cfg.tank_capex * years / cfg.tank_lifetime_years;

        ElectricSettlement {
            site: &self.site,
            mass_in_kg: mass_kg,
            loss_kg,
            bog: outcome,
            fixed_energy_kwh: 0.0,
            other_opex: om,
            capex,
        }
        .settle(hours, clamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bog::{BogPolicy, RecoverySettings};
    use crate::stages::test_support::assert_balanced;
    use rstest::rstest;

    fn stage(duration_days: f64) -> StorageStage {
        StorageStage::new(
            StorageConfig {
                duration_days,
                ..Default::default()
            },
            ResolvedSite::default(),
        )
    }

    #[test]
    fn test_zero_duration_is_skipped() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let report = stage(0.0).apply(1000.0, &lh2, &BogSettings::expel());
        assert!(report.is_skipped());
        assert_eq!(report.result.output_mass_kg, 1000.0);
        assert_eq!(report.result.energy_kwh, 0.0);
        assert_eq!(report.elapsed_hours, 0.0);
    }

    #[test]
    fn test_negative_duration_is_configuration_error() {
        assert!(stage(-1.0).validate().unwrap_err().is_configuration());
    }

    #[rstest]
    #[case(CarrierProperties::liquefied_hydrogen(), 2.0e-3)]
    #[case(CarrierProperties::ammonia(), 4.0e-4)]
    #[case(CarrierProperties::methanol(), 2.0e-5)]
    fn test_daily_boil_off(#[case] carrier: CarrierProperties, #[case] rate: f64) {
        let report = stage(10.0).apply(1.0e6, &carrier, &BogSettings::expel());
        assert!((report.result.loss_mass_kg - 1.0e6 * rate * 10.0).abs() < 1e-6);
        assert_balanced(&report);
    }

    #[test]
    fn test_refrigeration_only_for_cold_carriers() {
        let meoh = stage(5.0).apply(1.0e6, &CarrierProperties::methanol(), &BogSettings::expel());
        let nh3 = stage(5.0).apply(1.0e6, &CarrierProperties::ammonia(), &BogSettings::expel());
        assert_eq!(meoh.result.energy_kwh, 0.0);
        assert!(nh3.result.energy_kwh > 0.0);
    }

    #[test]
    fn test_tank_count_drives_capex() {
        let config = StorageConfig::default();
        // one 40 000 m³ tank holds 2.832e6 kg of LH2
        assert_eq!(config.tanks_needed(2.0e6, 70.8), 1);
        assert_eq!(config.tanks_needed(3.0e6, 70.8), 2);

        let lh2 = CarrierProperties::liquefied_hydrogen();
        let one = stage(5.0).apply(2.0e6, &lh2, &BogSettings::expel());
        let two = stage(5.0).apply(3.0e6, &lh2, &BogSettings::expel());
        assert!((two.result.capex - 2.0 * one.result.capex).abs() < 1e-6);
    }

    #[test]
    fn test_reliquefy_in_storage_keeps_cargo() {
        let lh2 = CarrierProperties::liquefied_hydrogen();
        let bog = BogSettings::new(BogPolicy::Reliquefy, RecoverySettings::default());
        let expel = stage(10.0).apply(1.0e6, &lh2, &BogSettings::expel());
        let reliq = stage(10.0).apply(1.0e6, &lh2, &bog);
        assert!(reliq.result.output_mass_kg > expel.result.output_mass_kg);
        assert!(reliq.result.energy_kwh > expel.result.energy_kwh);
        assert_balanced(&reliq);
    }
}
