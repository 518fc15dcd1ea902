use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::{Result, TransportError};

/// Pre-resolved conditions at one node of the route.
///
/// Prices, temperatures and grid intensity come from external lookups and
/// are fixed before the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SiteConditions {
    pub name: String,
    /// Jurisdiction used for carbon-price and tariff lookup
    pub country: String,
    pub ambient_temp_c: f64,
    #[validate(range(min = 0.0))]
    pub electricity_price_per_kwh: f64,
    /// Grid carbon intensity (kg CO2e/kWh)
    #[validate(range(min = 0.0))]
    pub carbon_intensity_kg_per_kwh: f64,
}

impl Default for SiteConditions {
    fn default() -> Self {
        Self {
            name: "site".to_string(),
            country: "default".to_string(),
            ambient_temp_c: 25.0,
            electricity_price_per_kwh: 0.10,
            carbon_intensity_kg_per_kwh: 0.3,
        }
    }
}

/// Carbon pricing and trade terms of one jurisdiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Jurisdiction {
    /// Carbon price (currency per tonne CO2e)
    #[validate(range(min = 0.0))]
    pub carbon_price_per_tonne: f64,
    /// Import tariff as a fraction of CIF value
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub import_tariff_rate: f64,
    /// Extra levy on shipping emissions when this is a regulatory zone
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub carbon_levy_fraction: Option<f64>,
}

impl Jurisdiction {
    pub fn carbon_tax(&self, emissions_kg: f64) -> f64 {
        emissions_kg.max(0.0) / 1000.0 * self.carbon_price_per_tonne
    }
}

/// Site conditions paired with their resolved jurisdiction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSite {
    pub conditions: SiteConditions,
    pub jurisdiction: Jurisdiction,
}

impl ResolvedSite {
    pub fn new(conditions: SiteConditions, jurisdiction: Jurisdiction) -> Self {
        Self {
            conditions,
            jurisdiction,
        }
    }

    pub fn ambient_c(&self) -> f64 {
        self.conditions.ambient_temp_c
    }

    /// Cost and grid emissions of electricity drawn at this site.
    pub fn electricity(&self, energy_kwh: f64) -> ElectricityBill {
        let energy_kwh = energy_kwh.max(0.0);
        let emissions_kg = energy_kwh * self.conditions.carbon_intensity_kg_per_kwh;
        ElectricityBill {
            cost: energy_kwh * self.conditions.electricity_price_per_kwh,
            emissions_kg,
        }
    }

    pub fn carbon_tax(&self, emissions_kg: f64) -> f64 {
        self.jurisdiction.carbon_tax(emissions_kg)
    }
}

impl Default for ResolvedSite {
    fn default() -> Self {
        Self::new(
            SiteConditions::default(),
            Jurisdiction {
                carbon_price_per_tonne: 50.0,
                import_tariff_rate: 0.0,
                carbon_levy_fraction: None,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricityBill {
    pub cost: f64,
    pub emissions_kg: f64,
}

/// Jurisdictions keyed by country name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JurisdictionTable(pub BTreeMap<String, Jurisdiction>);

impl JurisdictionTable {
    pub fn lookup(&self, name: &str) -> Result<&Jurisdiction> {
        self.0
            .get(name)
            .ok_or_else(|| TransportError::UnknownJurisdiction {
                name: name.to_string(),
            })
    }

    pub fn resolve(&self, conditions: &SiteConditions) -> Result<ResolvedSite> {
        conditions.validate()?;
        if !conditions.ambient_temp_c.is_finite() || conditions.ambient_temp_c < -273.15 {
            return Err(TransportError::configuration(
                format!("{}.ambient_temp_c", conditions.name),
                "must be a finite temperature above absolute zero",
            ));
        }
        let jurisdiction = self.lookup(&conditions.country)?;
        jurisdiction.validate()?;
        Ok(ResolvedSite::new(conditions.clone(), jurisdiction.clone()))
    }

    pub fn insert(&mut self, name: impl Into<String>, jurisdiction: Jurisdiction) {
        self.0.insert(name.into(), jurisdiction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> JurisdictionTable {
        let mut table = JurisdictionTable::default();
        table.insert(
            "Norway",
            Jurisdiction {
                carbon_price_per_tonne: 80.0,
                import_tariff_rate: 0.0,
                carbon_levy_fraction: Some(0.1),
            },
        );
        table
    }

    #[test]
    fn test_resolve_known_site() {
        let conditions = SiteConditions {
            country: "Norway".into(),
            ..Default::default()
        };
        let site = table().resolve(&conditions).unwrap();
        assert_eq!(site.jurisdiction.carbon_price_per_tonne, 80.0);
        // 1000 kg at 80/t
        assert!((site.carbon_tax(1000.0) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_jurisdiction_is_configuration_error() {
        let conditions = SiteConditions {
            country: "Atlantis".into(),
            ..Default::default()
        };
        let err = table().resolve(&conditions).unwrap_err();
        assert!(matches!(err, TransportError::UnknownJurisdiction { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_negative_price_rejected() {
        let conditions = SiteConditions {
            country: "Norway".into(),
            electricity_price_per_kwh: -1.0,
            ..Default::default()
        };
        assert!(table().resolve(&conditions).unwrap_err().is_configuration());
    }

    #[test]
    fn test_electricity_bill() {
        let site = ResolvedSite::default();
        let bill = site.electricity(100.0);
        assert!((bill.cost - 10.0).abs() < 1e-9);
        assert!((bill.emissions_kg - 30.0).abs() < 1e-9);
    }
}
