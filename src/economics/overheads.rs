use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use validator::Validate;

use crate::domain::Jurisdiction;
use crate::stages::thermal::HOURS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OverheadsConfig {
    /// Value of one kg of delivered cargo
    #[validate(range(min = 0.0))]
    pub cargo_value_per_kg: f64,
    /// Cost of capital tied up in the cargo, per day
    #[validate(range(min = 0.0, max = 1.0))]
    pub financing_daily_rate: f64,
    #[validate(range(min = 0.0))]
    pub brokerage_fee: f64,
    #[validate(range(min = 0.0))]
    pub certification_cost: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub contingency_rate: f64,
}

impl Default for OverheadsConfig {
    fn default() -> Self {
        Self {
            cargo_value_per_kg: 4.0,
            financing_daily_rate: 0.0002,
            brokerage_fee: 5_000.0,
            certification_cost: 10_000.0,
            contingency_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverheadKind {
    ImportTariff,
    Financing,
    Brokerage,
    Certification,
    Contingency,
}

/// What the overheads are computed from once the stage loop has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverheadBasis {
    pub delivered_mass_kg: f64,
    pub stage_opex: f64,
    pub stage_carbon_tax: f64,
    pub insurance: f64,
    /// Ocean leg opex plus capex
    pub freight: f64,
    /// Hours spent in transfer, transport and storage
    pub transit_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverheadCharge {
    pub kind: OverheadKind,
    pub amount: f64,
}

impl OverheadsConfig {
    pub fn cargo_value(&self, mass_kg: f64) -> f64 {
        mass_kg.max(0.0) * self.cargo_value_per_kg
    }

    /// Charges levied on the whole shipment after the stage loop.
    pub fn charges(&self, basis: &OverheadBasis, destination: &Jurisdiction) -> Vec<OverheadCharge> {
        let value = self.cargo_value(basis.delivered_mass_kg);
        let cif = value + basis.insurance.max(0.0) + basis.freight.max(0.0);
        let transit_days = basis.transit_hours.max(0.0) / HOURS_PER_DAY;
        let contingency_base =
            basis.stage_opex.max(0.0) + basis.stage_carbon_tax.max(0.0) + basis.insurance.max(0.0);

        vec![
            OverheadCharge {
                kind: OverheadKind::ImportTariff,
                amount: cif * destination.import_tariff_rate,
            },
            OverheadCharge {
                kind: OverheadKind::Financing,
                amount: self.financing_daily_rate * transit_days * value,
            },
            OverheadCharge {
                kind: OverheadKind::Brokerage,
                amount: self.brokerage_fee,
            },
            OverheadCharge {
                kind: OverheadKind::Certification,
                amount: self.certification_cost,
            },
            OverheadCharge {
                kind: OverheadKind::Contingency,
                amount: self.contingency_rate * contingency_base,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(charges: &[OverheadCharge], kind: OverheadKind) -> f64 {
        charges
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.amount)
            .unwrap()
    }

    #[test]
    fn test_tariff_on_cif_value() {
        let config = OverheadsConfig::default();
        let destination = Jurisdiction {
            carbon_price_per_tonne: 0.0,
            import_tariff_rate: 0.02,
            carbon_levy_fraction: None,
        };
        let basis = OverheadBasis {
            delivered_mass_kg: 1_000.0,
            insurance: 500.0,
            freight: 1_500.0,
            ..Default::default()
        };
        let charges = config.charges(&basis, &destination);
        // (4000 + 500 + 1500) * 2 %
        assert!((amount(&charges, OverheadKind::ImportTariff) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_financing_and_contingency() {
        let config = OverheadsConfig::default();
        let destination = Jurisdiction {
            carbon_price_per_tonne: 0.0,
            import_tariff_rate: 0.0,
            carbon_levy_fraction: None,
        };
        let basis = OverheadBasis {
            delivered_mass_kg: 1.0e6,
            stage_opex: 1.0e5,
            stage_carbon_tax: 2.0e4,
            insurance: 3.0e4,
            freight: 0.0,
            transit_hours: 240.0,
        };
        let charges = config.charges(&basis, &destination);

        // 0.0002 * 10 days * 4e6
        assert!((amount(&charges, OverheadKind::Financing) - 8_000.0).abs() < 1e-6);
        assert!((amount(&charges, OverheadKind::Contingency) - 7_500.0).abs() < 1e-6);
        assert_eq!(amount(&charges, OverheadKind::Brokerage), 5_000.0);
        assert_eq!(amount(&charges, OverheadKind::ImportTariff), 0.0);
    }
}
