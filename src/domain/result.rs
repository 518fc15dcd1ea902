use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use crate::error::Infeasibility;

/// Outcome of one unit stage.
///
/// Mass balance: `output_mass_kg = input - loss_mass_kg + recovered_mass_kg`.
/// `recovered_mass_kg` is only non-zero when boil-off is reliquefied back
/// into the cargo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub opex: f64,
    pub capex: f64,
    pub carbon_tax: f64,
    pub energy_kwh: f64,
    pub emissions_kg: f64,
    pub output_mass_kg: f64,
    pub loss_mass_kg: f64,
    pub insurance_cost: f64,
    pub recovered_mass_kg: f64,
}

impl StageResult {
    /// Zero-cost result that hands the cargo through unchanged.
    pub fn passthrough(mass_kg: f64) -> Self {
        Self {
            output_mass_kg: mass_kg.max(0.0),
            ..Default::default()
        }
    }

    /// Input mass reconstructed from the balance.
    pub fn input_mass_kg(&self) -> f64 {
        self.output_mass_kg + self.loss_mass_kg - self.recovered_mass_kg
    }

    /// Operating, capital and carbon cost, excluding insurance.
    pub fn stage_cost(&self) -> f64 {
        self.opex + self.capex + self.carbon_tax
    }

    pub fn net_loss_kg(&self) -> f64 {
        self.loss_mass_kg - self.recovered_mass_kg
    }

    /// Quantities that must be finite for the result to be usable.
    pub fn fields(&self) -> [(&'static str, f64); 9] {
        [
            ("opex", self.opex),
            ("capex", self.capex),
            ("carbon_tax", self.carbon_tax),
            ("energy_kwh", self.energy_kwh),
            ("emissions_kg", self.emissions_kg),
            ("output_mass_kg", self.output_mass_kg),
            ("loss_mass_kg", self.loss_mass_kg),
            ("insurance_cost", self.insurance_cost),
            ("recovered_mass_kg", self.recovered_mass_kg),
        ]
    }
}

/// Running totals across stages; mass fields are sums of losses, the final
/// mass is tracked separately by the pipeline.
impl AddAssign<&StageResult> for StageResult {
    fn add_assign(&mut self, rhs: &StageResult) {
        self.opex += rhs.opex;
        self.capex += rhs.capex;
        self.carbon_tax += rhs.carbon_tax;
        self.energy_kwh += rhs.energy_kwh;
        self.emissions_kg += rhs.emissions_kg;
        self.loss_mass_kg += rhs.loss_mass_kg;
        self.insurance_cost += rhs.insurance_cost;
        self.recovered_mass_kg += rhs.recovered_mass_kg;
        self.output_mass_kg = rhs.output_mass_kg;
    }
}

/// Clamp a computed loss into `[0, input_kg]`, recording the violation.
pub fn clamp_loss(input_kg: f64, loss_kg: f64, clamps: &mut Vec<Infeasibility>) -> f64 {
    let input_kg = input_kg.max(0.0);
    if loss_kg > input_kg {
        clamps.push(Infeasibility::LossExceedsInput { loss_kg, input_kg });
        return input_kg;
    }
    loss_kg.max(0.0)
}

/// Fractional loss over a duration, capped so the cargo never goes negative.
pub fn fractional_loss(mass_kg: f64, rate: f64, periods: f64, clamps: &mut Vec<Infeasibility>) -> f64 {
    clamp_loss(mass_kg, mass_kg.max(0.0) * rate.max(0.0) * periods.max(0.0), clamps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_balances() {
        let r = StageResult::passthrough(1234.0);
        assert_eq!(r.input_mass_kg(), 1234.0);
        assert_eq!(r.stage_cost(), 0.0);
    }

    #[test]
    fn test_clamp_loss_records_overrun() {
        let mut clamps = Vec::new();
        let loss = clamp_loss(100.0, 150.0, &mut clamps);
        assert_eq!(loss, 100.0);
        assert_eq!(clamps.len(), 1);

        let loss = clamp_loss(100.0, -5.0, &mut clamps);
        assert_eq!(loss, 0.0);
        assert_eq!(clamps.len(), 1);
    }

    #[test]
    fn test_fractional_loss_over_days() {
        let mut clamps = Vec::new();
        // 0.2 %/day for 10 days on 1000 kg
        let loss = fractional_loss(1000.0, 0.002, 10.0, &mut clamps);
        assert!((loss - 20.0).abs() < 1e-9);
        assert!(clamps.is_empty());
    }

    #[test]
    fn test_accumulate_totals() {
        let mut total = StageResult::default();
        let a = StageResult {
            opex: 1.0,
            energy_kwh: 10.0,
            output_mass_kg: 90.0,
            loss_mass_kg: 10.0,
            ..Default::default()
        };
        let b = StageResult {
            opex: 2.0,
            energy_kwh: 5.0,
            output_mass_kg: 85.0,
            loss_mass_kg: 5.0,
            ..Default::default()
        };
        total += &a;
        total += &b;
        assert_eq!(total.opex, 3.0);
        assert_eq!(total.energy_kwh, 15.0);
        assert_eq!(total.loss_mass_kg, 15.0);
        assert_eq!(total.output_mass_kg, 85.0);
    }
}
